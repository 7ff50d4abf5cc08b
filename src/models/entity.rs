//! # 实体数据模型
//!
//! 实体是结构中一种独立的生物/化学组分：聚合物链、配体、水等。
//!
//! ## 依赖关系
//! - 被 `models/structure.rs` 和 `parsers/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};
use std::fmt;

/// 实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityType {
    Polymer,
    NonPolymer,
    Water,
    Branched,
    Unknown,
}

impl EntityType {
    /// 从 mmCIF `_entity.type` 标签解析（不区分大小写），未知标签归为 `Unknown`
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "polymer" => EntityType::Polymer,
            "non-polymer" => EntityType::NonPolymer,
            "water" => EntityType::Water,
            "branched" => EntityType::Branched,
            _ => EntityType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Polymer => "polymer",
            EntityType::NonPolymer => "non-polymer",
            EntityType::Water => "water",
            EntityType::Branched => "branched",
            EntityType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub entity_type: EntityType,
    pub description: String,
}

impl Entity {
    pub fn new(id: impl Into<String>, entity_type: EntityType) -> Self {
        Entity {
            id: id.into(),
            entity_type,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_polymer(&self) -> bool {
        self.entity_type == EntityType::Polymer
    }

    pub fn is_nonpolymer(&self) -> bool {
        self.entity_type == EntityType::NonPolymer
    }

    pub fn is_water(&self) -> bool {
        self.entity_type == EntityType::Water
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_from_tag() {
        assert_eq!(EntityType::from_tag("polymer"), EntityType::Polymer);
        assert_eq!(EntityType::from_tag("NON-POLYMER"), EntityType::NonPolymer);
        assert_eq!(EntityType::from_tag("Water"), EntityType::Water);
        assert_eq!(EntityType::from_tag("branched"), EntityType::Branched);
        assert_eq!(EntityType::from_tag("macrolide"), EntityType::Unknown);
        assert_eq!(EntityType::NonPolymer.as_str(), "non-polymer");
    }

    #[test]
    fn test_entity_classification() {
        let water = Entity::new("5", EntityType::Water).with_description("water");
        assert!(water.is_water());
        assert!(!water.is_polymer());
        assert!(!water.is_nonpolymer());
        assert_eq!(water.description, "water");
    }
}
