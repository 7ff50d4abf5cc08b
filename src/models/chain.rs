//! # 链数据模型
//!
//! ## 依赖关系
//! - 被 `models/structure.rs` 和 `parsers/grouping.rs` 使用
//! - 使用 `models/residue.rs`

use super::residue::Residue;

use serde::{Deserialize, Serialize};

/// 链：按序号升序排列的残基
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    /// 链标识（结构内唯一）
    pub id: String,

    /// 残基列表
    pub residues: Vec<Residue>,

    /// 所属实体 ID
    pub entity_id: Option<String>,
}

impl Chain {
    pub fn new(id: impl Into<String>, residues: Vec<Residue>) -> Self {
        Chain {
            id: id.into(),
            residues,
            entity_id: None,
        }
    }

    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// 单字母序列，仅包含标准残基
    pub fn sequence(&self) -> String {
        self.residues
            .iter()
            .filter(|r| r.is_standard)
            .map(|r| r.one_letter)
            .collect()
    }

    pub fn num_residues(&self) -> usize {
        self.residues.len()
    }

    pub fn num_atoms(&self) -> usize {
        self.residues.iter().map(|r| r.atoms.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Residue> {
        self.residues.iter()
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Residue;
    type IntoIter = std::slice::Iter<'a, Residue>;

    fn into_iter(self) -> Self::IntoIter {
        self.residues.iter()
    }
}
