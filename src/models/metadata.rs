//! # 结构元数据
//!
//! 条目 ID、实验方法、分辨率、日期、标题、空间群与晶胞参数，
//! 以及未被建模字段的原始键值表。
//!
//! ## 依赖关系
//! - 被 `models/structure.rs` 和 `parsers/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 来源文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Mmcif,
    Pdb,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Mmcif => "mmcif",
            SourceFormat::Pdb => "pdb",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 晶胞参数，各项独立可缺省
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitCell {
    pub a: Option<f64>,
    pub b: Option<f64>,
    pub c: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
}

/// 结构元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureMetadata {
    /// 条目 ID（如 "4HHB"），未知时为空串
    pub entry_id: String,

    pub format: SourceFormat,

    /// 实验方法（如 "X-RAY DIFFRACTION"）
    pub method: Option<String>,

    /// 分辨率 (Å)
    pub resolution: Option<f64>,

    pub release_date: Option<String>,
    pub deposit_date: Option<String>,
    pub title: Option<String>,
    pub keywords: Option<String>,
    pub space_group: Option<String>,

    pub cell: UnitCell,

    /// 原始非空键值对
    pub raw: BTreeMap<String, String>,
}

impl StructureMetadata {
    pub fn new(entry_id: impl Into<String>, format: SourceFormat) -> Self {
        StructureMetadata {
            entry_id: entry_id.into(),
            format,
            method: None,
            resolution: None,
            release_date: None,
            deposit_date: None,
            title: None,
            keywords: None,
            space_group: None,
            cell: UnitCell::default(),
            raw: BTreeMap::new(),
        }
    }

    pub fn cell_a(&self) -> Option<f64> {
        self.cell.a
    }

    pub fn cell_b(&self) -> Option<f64> {
        self.cell.b
    }

    pub fn cell_c(&self) -> Option<f64> {
        self.cell.c
    }

    pub fn cell_alpha(&self) -> Option<f64> {
        self.cell.alpha
    }

    pub fn cell_beta(&self) -> Option<f64> {
        self.cell.beta
    }

    pub fn cell_gamma(&self) -> Option<f64> {
        self.cell.gamma
    }
}
