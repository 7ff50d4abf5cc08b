//! # 解析器模块
//!
//! 提供 mmCIF 与 PDB 两种结构文件的构建器，以及按后缀分派的注册表。
//!
//! ## 依赖关系
//! - 被 `batch/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: cif_tokenizer, grouping, mmcif, pdb, registry

pub mod cif_tokenizer;
pub mod grouping;
pub mod mmcif;
pub mod pdb;
pub mod registry;

pub use mmcif::CifStructure;
pub use pdb::PdbStructure;
pub use registry::{ParserRegistry, StructureFormat};

use crate::error::Result;
use crate::models::Structure;
use std::path::Path;

/// 从文件路径推断格式并解析（使用内置注册表）
pub fn parse_structure_file(path: &Path) -> Result<Structure> {
    ParserRegistry::new().parse(path)
}
