//! # 结构统一抽象
//!
//! `Structure` 是封闭的和类型，恰好包含 mmCIF 与 PDB 两种变体。
//! 两种变体都在首次访问时惰性构建元数据/实体/链/原子并缓存，
//! 之后的访问返回同一份结果。
//!
//! `StructureRecord` 是供外部表格（清单）使用的扁平投影，
//! 其字段集合与语义保持固定。
//!
//! ## 依赖关系
//! - 被 `batch/` 和 `parsers/` 使用
//! - 使用 `parsers/mmcif.rs`、`parsers/pdb.rs` 中的具体构建器

use super::{Atom, Chain, Entity, SourceFormat, StructureMetadata};
use crate::parsers::mmcif::CifStructure;
use crate::parsers::pdb::PdbStructure;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// 解析后的大分子结构
#[derive(Debug)]
pub enum Structure {
    Cif(CifStructure),
    Pdb(PdbStructure),
}

impl Structure {
    pub fn metadata(&self) -> &StructureMetadata {
        match self {
            Structure::Cif(s) => s.metadata(),
            Structure::Pdb(s) => s.metadata(),
        }
    }

    pub fn entities(&self) -> &[Entity] {
        match self {
            Structure::Cif(s) => s.entities(),
            Structure::Pdb(s) => s.entities(),
        }
    }

    pub fn chains(&self) -> &[Chain] {
        match self {
            Structure::Cif(s) => s.chains(),
            Structure::Pdb(s) => s.chains(),
        }
    }

    /// 结构内全部原子（平铺）
    pub fn atoms(&self) -> &[Atom] {
        match self {
            Structure::Cif(s) => s.atoms(),
            Structure::Pdb(s) => s.atoms(),
        }
    }

    pub fn source_path(&self) -> Option<&Path> {
        match self {
            Structure::Cif(s) => s.source_path(),
            Structure::Pdb(s) => s.source_path(),
        }
    }

    pub fn format(&self) -> SourceFormat {
        match self {
            Structure::Cif(_) => SourceFormat::Mmcif,
            Structure::Pdb(_) => SourceFormat::Pdb,
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Structure::Cif(_) => "CifStructure",
            Structure::Pdb(_) => "PdbStructure",
        }
    }

    pub fn entry_id(&self) -> &str {
        &self.metadata().entry_id
    }

    pub fn resolution(&self) -> Option<f64> {
        self.metadata().resolution
    }

    pub fn method(&self) -> Option<&str> {
        self.metadata().method.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata().title.as_deref()
    }

    pub fn num_chains(&self) -> usize {
        self.chains().len()
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms().len()
    }

    pub fn num_entities(&self) -> usize {
        self.entities().len()
    }

    pub fn polymer_entity_count(&self) -> usize {
        self.entities().iter().filter(|e| e.is_polymer()).count()
    }

    pub fn nonpolymer_entity_count(&self) -> usize {
        self.entities().iter().filter(|e| e.is_nonpolymer()).count()
    }

    /// 链 ID → 单字母序列
    pub fn sequences(&self) -> BTreeMap<String, String> {
        self.chains()
            .iter()
            .map(|c| (c.id.clone(), c.sequence()))
            .collect()
    }

    pub fn chain_ids(&self) -> Vec<&str> {
        self.chains().iter().map(|c| c.id.as_str()).collect()
    }

    pub fn get_chain(&self, chain_id: &str) -> Option<&Chain> {
        self.chains().iter().find(|c| c.id == chain_id)
    }

    /// 扁平投影
    pub fn record(&self) -> StructureRecord {
        let m = self.metadata();
        StructureRecord {
            entry_id: m.entry_id.clone(),
            format: m.format,
            method: m.method.clone(),
            resolution: m.resolution,
            release_date: m.release_date.clone(),
            deposit_date: m.deposit_date.clone(),
            title: m.title.clone(),
            space_group: m.space_group.clone(),
            entity_count: self.num_entities(),
            polymer_entity_count: self.polymer_entity_count(),
            nonpolymer_entity_count: self.nonpolymer_entity_count(),
            chain_count: self.num_chains(),
            atom_count: self.num_atoms(),
        }
    }
}

impl From<CifStructure> for Structure {
    fn from(s: CifStructure) -> Self {
        Structure::Cif(s)
    }
}

impl From<PdbStructure> for Structure {
    fn from(s: PdbStructure) -> Self {
        Structure::Pdb(s)
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, chains={}, entities={}, atoms={})",
            self.variant_name(),
            self.entry_id(),
            self.num_chains(),
            self.num_entities(),
            self.num_atoms()
        )
    }
}

/// 供表格存储使用的扁平投影
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureRecord {
    pub entry_id: String,
    pub format: SourceFormat,
    pub method: Option<String>,
    pub resolution: Option<f64>,
    pub release_date: Option<String>,
    pub deposit_date: Option<String>,
    pub title: Option<String>,
    pub space_group: Option<String>,
    pub entity_count: usize,
    pub polymer_entity_count: usize,
    pub nonpolymer_entity_count: usize,
    pub chain_count: usize,
    pub atom_count: usize,
}

impl StructureRecord {
    /// 投影字段名（即表头），顺序固定
    pub const KEYS: [&'static str; 13] = [
        "entry_id",
        "format",
        "method",
        "resolution",
        "release_date",
        "deposit_date",
        "title",
        "space_group",
        "entity_count",
        "polymer_entity_count",
        "nonpolymer_entity_count",
        "chain_count",
        "atom_count",
    ];
}
