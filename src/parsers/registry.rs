//! # 解析器注册表
//!
//! 文件后缀（小写）→ 结构格式的映射。内置 mmCIF 与 PDB 两种格式，
//! 调用方可注册更多后缀。分派时对所有已注册后缀做大小写不敏感的匹配，
//! 取最长匹配（`.cif.gz` 优先于 `.gz`）；无匹配返回 `UnsupportedFormat`。
//!
//! 注册表是普通值：由调用方显式构建并注入集合，不存在进程级全局状态。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 和 `batch/collection.rs` 使用
//! - 使用 `parsers/mmcif.rs`、`parsers/pdb.rs`

use super::mmcif::CifStructure;
use super::pdb::PdbStructure;
use crate::error::{MoldataError, Result};
use crate::models::Structure;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// 结构文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureFormat {
    Mmcif,
    Pdb,
}

impl StructureFormat {
    /// 用该格式的构建器解析文件
    pub fn parse(self, path: &Path) -> Result<Structure> {
        match self {
            StructureFormat::Mmcif => CifStructure::from_file(path).map(Structure::from),
            StructureFormat::Pdb => PdbStructure::from_file(path).map(Structure::from),
        }
    }

    /// 该格式的内置后缀
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            StructureFormat::Mmcif => CifStructure::EXTENSIONS,
            StructureFormat::Pdb => PdbStructure::EXTENSIONS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StructureFormat::Mmcif => "mmcif",
            StructureFormat::Pdb => "pdb",
        }
    }
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 后缀 → 格式 注册表
#[derive(Debug, Clone)]
pub struct ParserRegistry {
    formats: BTreeMap<String, StructureFormat>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserRegistry {
    /// 含内置 mmCIF 与 PDB 格式的注册表
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for format in [StructureFormat::Mmcif, StructureFormat::Pdb] {
            registry.register(format.extensions(), format);
        }
        registry
    }

    pub fn empty() -> Self {
        ParserRegistry {
            formats: BTreeMap::new(),
        }
    }

    /// 注册后缀（自动小写）；已存在的后缀被覆盖
    pub fn register(&mut self, extensions: &[&str], format: StructureFormat) {
        for ext in extensions {
            self.formats.insert(ext.to_lowercase(), format);
        }
    }

    /// 按最长后缀匹配选择格式
    pub fn resolve(&self, path: &Path) -> Result<StructureFormat> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let matched = self
            .formats
            .iter()
            .filter(|(ext, _)| name.ends_with(ext.as_str()))
            .max_by_key(|(ext, _)| ext.len());

        match matched {
            Some((ext, &format)) => {
                debug!(path = %path.display(), suffix = %ext, format = %format, "resolved parser");
                Ok(format)
            }
            None => Err(MoldataError::UnsupportedFormat {
                path: path.display().to_string(),
                supported: self.extensions(),
            }),
        }
    }

    /// 解析文件：先分派，再调用对应构建器
    pub fn parse(&self, path: &Path) -> Result<Structure> {
        self.resolve(path)?.parse(path)
    }

    /// 已注册后缀（有序）
    pub fn extensions(&self) -> Vec<String> {
        self.formats.keys().cloned().collect()
    }
}
