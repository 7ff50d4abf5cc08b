//! # 结构集合
//!
//! 包装一个有序的文件路径列表，按索引惰性解析并缓存：
//! 同一索引第二次访问返回同一个 `Rc<Structure>`，不会重新解析。
//!
//! ## 功能
//! - 长度、正/负索引、切片、迭代
//! - `filter`：对每个元素求值谓词（强制全部解析），保留已缓存条目
//! - `summary`：分辨率/方法/原子/链统计
//! - 目录扫描构造（递归 glob，排序）
//!
//! 解析失败不会被吞掉：迭代、过滤、统计都会把错误连同出错路径返回给调用方。
//! 集合是单线程结构（`Rc` + `OnceCell`），跨线程请每个线程持有独立实例。
//!
//! ## 依赖关系
//! - 使用 `batch/collector.rs` 扫描目录
//! - 使用 `parsers/registry.rs` 分派解析器
//! - 使用 `batch/summary.rs` 聚合统计

use super::collector::FileCollector;
use super::summary::CollectionSummary;
use crate::error::{MoldataError, Result};
use crate::models::{Structure, StructureRecord};
use crate::parsers::{ParserRegistry, StructureFormat};

use once_cell::unsync::OnceCell;
use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, error, info};

/// 惰性解析的结构集合
pub struct StructureCollection {
    paths: Vec<PathBuf>,
    /// 指定格式时跳过注册表分派
    format: Option<StructureFormat>,
    registry: ParserRegistry,
    cache: Vec<OnceCell<Rc<Structure>>>,
}

impl StructureCollection {
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        let cache = paths.iter().map(|_| OnceCell::new()).collect();
        StructureCollection {
            paths,
            format: None,
            registry: ParserRegistry::new(),
            cache,
        }
    }

    /// 递归扫描目录，按文件名模式收集并排序
    pub fn from_directory(root: impl AsRef<Path>, pattern: &str) -> Result<Self> {
        let root = root.as_ref();
        let paths = FileCollector::new(root).with_pattern(pattern).collect()?;
        info!(root = %root.display(), pattern, matched = paths.len(), "collected structure files");
        Ok(Self::from_paths(paths))
    }

    /// 所有路径使用同一格式解析
    pub fn with_format(mut self, format: StructureFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// 替换分派所用的注册表
    pub fn with_registry(mut self, registry: ParserRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn format(&self) -> Option<StructureFormat> {
        self.format
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// 按索引取结构，负索引从末尾计数
    pub fn get(&self, index: isize) -> Result<Rc<Structure>> {
        let len = self.len();
        let resolved = if index < 0 {
            index.checked_add(len as isize)
        } else {
            Some(index)
        };

        match resolved {
            Some(i) if i >= 0 && (i as usize) < len => self.load(i as usize),
            _ => Err(MoldataError::IndexOutOfRange { index, len }),
        }
    }

    /// 切片：越界的边界被截断，结果为普通列表
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Result<Vec<Rc<Structure>>> {
        let len = self.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        }
        .min(len);

        (start..end.max(start)).map(|i| self.load(i)).collect()
    }

    /// 按路径顺序逐个解析
    pub fn iter(&self) -> impl Iterator<Item = Result<Rc<Structure>>> + '_ {
        (0..self.len()).map(move |i| self.load(i))
    }

    /// 全部解析为列表
    pub fn to_list(&self) -> Result<Vec<Rc<Structure>>> {
        self.iter().collect()
    }

    /// 保留满足谓词的结构，新集合沿用已解析的缓存
    pub fn filter<F>(&self, mut predicate: F) -> Result<Self>
    where
        F: FnMut(&Structure) -> bool,
    {
        let mut paths = Vec::new();
        let mut cache = Vec::new();

        for (i, path) in self.paths.iter().enumerate() {
            let structure = self.load(i)?;
            if predicate(&*structure) {
                paths.push(path.clone());
                cache.push(OnceCell::with_value(structure));
            }
        }

        debug!(kept = paths.len(), total = self.len(), "filtered collection");
        Ok(StructureCollection {
            paths,
            format: self.format,
            registry: self.registry.clone(),
            cache,
        })
    }

    pub fn summary(&self) -> Result<CollectionSummary> {
        let structures = self.to_list()?;
        Ok(CollectionSummary::from_structures(
            structures.iter().map(|s| &**s),
        ))
    }

    pub fn entry_ids(&self) -> Result<Vec<String>> {
        self.iter()
            .map(|s| s.map(|s| s.entry_id().to_string()))
            .collect()
    }

    /// 每个结构的扁平投影
    pub fn records(&self) -> Result<Vec<StructureRecord>> {
        self.iter().map(|s| s.map(|s| s.record())).collect()
    }

    fn load(&self, index: usize) -> Result<Rc<Structure>> {
        self.cache[index]
            .get_or_try_init(|| self.parse_path(&self.paths[index]).map(Rc::new))
            .map(Rc::clone)
    }

    fn parse_path(&self, path: &Path) -> Result<Structure> {
        let parsed = match self.format {
            Some(format) => format.parse(path),
            None => self.registry.parse(path),
        };
        parsed.map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to load structure");
            e
        })
    }
}

impl fmt::Display for StructureCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StructureCollection(n={})", self.len())
    }
}

impl fmt::Debug for StructureCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructureCollection")
            .field("paths", &self.paths)
            .field("format", &self.format)
            .field("cached", &self.cache.iter().filter(|c| c.get().is_some()).count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE_CIF: &str = include_str!("../../tests/fixtures/sample.cif");
    const SAMPLE_PDB: &str = include_str!("../../tests/fixtures/sample.pdb");

    const NMR_PDB: &str = "\
HEADER    DE NOVO PROTEIN                         01-JAN-20   7NMR
EXPDTA    SOLUTION NMR
ATOM      1  CA  GLY A   1       0.000   0.000   0.000  1.00  0.00           C
";

    fn fixture_dir() -> (TempDir, Vec<PathBuf>) {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            ("4hhb.cif", SAMPLE_CIF),
            ("4hhb.pdb", SAMPLE_PDB),
            ("7nmr.pdb", NMR_PDB),
        ];
        let paths = files
            .iter()
            .map(|(name, content)| {
                let path = dir.path().join(name);
                fs::write(&path, content).unwrap();
                path
            })
            .collect();
        (dir, paths)
    }

    #[test]
    fn test_indexing() {
        let (_dir, paths) = fixture_dir();
        let collection = StructureCollection::from_paths(&paths);
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.get(0).unwrap().entry_id(), "4HHB");
        assert_eq!(collection.get(-1).unwrap().entry_id(), "7NMR");
        assert!(matches!(
            collection.get(3),
            Err(MoldataError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(collection.get(-4).is_err());
    }

    #[test]
    fn test_parse_is_cached() {
        let (_dir, paths) = fixture_dir();
        let collection = StructureCollection::from_paths(&paths);
        let first = collection.get(1).unwrap();
        let again = collection.get(-2).unwrap();
        assert!(Rc::ptr_eq(&first, &again));
    }

    #[test]
    fn test_slice_clamps() {
        let (_dir, paths) = fixture_dir();
        let collection = StructureCollection::from_paths(&paths);
        assert_eq!(collection.slice(1..).unwrap().len(), 2);
        assert_eq!(collection.slice(..10).unwrap().len(), 3);
        assert!(collection.slice(5..).unwrap().is_empty());
    }

    #[test]
    fn test_filter_keeps_cache() {
        let (_dir, paths) = fixture_dir();
        let collection = StructureCollection::from_paths(&paths);
        let xray = collection
            .filter(|s| s.method() == Some("X-RAY DIFFRACTION"))
            .unwrap();

        assert_eq!(xray.len(), 2);
        assert_eq!(xray.paths(), &paths[..2]);
        assert!(Rc::ptr_eq(&xray.get(0).unwrap(), &collection.get(0).unwrap()));
        assert_eq!(xray.to_string(), "StructureCollection(n=2)");
    }

    #[test]
    fn test_filter_no_matches() {
        let (_dir, paths) = fixture_dir();
        let collection = StructureCollection::from_paths(&paths).with_format(StructureFormat::Pdb);
        let none = collection.filter(|s| s.num_atoms() > 1000).unwrap();

        assert_eq!(none.len(), 0);
        assert!(none.is_empty());
        assert!(none.to_list().unwrap().is_empty());
        assert_eq!(none.format(), Some(StructureFormat::Pdb));
        assert!(none.get(0).is_err());
    }

    #[test]
    fn test_summary() {
        let (_dir, paths) = fixture_dir();
        let summary = StructureCollection::from_paths(&paths).summary().unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.resolution_mean, Some(1.74));
        assert_eq!(summary.methods["X-RAY DIFFRACTION"], 2);
        assert_eq!(summary.methods["SOLUTION NMR"], 1);
        assert_eq!(summary.total_atoms, 19);
        assert_eq!(summary.total_chains, 5);
    }

    #[test]
    fn test_errors_propagate() {
        let (dir, mut paths) = fixture_dir();
        let bad = dir.path().join("model.xyz");
        fs::write(&bad, "").unwrap();
        paths.push(bad);

        let collection = StructureCollection::from_paths(&paths);
        assert!(collection.get(0).is_ok());
        let err = collection.to_list().unwrap_err();
        match err {
            MoldataError::UnsupportedFormat { path, .. } => assert!(path.ends_with("model.xyz")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(collection.filter(|_| true).is_err());
    }

    #[test]
    fn test_explicit_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.txt");
        fs::write(&path, SAMPLE_PDB).unwrap();

        let collection = StructureCollection::from_paths([&path]);
        assert!(collection.get(0).is_err());

        let collection = StructureCollection::from_paths([&path]).with_format(StructureFormat::Pdb);
        assert_eq!(collection.get(0).unwrap().entry_id(), "4HHB");
    }

    #[test]
    fn test_custom_registry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.txt");
        fs::write(&path, SAMPLE_CIF).unwrap();

        let mut registry = ParserRegistry::new();
        registry.register(&[".txt"], StructureFormat::Mmcif);
        let collection = StructureCollection::from_paths([&path]).with_registry(registry);
        assert_eq!(collection.get(0).unwrap().num_atoms(), 9);
    }

    #[test]
    fn test_from_directory() {
        let (dir, _paths) = fixture_dir();
        let collection = StructureCollection::from_directory(dir.path(), "*.pdb").unwrap();
        assert_eq!(collection.entry_ids().unwrap(), ["4HHB", "7NMR"]);

        let missing = StructureCollection::from_directory(dir.path().join("nope"), "*.cif");
        assert!(matches!(missing, Err(MoldataError::DirectoryNotFound { .. })));
    }
}
