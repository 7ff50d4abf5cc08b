//! # 批量处理模块
//!
//! 面向一批结构文件的惰性集合。
//!
//! ## 功能
//! - 目录扫描与文件收集
//! - 按索引惰性解析并缓存
//! - 过滤、统计
//! - 扁平投影导出为 CSV 清单
//!
//! ## 依赖关系
//! - 使用 `parsers/` 解析结构
//! - 使用 `walkdir`、`glob` 收集文件，`csv` 导出

pub mod collection;
pub mod collector;
pub mod export;
pub mod summary;

pub use collection::StructureCollection;
pub use collector::FileCollector;
pub use summary::CollectionSummary;
