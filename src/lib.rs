//! # moldata - 大分子结构解析
//!
//! 将 mmCIF 与经典 PDB 定长格式的坐标文件解析为统一、可查询的内存结构模型：
//! 实体、链、残基、原子以及描述性元数据（分辨率、实验方法、晶胞、空间群）。
//!
//! ## 用法
//! ```no_run
//! use moldata::batch::StructureCollection;
//! use moldata::parsers::parse_structure_file;
//! use std::path::Path;
//!
//! let structure = parse_structure_file(Path::new("4hhb.cif.gz"))?;
//! println!("{} {:?}", structure.entry_id(), structure.resolution());
//!
//! let collection = StructureCollection::from_directory("archive/", "*.cif.gz")?;
//! let high_res = collection.filter(|s| s.resolution().is_some_and(|r| r < 2.0))?;
//! println!("{:?}", high_res.summary()?);
//! # Ok::<(), moldata::MoldataError>(())
//! ```
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── batch/      (结构集合、文件收集、统计、CSV 导出)
//!   │     └── parsers/   (注册表分派 → 格式构建器)
//!   │           ├── cif_tokenizer (mmCIF 词法)
//!   │           ├── mmcif / pdb   (格式构建器)
//!   │           └── models/       (数据模型)
//!   ├── utils/      (gzip 透明读取)
//!   └── error.rs    (错误处理)
//! ```

pub mod batch;
pub mod error;
pub mod models;
pub mod parsers;
pub mod utils;

pub use error::{MoldataError, Result};
pub use models::{Atom, Chain, Entity, EntityType, Residue, Structure, StructureMetadata};
pub use parsers::{parse_structure_file, ParserRegistry, StructureFormat};
