//! # 数据模型模块
//!
//! 定义与文件格式无关的结构模型：原子、残基、链、实体、元数据，
//! 以及统一的 `Structure` 抽象。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `batch/` 使用
//! - 子模块: atom, residue, chain, entity, metadata, structure

pub mod atom;
pub mod chain;
pub mod entity;
pub mod metadata;
pub mod residue;
pub mod structure;

pub use atom::Atom;
pub use chain::Chain;
pub use entity::{Entity, EntityType};
pub use metadata::{SourceFormat, StructureMetadata, UnitCell};
pub use residue::{one_letter_code, Residue, THREE_TO_ONE};
pub use structure::{Structure, StructureRecord};
