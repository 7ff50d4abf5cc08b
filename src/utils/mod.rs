//! # 工具函数模块
//!
//! 提供（可能经 gzip 压缩的）文本文件读取。
//!
//! ## 依赖关系
//! - 被 `parsers/` 模块使用
//! - 子模块: reader

pub mod reader;
