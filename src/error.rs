//! # 统一错误处理模块
//!
//! 定义 moldata 的所有错误类型，使用 `thiserror` 派生。
//!
//! 单条记录级别的问题（某一行原子坐标无法解析、CRYST1 某个字段损坏）
//! 不会成为错误值：解析器直接丢弃该行/字段并通过 `tracing` 记录。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// moldata 统一错误类型
#[derive(Error, Debug)]
pub enum MoldataError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("No parser for '{path}'. Supported: {}", supported.join(", "))]
    UnsupportedFormat {
        path: String,
        supported: Vec<String>,
    },

    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 集合访问错误
    // ─────────────────────────────────────────────────────────────
    #[error("Index {index} out of range for collection of length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, MoldataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_lists_suffixes() {
        let err = MoldataError::UnsupportedFormat {
            path: "x.xyz".to_string(),
            supported: vec![".cif".to_string(), ".pdb".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("x.xyz"));
        assert!(msg.contains(".cif, .pdb"));
    }
}
