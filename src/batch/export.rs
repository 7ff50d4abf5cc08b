//! # 清单导出
//!
//! 将结构的扁平投影（`StructureRecord`）写为 CSV 表格，表头即投影字段名。
//!
//! ## 依赖关系
//! - 被库调用方使用
//! - 使用 `models/structure.rs` 的 StructureRecord
//! - 使用 `csv` 库写入 CSV

use crate::error::{MoldataError, Result};
use crate::models::StructureRecord;

use std::io::Write;
use std::path::Path;

/// 写入任意输出流
pub fn write_records_csv<W: Write>(records: &[StructureRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    if records.is_empty() {
        wtr.write_record(StructureRecord::KEYS)?;
    }
    for record in records {
        wtr.serialize(record)?;
    }

    wtr.flush().map_err(|e| MoldataError::FileWriteError {
        path: "<writer>".to_string(),
        source: e,
    })?;

    Ok(())
}

/// 写入 CSV 文件
pub fn to_csv(records: &[StructureRecord], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    if records.is_empty() {
        wtr.write_record(StructureRecord::KEYS)?;
    }
    for record in records {
        wtr.serialize(record)?;
    }

    wtr.flush().map_err(|e| MoldataError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
