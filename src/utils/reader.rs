//! # 文本读取工具
//!
//! 读取结构文件的完整文本内容，文件名以 `.gz` 结尾时透明解压。
//! 非法 UTF-8 字节按替换字符处理，不会中断解析。
//!
//! ## 依赖关系
//! - 被 `parsers/cif_tokenizer.rs` 和 `parsers/pdb.rs` 调用
//! - 使用 `flate2` 解压 gzip

use crate::error::{MoldataError, Result};

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 文件名是否以 `.gz` 结尾（不区分大小写）
pub fn is_gzip(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_ascii_lowercase().ends_with(".gz"))
        .unwrap_or(false)
}

/// 读取文件文本
///
/// `format` 仅用于错误信息中标注格式。
pub fn read_text(path: &Path, format: &str) -> Result<String> {
    if !path.exists() {
        return Err(MoldataError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let file = File::open(path).map_err(|e| MoldataError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| MoldataError::ParseError {
            format: format.to_string(),
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_is_gzip() {
        assert!(is_gzip(Path::new("1abc.cif.gz")));
        assert!(is_gzip(Path::new("/data/PDB1ABC.ENT.GZ")));
        assert!(!is_gzip(Path::new("1abc.cif")));
    }

    #[test]
    fn test_read_plain_and_gzip() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("a.pdb");
        std::fs::write(&plain, "HEADER\n").unwrap();
        assert_eq!(read_text(&plain, "pdb").unwrap(), "HEADER\n");

        let gz = dir.path().join("a.pdb.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"HEADER gz\n").unwrap();
        std::fs::write(&gz, encoder.finish().unwrap()).unwrap();
        assert_eq!(read_text(&gz, "pdb").unwrap(), "HEADER gz\n");
    }

    #[test]
    fn test_missing_file() {
        let err = read_text(Path::new("/nonexistent/path.cif"), "mmcif").unwrap_err();
        assert!(matches!(err, MoldataError::FileNotFound { .. }));
    }

    #[test]
    fn test_corrupt_gzip_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let gz = dir.path().join("broken.cif.gz");
        std::fs::write(&gz, b"definitely not gzip").unwrap();
        let err = read_text(&gz, "mmcif").unwrap_err();
        assert!(matches!(err, MoldataError::ParseError { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.cif");
        std::fs::write(&path, b"data_X\n_entry.id \xff1ABC\n").unwrap();
        let text = read_text(&path, "mmcif").unwrap();
        assert!(text.contains("1ABC"));
    }
}
