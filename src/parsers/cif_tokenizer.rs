//! # mmCIF 词法器
//!
//! 将 mmCIF 文本转换为有序的 (键, 值) 对序列。`loop_` 表被展开为
//! 每个 (列, 行) 单元一个键值对，按列优先顺序输出。
//!
//! ## 语法说明
//! ```text
//! data_4HHB
//! _entry.id   4HHB
//! _struct.title
//! ;THE CRYSTAL STRUCTURE OF ...
//! ;
//! loop_
//! _entity.id
//! _entity.type
//! 1 polymer
//! 2 'non-polymer'
//! ```
//! - 仅解析第一个 `data_` 块
//! - 字段形式：单引号、双引号、无引号、分号文本块
//! - 引号内的双写引号（`''` / `""`）折叠为单个引号
//! - 裸 `.` 与 `?` 表示缺失值
//!
//! ## 依赖关系
//! - 被 `parsers/mmcif.rs` 使用
//! - 使用 `utils/reader.rs` 读取（可能压缩的）文件

use crate::error::Result;
use crate::utils::reader;

use std::path::Path;
use std::str::Lines;
use tracing::{debug, warn};

/// 单个键值对
#[derive(Debug, Clone, PartialEq)]
pub struct CifPair {
    /// 原样保留的 `_category.attribute` 键
    pub key: String,
    /// 解包后的值，`.`/`?` 为 None
    pub value: Option<String>,
}

/// 词法器输出：有序键值对序列及查询辅助方法
#[derive(Debug, Clone, Default)]
pub struct CifTokens {
    pairs: Vec<CifPair>,
}

impl CifTokens {
    pub fn pairs(&self) -> &[CifPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// 单值查询：第一个键匹配（不区分大小写）且值非空的项
    ///
    /// `cat_attr` 可带或不带前导下划线，如 `"entry.id"`。
    pub fn single(&self, cat_attr: &str) -> Option<&str> {
        self.pairs
            .iter()
            .filter(|p| key_matches(&p.key, cat_attr))
            .filter_map(|p| p.value.as_deref())
            .find(|v| !v.is_empty())
    }

    /// 按出现顺序返回同一键的全部值，缺失值保留为 None 以保持行对齐
    pub fn loop_values(&self, cat_attr: &str) -> Vec<Option<&str>> {
        self.pairs
            .iter()
            .filter(|p| key_matches(&p.key, cat_attr))
            .map(|p| p.value.as_deref())
            .collect()
    }

    /// 单值数值查询，解析失败返回 None
    pub fn float(&self, cat_attr: &str) -> Option<f64> {
        parse_float(self.single(cat_attr))
    }
}

/// 数值转换，缺失或解析失败返回 None
pub fn parse_float(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok())
}

fn key_matches(key: &str, cat_attr: &str) -> bool {
    let key = key.strip_prefix('_').unwrap_or(key);
    let wanted = cat_attr.strip_prefix('_').unwrap_or(cat_attr);
    key.eq_ignore_ascii_case(wanted)
}

/// 读取并切分 mmCIF 文件（`.gz` 透明解压）
pub fn tokenize_file(path: &Path) -> Result<CifTokens> {
    let content = reader::read_text(path, "mmcif")?;
    let tokens = tokenize_str(&content);
    debug!(path = %path.display(), pairs = tokens.len(), "tokenized mmCIF");
    Ok(tokens)
}

/// 从字符串内容切分 mmCIF
pub fn tokenize_str(content: &str) -> CifTokens {
    let mut state = TokenizerState::default();
    let mut lines = content.lines();

    while let Some(raw) = lines.next() {
        let line = raw.trim_end();

        // 分号文本块必须从行首开始
        if line.starts_with(';') {
            let text = read_text_field(line, &mut lines);
            state.push_value(text);
            continue;
        }

        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') {
            state.close_header_only_loop();
            continue;
        }

        if starts_with_ignore_case(trimmed, "data_") {
            // 第二个数据块：结束
            if state.has_content() {
                warn!(block = trimmed, "ignoring data blocks after the first");
                break;
            }
            continue;
        }

        if starts_with_ignore_case(trimmed, "loop_") {
            state.start_loop();
            continue;
        }

        if trimmed.starts_with('_') {
            state.push_item_line(trimmed);
            continue;
        }

        for value in split_fields(trimmed) {
            state.push_value(value);
        }
    }

    state.finish()
}

#[derive(Default)]
struct TokenizerState {
    pairs: Vec<CifPair>,
    in_loop: bool,
    loop_cols: Vec<String>,
    loop_values: Vec<Option<String>>,
    pending_key: Option<String>,
}

impl TokenizerState {
    fn has_content(&self) -> bool {
        !self.pairs.is_empty() || !self.loop_values.is_empty()
    }

    fn start_loop(&mut self) {
        self.close_pending();
        self.flush_loop();
        self.in_loop = true;
    }

    fn push_item_line(&mut self, line: &str) {
        let (key, rest) = match line.find(char::is_whitespace) {
            Some(pos) => (&line[..pos], line[pos..].trim()),
            None => (line, ""),
        };

        if self.in_loop && self.loop_values.is_empty() && !rest.is_empty() {
            // 表头后直接出现带值的单项：空循环结束
            self.close_header_only_loop();
        }

        if self.in_loop && self.loop_values.is_empty() {
            // 表头阶段
            self.loop_cols.push(key.to_string());
            for value in split_fields(rest) {
                self.push_value(value);
            }
            return;
        }

        if self.in_loop {
            // 数据行之后出现新键：循环结束
            self.flush_loop();
        }

        self.close_pending();
        if rest.is_empty() {
            self.pending_key = Some(key.to_string());
        } else {
            self.pairs.push(CifPair {
                key: key.to_string(),
                value: single_value(rest),
            });
        }
    }

    fn push_value(&mut self, value: Option<String>) {
        if let Some(key) = self.pending_key.take() {
            self.pairs.push(CifPair { key, value });
        } else if self.in_loop && !self.loop_cols.is_empty() {
            self.loop_values.push(value);
        }
    }

    /// 只有表头、没有数据行的循环在遇到注释或带值单项时结束并丢弃
    fn close_header_only_loop(&mut self) {
        if self.in_loop && self.loop_values.is_empty() && !self.loop_cols.is_empty() {
            debug!(columns = self.loop_cols.len(), "dropped loop without rows");
            self.loop_cols.clear();
            self.in_loop = false;
        }
    }

    fn close_pending(&mut self) {
        if let Some(key) = self.pending_key.take() {
            self.pairs.push(CifPair { key, value: None });
        }
    }

    /// 按列优先展开缓冲的循环：N 列 × M 行 → N×M 个键值对
    fn flush_loop(&mut self) {
        let cols = std::mem::take(&mut self.loop_cols);
        let values = std::mem::take(&mut self.loop_values);
        self.in_loop = false;

        if cols.is_empty() || values.is_empty() {
            return;
        }

        let rows: Vec<&[Option<String>]> = values.chunks(cols.len()).collect();
        for (i, col) in cols.iter().enumerate() {
            for row in &rows {
                if let Some(value) = row.get(i) {
                    self.pairs.push(CifPair {
                        key: col.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
    }

    fn finish(mut self) -> CifTokens {
        self.close_pending();
        self.flush_loop();
        CifTokens { pairs: self.pairs }
    }
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}

/// 单行键值的值部分：恰好一个字段时解包，否则保留整段文本
fn single_value(rest: &str) -> Option<String> {
    let mut fields = split_fields(rest);
    if fields.len() == 1 {
        fields.pop().flatten()
    } else {
        Some(rest.to_string())
    }
}

/// 读取分号文本块，`first` 为以 `;` 开头的首行
fn read_text_field(first: &str, lines: &mut Lines<'_>) -> Option<String> {
    let mut text = first[1..].to_string();
    for line in lines.by_ref() {
        if line.starts_with(';') {
            break;
        }
        text.push('\n');
        text.push_str(line.trim_end());
    }

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// 按空白切分一行字段，识别单引号/双引号字段
///
/// 引号只有在其后为空白或行尾时才闭合字段；
/// 未引用的 `.`/`?` 返回 None，未引用的 `#` 开始行内注释。
pub fn split_fields(line: &str) -> Vec<Option<String>> {
    let chars: Vec<char> = line.chars().collect();
    let mut fields = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '\'' || c == '"' {
            let start = i + 1;
            let mut end = start;
            while end < chars.len() {
                let closes = chars[end] == c
                    && (end + 1 == chars.len() || chars[end + 1].is_whitespace());
                if closes {
                    break;
                }
                end += 1;
            }
            let inner: String = chars[start..end].iter().collect();
            let doubled: String = [c, c].iter().collect();
            fields.push(Some(inner.replace(&doubled, &c.to_string())));
            i = end + 1;
        } else {
            if c == '#' {
                break;
            }
            let start = i;
            while i < chars.len() && !chars[i].is_whitespace() {
                i += 1;
            }
            let token: String = chars[start..i].iter().collect();
            fields.push(match token.as_str() {
                "." | "?" => None,
                _ => Some(token),
            });
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_split_fields_shapes() {
        let fields = split_fields(r#"ATOM 1 'don''t' "say ""hi""" . ? plain"#);
        assert_eq!(
            fields,
            owned(&[
                Some("ATOM"),
                Some("1"),
                Some("don't"),
                Some(r#"say "hi""#),
                None,
                None,
                Some("plain"),
            ])
        );
    }

    #[test]
    fn test_split_fields_quoted_placeholders_are_literal() {
        assert_eq!(split_fields("'.' \"?\""), owned(&[Some("."), Some("?")]));
    }

    #[test]
    fn test_split_fields_embedded_quote_and_comment() {
        assert_eq!(
            split_fields(r#"O5' "O5'" 'it's' # trailing"#),
            owned(&[Some("O5'"), Some("O5'"), Some("it's")])
        );
    }

    #[test]
    fn test_single_items() {
        let tokens = tokenize_str(
            "data_TEST\n\
             # comment\n\
             _entry.id   1ABC\n\
             _struct.title 'don''t panic'\n\
             _exptl.method ?\n\
             _cell.length_a 63.150\n",
        );
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens.pairs()[0].key, "_entry.id");
        assert_eq!(tokens.single("entry.id"), Some("1ABC"));
        assert_eq!(tokens.single("_ENTRY.ID"), Some("1ABC"));
        assert_eq!(tokens.single("struct.title"), Some("don't panic"));
        assert_eq!(tokens.single("exptl.method"), None);
        assert_eq!(tokens.float("cell.length_a"), Some(63.15));
        assert_eq!(tokens.float("struct.title"), None);
    }

    #[test]
    fn test_unquoted_multiword_value_kept_whole() {
        let tokens = tokenize_str("_struct.title HUMAN DEOXYHAEMOGLOBIN\n");
        assert_eq!(tokens.single("struct.title"), Some("HUMAN DEOXYHAEMOGLOBIN"));
    }

    #[test]
    fn test_loop_expansion_column_major() {
        let tokens = tokenize_str(
            "data_TEST\n\
             loop_\n\
             _entity.id\n\
             _entity.type\n\
             1 polymer\n\
             2 non-polymer\n\
             3 water\n",
        );
        assert_eq!(tokens.len(), 6);
        let keys: Vec<&str> = tokens.pairs().iter().map(|p| p.key.as_str()).collect();
        assert_eq!(
            keys,
            [
                "_entity.id",
                "_entity.id",
                "_entity.id",
                "_entity.type",
                "_entity.type",
                "_entity.type"
            ]
        );
        assert_eq!(
            tokens.loop_values("entity.type"),
            [Some("polymer"), Some("non-polymer"), Some("water")]
        );
    }

    #[test]
    fn test_loop_keeps_absent_cells_aligned() {
        let tokens = tokenize_str(
            "loop_\n_atom_site.id\n_atom_site.label_seq_id\n1 1\n2 .\n3 ?\n4 2\n",
        );
        assert_eq!(
            tokens.loop_values("atom_site.label_seq_id"),
            [Some("1"), None, None, Some("2")]
        );
    }

    #[test]
    fn test_new_loop_flushes_previous() {
        let tokens = tokenize_str(
            "loop_\n_a.x\n1\n2\nloop_\n_b.y\n_b.z\nq r\n",
        );
        assert_eq!(tokens.loop_values("a.x"), [Some("1"), Some("2")]);
        assert_eq!(tokens.loop_values("b.y"), [Some("q")]);
        assert_eq!(tokens.loop_values("b.z"), [Some("r")]);
    }

    #[test]
    fn test_item_after_loop_rows_ends_loop() {
        let tokens = tokenize_str(
            "loop_\n_entity.id\n_entity.type\n1 polymer\n#\n_cell.length_a 63.150\n",
        );
        assert_eq!(tokens.loop_values("entity.id"), [Some("1")]);
        assert_eq!(tokens.float("cell.length_a"), Some(63.15));
    }

    #[test]
    fn test_loop_rows_may_wrap_lines() {
        let tokens = tokenize_str(
            "loop_\n_entity.id\n_entity.type\n_entity.pdbx_description\n\
             1 polymer\n'HEMOGLOBIN ALPHA'\n2 water water\n",
        );
        assert_eq!(
            tokens.loop_values("entity.pdbx_description"),
            [Some("HEMOGLOBIN ALPHA"), Some("water")]
        );
    }

    #[test]
    fn test_text_fields() {
        let tokens = tokenize_str(
            "_struct.title\n;THE CRYSTAL STRUCTURE\nOF HUMAN DEOXYHAEMOGLOBIN\n;\n\
             loop_\n_entity.id\n_entity.pdbx_description\n1\n;multi\nline\n;\n2 water\n",
        );
        assert_eq!(
            tokens.single("struct.title"),
            Some("THE CRYSTAL STRUCTURE\nOF HUMAN DEOXYHAEMOGLOBIN")
        );
        assert_eq!(
            tokens.loop_values("entity.pdbx_description"),
            [Some("multi\nline"), Some("water")]
        );
    }

    #[test]
    fn test_value_on_following_line() {
        let tokens = tokenize_str("_exptl.method\n'X-RAY DIFFRACTION'\n_entry.id 1ABC\n");
        assert_eq!(tokens.single("exptl.method"), Some("X-RAY DIFFRACTION"));
        assert_eq!(tokens.single("entry.id"), Some("1ABC"));
    }

    #[test]
    fn test_only_first_data_block() {
        let tokens = tokenize_str(
            "data_FIRST\n_entry.id FIRST\ndata_SECOND\n_entry.id SECOND\n",
        );
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens.single("entry.id"), Some("FIRST"));
    }

    #[test]
    fn test_second_block_after_loop_rows() {
        let tokens = tokenize_str("data_A\nloop_\n_x.y\n1\n2\ndata_B\nloop_\n_x.y\n3\n");
        assert_eq!(tokens.loop_values("x.y"), [Some("1"), Some("2")]);
    }

    #[test]
    fn test_loop_without_rows_ends_at_comment() {
        let tokens = tokenize_str(
            "data_X\nloop_\n_a.x\n_a.y\n#\n_cell.length_a 63.150\n_entry.id 1ABC\n",
        );
        assert_eq!(tokens.float("cell.length_a"), Some(63.15));
        assert_eq!(tokens.single("entry.id"), Some("1ABC"));
        assert!(tokens.loop_values("a.x").is_empty());
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_loop_without_rows_ends_at_item_value() {
        let tokens = tokenize_str("loop_\n_a.x\n_a.y\n_cell.length_b 83.590\n");
        assert_eq!(tokens.float("cell.length_b"), Some(83.59));
        assert!(tokens.loop_values("a.y").is_empty());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float(Some("1.74")), Some(1.74));
        assert_eq!(parse_float(Some("n/a")), None);
        assert_eq!(parse_float(None), None);
    }
}
