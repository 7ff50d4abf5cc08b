//! # 残基数据模型
//!
//! 残基（氨基酸、核苷酸或配体）及标准氨基酸三字母→单字母对照表。
//!
//! ## 依赖关系
//! - 被 `models/chain.rs` 和 `parsers/grouping.rs` 使用
//! - 使用 `models/atom.rs`

use super::atom::Atom;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// 标准残基对照表：20 种标准氨基酸 + 硒代半胱氨酸/吡咯赖氨酸 + 模糊代码
///
/// `UNK` 不在表中，按非标准残基处理。
pub static THREE_TO_ONE: LazyLock<HashMap<&'static str, char>> = LazyLock::new(|| {
    HashMap::from([
        ("ALA", 'A'),
        ("ARG", 'R'),
        ("ASN", 'N'),
        ("ASP", 'D'),
        ("CYS", 'C'),
        ("GLN", 'Q'),
        ("GLU", 'E'),
        ("GLY", 'G'),
        ("HIS", 'H'),
        ("ILE", 'I'),
        ("LEU", 'L'),
        ("LYS", 'K'),
        ("MET", 'M'),
        ("PHE", 'F'),
        ("PRO", 'P'),
        ("SER", 'S'),
        ("THR", 'T'),
        ("TRP", 'W'),
        ("TYR", 'Y'),
        ("VAL", 'V'),
        // 第 21/22 种氨基酸
        ("SEC", 'U'),
        ("PYL", 'O'),
        // 模糊代码
        ("ASX", 'B'),
        ("GLX", 'Z'),
        ("XLE", 'J'),
    ])
});

/// 查询残基名的单字母代码（不区分大小写），非标准残基返回 None
pub fn one_letter_code(name: &str) -> Option<char> {
    THREE_TO_ONE
        .get(name.trim().to_ascii_uppercase().as_str())
        .copied()
}

/// 残基
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Residue {
    /// 三字母残基名或配体名
    pub name: String,

    /// 链内序号（链内唯一）
    pub seq_id: i32,

    /// 原子列表（按文件顺序）
    pub atoms: Vec<Atom>,

    /// 单字母代码，非标准残基为 'X'
    pub one_letter: char,

    /// 插入码，无则为空串
    pub ins_code: String,

    /// 是否为标准残基
    pub is_standard: bool,
}

impl Residue {
    /// 创建残基，单字母代码与标准标志由对照表推导
    pub fn new(name: impl Into<String>, seq_id: i32, atoms: Vec<Atom>) -> Self {
        let name = name.into();
        let code = one_letter_code(&name);
        Residue {
            name,
            seq_id,
            atoms,
            one_letter: code.unwrap_or('X'),
            ins_code: String::new(),
            is_standard: code.is_some(),
        }
    }

    pub fn with_ins_code(mut self, ins_code: impl Into<String>) -> Self {
        self.ins_code = ins_code.into();
        self
    }

    /// α 碳原子
    pub fn ca(&self) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.name.trim() == "CA")
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }
}
