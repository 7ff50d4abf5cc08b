//! # 链/残基分组
//!
//! mmCIF 与 PDB 构建器共用的分组算法：原子先按链 ID、再按整数残基序号分组。
//! - 残基名、插入码取该组第一个原子的值
//! - 链内残基按序号升序输出
//! - 链按首次出现顺序输出
//!
//! ## 依赖关系
//! - 被 `parsers/mmcif.rs` 和 `parsers/pdb.rs` 使用
//! - 使用 `models/`

use crate::models::{Atom, Chain, Residue};

use std::collections::{BTreeMap, HashMap};

struct ResidueGroup {
    name: String,
    ins_code: String,
    atoms: Vec<Atom>,
}

struct ChainGroup {
    id: String,
    entity_id: Option<String>,
    residues: BTreeMap<i32, ResidueGroup>,
}

/// 链构建器
#[derive(Default)]
pub struct ChainAssembler {
    groups: Vec<ChainGroup>,
    index: HashMap<String, usize>,
}

impl ChainAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个原子到 (链, 序号) 分组
    pub fn push(
        &mut self,
        chain_id: &str,
        seq_id: i32,
        res_name: &str,
        ins_code: &str,
        entity_id: Option<&str>,
        atom: Atom,
    ) {
        let idx = match self.index.get(chain_id) {
            Some(&idx) => idx,
            None => {
                self.groups.push(ChainGroup {
                    id: chain_id.to_string(),
                    entity_id: entity_id.map(str::to_string),
                    residues: BTreeMap::new(),
                });
                self.index.insert(chain_id.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };

        self.groups[idx]
            .residues
            .entry(seq_id)
            .or_insert_with(|| ResidueGroup {
                name: res_name.to_string(),
                ins_code: ins_code.to_string(),
                atoms: Vec::new(),
            })
            .atoms
            .push(atom);
    }

    pub fn finish(self) -> Vec<Chain> {
        self.groups
            .into_iter()
            .map(|group| {
                let residues = group
                    .residues
                    .into_iter()
                    .map(|(seq_id, r)| Residue::new(r.name, seq_id, r.atoms).with_ins_code(r.ins_code))
                    .collect();
                let chain = Chain::new(group.id, residues);
                match group.entity_id {
                    Some(entity_id) => chain.with_entity_id(entity_id),
                    None => chain,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(serial: i64, name: &str) -> Atom {
        Atom::new(serial, name, "C", [0.0, 0.0, 0.0])
    }

    #[test]
    fn test_grouping_order() {
        let mut assembler = ChainAssembler::new();
        assembler.push("B", 2, "ALA", "", Some("2"), atom(1, "CA"));
        assembler.push("A", 5, "GLY", "", Some("1"), atom(2, "CA"));
        assembler.push("B", 1, "VAL", "", Some("2"), atom(3, "N"));
        assembler.push("B", 1, "VAL", "", Some("2"), atom(4, "CA"));

        let chains = assembler.finish();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].id, "B");
        assert_eq!(chains[1].id, "A");

        let seq_ids: Vec<i32> = chains[0].residues.iter().map(|r| r.seq_id).collect();
        assert_eq!(seq_ids, [1, 2]);
        assert_eq!(chains[0].residues[0].atoms.len(), 2);
        assert_eq!(chains[0].sequence(), "VA");
        assert_eq!(chains[0].entity_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_residue_name_from_first_atom() {
        let mut assembler = ChainAssembler::new();
        assembler.push("A", 1, "MSE", "A", None, atom(1, "N"));
        assembler.push("A", 1, "MET", "", None, atom(2, "CA"));

        let chains = assembler.finish();
        let residue = &chains[0].residues[0];
        assert_eq!(residue.name, "MSE");
        assert_eq!(residue.ins_code, "A");
        assert!(!residue.is_standard);
        assert_eq!(chains[0].entity_id, None);
    }
}
