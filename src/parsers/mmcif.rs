//! # mmCIF 结构构建器
//!
//! 由词法器输出的键值对惰性构建元数据、实体、链与原子，
//! 每项在首次访问时计算一次并缓存。
//!
//! ## 字段来源（按优先级）
//! | 字段 | 来源 |
//! |---|---|
//! | entry_id | `entry.id`, `struct_keywords.entry_id`, 文件名 |
//! | method | `exptl.method`, 任意含 exptl 与 method 的键 |
//! | resolution | `refine.ls_dres_high`, `refine.ls_d_res_high`, `reflns.d_resolution_high`, `refine_hist.d_res_high` |
//! | release_date | `pdbx_database_status.recvd_initial_deposition_date`, `rcsb_accession_info.initial_release_date` |
//! | deposit_date | `pdbx_database_status.recvd_deposition_form`, `rcsb_accession_info.deposit_date` |
//! | title | `struct.title`, `struct_keywords.text` |
//! | keywords | `struct_keywords.text`, `struct_keywords.pdbx_keywords` |
//! | space_group | `symmetry.space_group_name_H-M`, `symmetry.space_group_name_hm` |
//!
//! 晶胞参数逐项独立解析：某一项损坏只影响该项。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 和 `models/structure.rs` 使用
//! - 使用 `parsers/cif_tokenizer.rs`、`parsers/grouping.rs`

use super::cif_tokenizer::{self, CifTokens};
use super::grouping::ChainAssembler;
use crate::error::Result;
use crate::models::{
    Atom, Chain, Entity, EntityType, SourceFormat, StructureMetadata, UnitCell,
};

use once_cell::unsync::OnceCell;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, instrument};

const RESOLUTION_FIELDS: [&str; 4] = [
    "refine.ls_dres_high",
    "refine.ls_d_res_high",
    "reflns.d_resolution_high",
    "refine_hist.d_res_high",
];

static ENTRY_ID_FROM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:pdb)?([0-9][a-z0-9]{3})\.(?:mm)?cif").unwrap());

/// 从文件名推断条目 ID（如 `pdb4hhb.cif.gz`、`4hhb.mmcif` → `4HHB`）
fn entry_id_from_filename(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    ENTRY_ID_FROM_NAME
        .captures(name)
        .map(|caps| caps[1].to_uppercase())
}

/// mmCIF 格式结构
#[derive(Debug)]
pub struct CifStructure {
    tokens: CifTokens,
    source_path: Option<PathBuf>,
    metadata: OnceCell<StructureMetadata>,
    entities: OnceCell<Vec<Entity>>,
    chains: OnceCell<Vec<Chain>>,
    atoms: OnceCell<Vec<Atom>>,
}

impl CifStructure {
    /// 该构建器处理的文件后缀
    pub const EXTENSIONS: &'static [&'static str] = &[".cif", ".cif.gz", ".mmcif", ".mmcif.gz"];

    pub fn new(tokens: CifTokens, source_path: Option<PathBuf>) -> Self {
        CifStructure {
            tokens,
            source_path,
            metadata: OnceCell::new(),
            entities: OnceCell::new(),
            chains: OnceCell::new(),
            atoms: OnceCell::new(),
        }
    }

    /// 解析 mmCIF 文件（`.gz` 透明解压）
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self> {
        let tokens = cif_tokenizer::tokenize_file(path)?;
        Ok(Self::new(tokens, Some(path.to_path_buf())))
    }

    pub fn tokens(&self) -> &CifTokens {
        &self.tokens
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn metadata(&self) -> &StructureMetadata {
        self.metadata.get_or_init(|| self.build_metadata())
    }

    pub fn entities(&self) -> &[Entity] {
        self.entities.get_or_init(|| self.build_entities())
    }

    pub fn chains(&self) -> &[Chain] {
        self.chains.get_or_init(|| self.build_chains())
    }

    pub fn atoms(&self) -> &[Atom] {
        self.atoms.get_or_init(|| self.build_atoms())
    }

    fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .find_map(|k| self.tokens.single(k))
            .map(str::to_string)
    }

    fn build_metadata(&self) -> StructureMetadata {
        let t = &self.tokens;

        let entry_id = self
            .first_of(&["entry.id", "struct_keywords.entry_id"])
            .or_else(|| self.source_path().and_then(entry_id_from_filename))
            .unwrap_or_default();

        let method = self.first_of(&["exptl.method"]).or_else(|| {
            t.pairs()
                .iter()
                .filter(|p| {
                    let key = p.key.to_lowercase();
                    key.contains("exptl") && key.contains("method")
                })
                .filter_map(|p| p.value.as_deref())
                .find(|v| !v.is_empty())
                .map(str::to_string)
        });

        let mut metadata = StructureMetadata::new(entry_id, SourceFormat::Mmcif);
        metadata.method = method;
        metadata.resolution = RESOLUTION_FIELDS.iter().find_map(|k| t.float(k));
        metadata.release_date = self.first_of(&[
            "pdbx_database_status.recvd_initial_deposition_date",
            "rcsb_accession_info.initial_release_date",
        ]);
        metadata.deposit_date = self.first_of(&[
            "pdbx_database_status.recvd_deposition_form",
            "rcsb_accession_info.deposit_date",
        ]);
        metadata.title = self.first_of(&["struct.title", "struct_keywords.text"]);
        metadata.keywords =
            self.first_of(&["struct_keywords.text", "struct_keywords.pdbx_keywords"]);
        metadata.space_group = self.first_of(&[
            "symmetry.space_group_name_H-M",
            "symmetry.space_group_name_hm",
        ]);
        metadata.cell = UnitCell {
            a: t.float("cell.length_a"),
            b: t.float("cell.length_b"),
            c: t.float("cell.length_c"),
            alpha: t.float("cell.angle_alpha"),
            beta: t.float("cell.angle_beta"),
            gamma: t.float("cell.angle_gamma"),
        };

        for pair in t.pairs() {
            if let Some(value) = pair.value.as_deref().filter(|v| !v.is_empty()) {
                metadata.raw.insert(pair.key.clone(), value.to_string());
            }
        }

        metadata
    }

    fn build_entities(&self) -> Vec<Entity> {
        let t = &self.tokens;
        let ids = t.loop_values("entity.id");
        let types = t.loop_values("entity.type");
        let descriptions = t.loop_values("entity.pdbx_description");

        ids.iter()
            .enumerate()
            .filter_map(|(i, id)| {
                let id = (*id)?;
                let entity_type = cell(&types, i)
                    .map(EntityType::from_tag)
                    .unwrap_or(EntityType::Unknown);
                let description = cell(&descriptions, i).unwrap_or("");
                Some(Entity::new(id, entity_type).with_description(description))
            })
            .collect()
    }

    fn build_atoms(&self) -> Vec<Atom> {
        let columns = AtomSiteColumns::new(&self.tokens);
        let total = columns.serial.len();
        let atoms: Vec<Atom> = (0..total).filter_map(|i| columns.atom(i)).collect();

        if atoms.len() < total {
            debug!(
                skipped = total - atoms.len(),
                "dropped malformed atom_site rows"
            );
        }
        atoms
    }

    fn build_chains(&self) -> Vec<Chain> {
        let columns = AtomSiteColumns::new(&self.tokens);
        let mut assembler = ChainAssembler::new();
        let mut skipped = 0usize;

        for i in 0..columns.chain.len() {
            let seq_id = cell(&columns.seq, i).and_then(|s| s.parse::<i32>().ok());
            let (Some(seq_id), Some(atom)) = (seq_id, columns.atom(i)) else {
                skipped += 1;
                continue;
            };

            assembler.push(
                cell(&columns.chain, i).unwrap_or("A"),
                seq_id,
                cell(&columns.comp, i).unwrap_or("UNK"),
                cell(&columns.ins_code, i).unwrap_or(""),
                cell(&columns.entity, i),
                atom,
            );
        }

        if skipped > 0 {
            debug!(skipped, "atom_site rows excluded from chain construction");
        }
        assembler.finish()
    }
}

/// 取某列第 i 行的值；越界或缺失返回 None
fn cell<'a>(column: &[Option<&'a str>], i: usize) -> Option<&'a str> {
    column.get(i).copied().flatten()
}

/// `_atom_site` 循环中用到的各列
struct AtomSiteColumns<'a> {
    serial: Vec<Option<&'a str>>,
    name: Vec<Option<&'a str>>,
    comp: Vec<Option<&'a str>>,
    element: Vec<Option<&'a str>>,
    x: Vec<Option<&'a str>>,
    y: Vec<Option<&'a str>>,
    z: Vec<Option<&'a str>>,
    occupancy: Vec<Option<&'a str>>,
    b_factor: Vec<Option<&'a str>>,
    alt_id: Vec<Option<&'a str>>,
    charge: Vec<Option<&'a str>>,
    chain: Vec<Option<&'a str>>,
    seq: Vec<Option<&'a str>>,
    ins_code: Vec<Option<&'a str>>,
    entity: Vec<Option<&'a str>>,
}

impl<'a> AtomSiteColumns<'a> {
    fn new(t: &'a CifTokens) -> Self {
        let auth_chain = t.loop_values("atom_site.auth_asym_id");
        let chain = if auth_chain.is_empty() {
            t.loop_values("atom_site.label_asym_id")
        } else {
            auth_chain
        };

        AtomSiteColumns {
            serial: t.loop_values("atom_site.id"),
            name: t.loop_values("atom_site.label_atom_id"),
            comp: t.loop_values("atom_site.label_comp_id"),
            element: t.loop_values("atom_site.type_symbol"),
            x: t.loop_values("atom_site.Cartn_x"),
            y: t.loop_values("atom_site.Cartn_y"),
            z: t.loop_values("atom_site.Cartn_z"),
            occupancy: t.loop_values("atom_site.occupancy"),
            b_factor: t.loop_values("atom_site.B_iso_or_equiv"),
            alt_id: t.loop_values("atom_site.label_alt_id"),
            charge: t.loop_values("atom_site.pdbx_formal_charge"),
            chain,
            seq: t.loop_values("atom_site.label_seq_id"),
            ins_code: t.loop_values("atom_site.pdbx_PDB_ins_code"),
            entity: t.loop_values("atom_site.label_entity_id"),
        }
    }

    /// 构建第 i 行的原子，数值字段无法解析时返回 None
    fn atom(&self, i: usize) -> Option<Atom> {
        let serial = match cell(&self.serial, i) {
            Some(s) => s.parse::<i64>().ok()?,
            None => i as i64 + 1,
        };

        let atom = Atom::new(
            serial,
            cell(&self.name, i).unwrap_or(""),
            cell(&self.element, i).unwrap_or(""),
            [
                coordinate(&self.x, i)?,
                coordinate(&self.y, i)?,
                coordinate(&self.z, i)?,
            ],
        )
        .with_occupancy(number_or(&self.occupancy, i, 1.0)?)
        .with_b_factor(number_or(&self.b_factor, i, 0.0)?)
        .with_alt_id(cell(&self.alt_id, i).unwrap_or(""))
        .with_charge(
            cell(&self.charge, i)
                .and_then(|c| c.parse::<f64>().ok())
                .unwrap_or(0.0),
        );

        Some(atom)
    }
}

/// 坐标：整列缺失记 0.0，单元缺失或无法解析返回 None
fn coordinate(column: &[Option<&str>], i: usize) -> Option<f64> {
    match column.get(i) {
        None => Some(0.0),
        Some(None) => None,
        Some(Some(v)) => v.parse().ok(),
    }
}

/// 可选数值：缺失取默认值，无法解析返回 None
fn number_or(column: &[Option<&str>], i: usize, default: f64) -> Option<f64> {
    match cell(column, i) {
        None => Some(default),
        Some(v) => v.parse().ok(),
    }
}
