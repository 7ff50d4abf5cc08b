//! # PDB 结构构建器
//!
//! 按经典 80 列定长布局逐行扫描，记录类型由前 6 个字符识别。
//!
//! ## 列布局（0 起始，左闭右开）
//! ```text
//! HEADER  [10,50) 分类  [50,59) 日期  [62,66) 条目 ID
//! TITLE   [10,80)
//! EXPDTA  [10,79)
//! REMARK  [7,10) 编号
//! CRYST1  [6,15) [15,24) [24,33) [33,40) [40,47) [47,54) [55,66) 空间群
//! ATOM    [6,11) 序号  [12,16) 原子名  [16] altLoc  [17,20) 残基名  [21] 链
//!         [22,26) 残基序号  [26] 插入码  [30,38) [38,46) [46,54) 坐标
//!         [54,60) 占有率  [60,66) B 因子  [76,78) 元素  [78,80) 电荷
//! ```
//!
//! CRYST1 要么六个参数全部解析成功，要么整条记录作废。
//!
//! 实体为启发式推断：每条多肽链一个聚合物实体，每种非水杂原子残基一个非聚合物实体，
//! 存在水分子时追加一个水实体。这只是近似，并不等同真实的生物学实体划分。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 和 `models/structure.rs` 使用
//! - 使用 `parsers/grouping.rs`、`utils/reader.rs`

use super::grouping::ChainAssembler;
use crate::error::Result;
use crate::models::{
    Atom, Chain, Entity, EntityType, SourceFormat, StructureMetadata, UnitCell,
};
use crate::utils::reader::read_text;

use once_cell::unsync::OnceCell;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, instrument};

static RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+\.\d+)\s*ANGSTROM").unwrap());

static ENTRY_ID_FROM_STEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:pdb)?([0-9][a-z0-9]{3})").unwrap());

const WATER_NAMES: [&str; 3] = ["HOH", "WAT", "DOD"];

/// 取 [start, end) 列，行过短时截断；越过行尾返回空串
fn columns(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).unwrap_or("")
}

fn record_name(line: &str) -> &str {
    columns(line, 0, 6).trim()
}

fn is_water(res_name: &str) -> bool {
    WATER_NAMES.contains(&res_name)
}

/// 解析 `2+`、`1-` 形式的形式电荷
fn parse_charge(field: &str) -> f64 {
    let field = field.trim();
    let (digits, sign) = match field.as_bytes().last() {
        Some(b'+') => (&field[..field.len() - 1], 1.0),
        Some(b'-') => (&field[..field.len() - 1], -1.0),
        _ => (field, 1.0),
    };
    digits.parse::<f64>().map(|v| v * sign).unwrap_or(0.0)
}

/// 可选数值列：空白取默认值，无法解析返回 None
fn number_or(field: &str, default: f64) -> Option<f64> {
    let field = field.trim();
    if field.is_empty() {
        Some(default)
    } else {
        field.parse().ok()
    }
}

/// 解析一条 ATOM/HETATM 记录，数值列损坏时返回 None
fn parse_atom_line(line: &str) -> Option<Atom> {
    let serial = columns(line, 6, 11).trim().parse::<i64>().ok()?;
    let x = columns(line, 30, 38).trim().parse::<f64>().ok()?;
    let y = columns(line, 38, 46).trim().parse::<f64>().ok()?;
    let z = columns(line, 46, 54).trim().parse::<f64>().ok()?;

    let atom = Atom::new(
        serial,
        columns(line, 12, 16).trim(),
        columns(line, 76, 78).trim(),
        [x, y, z],
    )
    .with_occupancy(number_or(columns(line, 54, 60), 1.0)?)
    .with_b_factor(number_or(columns(line, 60, 66), 0.0)?)
    .with_alt_id(columns(line, 16, 17).trim())
    .with_charge(parse_charge(columns(line, 78, 80)));

    Some(atom)
}

/// CRYST1：任一参数失败则整条作废
fn parse_cryst1(line: &str) -> Option<(UnitCell, String)> {
    let value = |start, end| columns(line, start, end).trim().parse::<f64>().ok();
    let cell = UnitCell {
        a: Some(value(6, 15)?),
        b: Some(value(15, 24)?),
        c: Some(value(24, 33)?),
        alpha: Some(value(33, 40)?),
        beta: Some(value(40, 47)?),
        gamma: Some(value(47, 54)?),
    };
    Some((cell, columns(line, 55, 66).trim().to_string()))
}

/// 从文件名主干推断条目 ID（如 `pdb4hhb.ent` → `4HHB`）
fn entry_id_from_stem(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    ENTRY_ID_FROM_STEM
        .captures(stem)
        .map(|caps| caps[1].to_uppercase())
}

/// PDB 格式结构
#[derive(Debug)]
pub struct PdbStructure {
    lines: Vec<String>,
    source_path: Option<PathBuf>,
    metadata: OnceCell<StructureMetadata>,
    entities: OnceCell<Vec<Entity>>,
    chains: OnceCell<Vec<Chain>>,
    atoms: OnceCell<Vec<Atom>>,
}

impl PdbStructure {
    /// 该构建器处理的文件后缀
    pub const EXTENSIONS: &'static [&'static str] = &[".pdb", ".pdb.gz", ".ent", ".ent.gz"];

    pub fn new(lines: Vec<String>, source_path: Option<PathBuf>) -> Self {
        PdbStructure {
            lines,
            source_path,
            metadata: OnceCell::new(),
            entities: OnceCell::new(),
            chains: OnceCell::new(),
            atoms: OnceCell::new(),
        }
    }

    /// 从文本内容构建
    pub fn from_content(content: &str, source_path: Option<PathBuf>) -> Self {
        let lines = content.lines().map(str::to_string).collect();
        Self::new(lines, source_path)
    }

    /// 解析 PDB 文件（`.gz` 透明解压）
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = read_text(path, "pdb")?;
        let structure = Self::from_content(&content, Some(path.to_path_buf()));
        debug!(lines = structure.lines.len(), "read pdb records");
        Ok(structure)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
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

    fn records<'a>(&'a self, names: &'a [&'a str]) -> impl Iterator<Item = &'a str> + 'a {
        self.lines
            .iter()
            .map(String::as_str)
            .filter(move |line| names.contains(&record_name(line)))
    }

    fn build_metadata(&self) -> StructureMetadata {
        let mut entry_id = String::new();
        let mut title_parts: Vec<&str> = Vec::new();
        let mut metadata = StructureMetadata::new("", SourceFormat::Pdb);

        for line in &self.lines {
            match record_name(line) {
                "HEADER" => {
                    entry_id = columns(line, 62, 66).trim().to_string();
                    let date = columns(line, 50, 59).trim();
                    if !date.is_empty() {
                        metadata.deposit_date = Some(date.to_string());
                    }
                    let classification = columns(line, 10, 50).trim();
                    if !classification.is_empty() {
                        metadata.keywords = Some(classification.to_string());
                    }
                }
                "TITLE" => title_parts.push(columns(line, 10, 80).trim()),
                "EXPDTA" => {
                    let method = columns(line, 10, 79).trim();
                    if !method.is_empty() {
                        metadata.method = Some(method.to_string());
                    }
                }
                "REMARK" => {
                    if columns(line, 7, 10).trim() == "2"
                        && line.to_uppercase().contains("RESOLUTION")
                    {
                        if let Some(value) = RESOLUTION
                            .captures(line)
                            .and_then(|caps| caps[1].parse::<f64>().ok())
                        {
                            metadata.resolution = Some(value);
                        }
                    }
                }
                "CRYST1" => match parse_cryst1(line) {
                    Some((cell, space_group)) => {
                        metadata.cell = cell;
                        metadata.space_group = Some(space_group);
                    }
                    None => debug!("discarded malformed CRYST1 record"),
                },
                _ => {}
            }
        }

        if entry_id.is_empty() {
            if let Some(id) = self.source_path().and_then(entry_id_from_stem) {
                entry_id = id;
            }
        }
        metadata.entry_id = entry_id;

        let title = title_parts.join(" ");
        let title = title.trim();
        if !title.is_empty() {
            metadata.title = Some(title.to_string());
        }

        metadata
    }

    fn build_atoms(&self) -> Vec<Atom> {
        let mut skipped = 0usize;
        let atoms: Vec<Atom> = self
            .records(&["ATOM", "HETATM"])
            .filter_map(|line| {
                let atom = parse_atom_line(line);
                if atom.is_none() {
                    skipped += 1;
                }
                atom
            })
            .collect();

        if skipped > 0 {
            debug!(skipped, "dropped malformed ATOM/HETATM records");
        }
        atoms
    }

    /// ATOM 记录中出现的链 ID（有序）
    fn polymer_chain_ids(&self) -> BTreeSet<&str> {
        self.records(&["ATOM"])
            .map(|line| columns(line, 21, 22))
            .filter(|id| !id.is_empty())
            .collect()
    }

    fn build_entities(&self) -> Vec<Entity> {
        let polymers = self.polymer_chain_ids();
        let mut het_names: BTreeSet<&str> = BTreeSet::new();
        let mut has_water = false;

        for line in self.records(&["HETATM"]) {
            let name = columns(line, 17, 20).trim();
            if is_water(name) {
                has_water = true;
            } else {
                het_names.insert(name);
            }
        }

        let mut entities = Vec::with_capacity(polymers.len() + het_names.len() + 1);
        for _ in &polymers {
            let id = entities.len() + 1;
            entities.push(Entity::new(id.to_string(), EntityType::Polymer));
        }
        for name in het_names {
            let id = entities.len() + 1;
            entities.push(
                Entity::new(id.to_string(), EntityType::NonPolymer).with_description(name),
            );
        }
        if has_water {
            let id = entities.len() + 1;
            entities.push(Entity::new(id.to_string(), EntityType::Water));
        }
        entities
    }

    fn build_chains(&self) -> Vec<Chain> {
        let entity_ids: BTreeMap<&str, String> = self
            .polymer_chain_ids()
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, (i + 1).to_string()))
            .collect();

        let mut assembler = ChainAssembler::new();
        for line in self.records(&["ATOM"]) {
            let chain_id = columns(line, 21, 22);
            if chain_id.is_empty() {
                continue;
            }
            let Ok(seq_id) = columns(line, 22, 26).trim().parse::<i32>() else {
                continue;
            };
            let Some(atom) = parse_atom_line(line) else {
                continue;
            };

            assembler.push(
                chain_id,
                seq_id,
                columns(line, 17, 20).trim(),
                columns(line, 26, 27).trim(),
                entity_ids.get(chain_id).map(String::as_str),
                atom,
            );
        }
        assembler.finish()
    }
}
