//! # 集合统计
//!
//! 对一组已解析结构做聚合：数量、已知分辨率的均值/最小/最大值、
//! 实验方法直方图（缺失方法记为 `unknown`）、原子与链总数。
//!
//! ## 依赖关系
//! - 被 `batch/collection.rs` 使用
//! - 使用 `models/structure.rs`

use crate::models::Structure;

use serde::Serialize;
use std::collections::BTreeMap;

/// 缺失实验方法时使用的键
pub const UNKNOWN_METHOD: &str = "unknown";

/// 集合统计结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub total: usize,
    pub resolution_mean: Option<f64>,
    pub resolution_min: Option<f64>,
    pub resolution_max: Option<f64>,
    pub methods: BTreeMap<String, usize>,
    pub total_atoms: usize,
    pub total_chains: usize,
}

impl CollectionSummary {
    pub fn from_structures<'a, I>(structures: I) -> Self
    where
        I: IntoIterator<Item = &'a Structure>,
    {
        let mut summary = CollectionSummary::default();
        let mut resolutions: Vec<f64> = Vec::new();

        for s in structures {
            summary.total += 1;
            if let Some(r) = s.resolution() {
                resolutions.push(r);
            }
            let method = s
                .method()
                .filter(|m| !m.is_empty())
                .unwrap_or(UNKNOWN_METHOD);
            *summary.methods.entry(method.to_string()).or_insert(0) += 1;
            summary.total_atoms += s.num_atoms();
            summary.total_chains += s.num_chains();
        }

        if !resolutions.is_empty() {
            let sum: f64 = resolutions.iter().sum();
            summary.resolution_mean = Some(sum / resolutions.len() as f64);
            summary.resolution_min = resolutions.iter().copied().reduce(f64::min);
            summary.resolution_max = resolutions.iter().copied().reduce(f64::max);
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::PdbStructure;

    fn pdb(content: &str) -> Structure {
        Structure::from(PdbStructure::from_content(content, None))
    }

    #[test]
    fn test_summary() {
        let structures = [
            pdb("EXPDTA    X-RAY DIFFRACTION\nREMARK   2 RESOLUTION.    2.00 ANGSTROMS.\n"),
            pdb("EXPDTA    X-RAY DIFFRACTION\nREMARK   2 RESOLUTION.    1.00 ANGSTROMS.\n"),
            pdb("ATOM      1  CA  GLY A   1       0.000   0.000   0.000  1.00  0.00           C\n"),
        ];
        let summary = CollectionSummary::from_structures(&structures);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.resolution_mean, Some(1.5));
        assert_eq!(summary.resolution_min, Some(1.0));
        assert_eq!(summary.resolution_max, Some(2.0));
        assert_eq!(summary.methods["X-RAY DIFFRACTION"], 2);
        assert_eq!(summary.methods[UNKNOWN_METHOD], 1);
        assert_eq!(summary.total_atoms, 1);
        assert_eq!(summary.total_chains, 1);
    }

    #[test]
    fn test_blank_method_counts_as_unknown() {
        let structures = [pdb("EXPDTA\n"), pdb("EXPDTA    \n")];
        let summary = CollectionSummary::from_structures(&structures);
        assert_eq!(summary.methods.len(), 1);
        assert_eq!(summary.methods[UNKNOWN_METHOD], 2);
        assert_eq!(structures[0].record().method, None);
    }

    #[test]
    fn test_empty_summary() {
        let summary = CollectionSummary::from_structures(std::iter::empty());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.resolution_mean, None);
        assert!(summary.methods.is_empty());
    }
}
