//! # 原子数据模型
//!
//! 单个原子：序号、名称、元素、笛卡尔坐标以及占有率/温度因子等附加信息。
//!
//! ## 依赖关系
//! - 被 `models/residue.rs` 和 `parsers/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 原子信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 原子序号
    pub serial: i64,

    /// 原子名称（如 "CA"）
    pub name: String,

    /// 元素符号
    pub element: String,

    /// 笛卡尔坐标 (Å)
    pub x: f64,
    pub y: f64,
    pub z: f64,

    /// 占有率，默认 1.0
    pub occupancy: f64,

    /// 温度因子，默认 0.0
    pub b_factor: f64,

    /// 替代位置标识，无则为空串
    pub alt_id: String,

    /// 形式电荷
    pub charge: f64,
}

impl Atom {
    pub fn new(
        serial: i64,
        name: impl Into<String>,
        element: impl Into<String>,
        coords: [f64; 3],
    ) -> Self {
        Atom {
            serial,
            name: name.into(),
            element: element.into(),
            x: coords[0],
            y: coords[1],
            z: coords[2],
            occupancy: 1.0,
            b_factor: 0.0,
            alt_id: String::new(),
            charge: 0.0,
        }
    }

    pub fn with_occupancy(mut self, occupancy: f64) -> Self {
        self.occupancy = occupancy;
        self
    }

    pub fn with_b_factor(mut self, b_factor: f64) -> Self {
        self.b_factor = b_factor;
        self
    }

    pub fn with_alt_id(mut self, alt_id: impl Into<String>) -> Self {
        self.alt_id = alt_id.into();
        self
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self
    }

    /// 坐标三元组 [x, y, z]
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}
