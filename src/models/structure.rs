//! # 晶体结构数据模型
//!
//! 定义统一的晶体结构表示，用于 POSCAR 生成与 k 点网格推导。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `vasp/` 使用
//! - 使用 `models/composition.rs`

use crate::models::Composition;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 晶格参数表示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 创建边长为 a 的立方晶格
    pub fn cubic(a: f64) -> Self {
        Lattice {
            matrix: [[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]],
        }
    }

    /// 计算晶格体积
    pub fn volume(&self) -> f64 {
        let a = self.matrix[0];
        let b = self.matrix[1];
        let c = self.matrix[2];

        // 行列式计算
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 倒格矢长度（含 2π 因子），用于 KSPACING 风格的 k 点网格推导
    ///
    /// |b_i| = 2π |a_j × a_k| / V
    pub fn reciprocal_lengths(&self) -> [f64; 3] {
        let v = self.volume().abs();
        let cross = |u: [f64; 3], w: [f64; 3]| {
            [
                u[1] * w[2] - u[2] * w[1],
                u[2] * w[0] - u[0] * w[2],
                u[0] * w[1] - u[1] * w[0],
            ]
        };
        let norm = |x: [f64; 3]| (x[0] * x[0] + x[1] * x[1] + x[2] * x[2]).sqrt();

        let bc = cross(self.matrix[1], self.matrix[2]);
        let ca = cross(self.matrix[2], self.matrix[0]);
        let ab = cross(self.matrix[0], self.matrix[1]);

        [
            2.0 * PI * norm(bc) / v,
            2.0 * PI * norm(ca) / v,
            2.0 * PI * norm(ab) / v,
        ]
    }
}

/// 原子信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
        }
    }
}

/// 晶体结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crystal {
    /// 结构名称
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子列表
    pub atoms: Vec<Atom>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            atoms,
        }
    }

    /// 原子总数
    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// 提取化学成分
    pub fn composition(&self) -> crate::error::Result<Composition> {
        Composition::from_pairs(
            self.atoms
                .iter()
                .map(|a| (a.element.clone(), 1.0)),
        )
    }

    /// 化学式字符串（元素字典序）
    pub fn formula(&self) -> String {
        match self.composition() {
            Ok(c) => c.to_string(),
            Err(_) => self.name.clone(),
        }
    }

    /// 按 POSCAR 约定分组：保持原子出现顺序的 (元素, 数量) 列表
    pub fn element_groups(&self) -> Vec<(String, usize)> {
        let mut groups: Vec<(String, usize)> = Vec::new();
        for atom in &self.atoms {
            match groups.last_mut() {
                Some((el, n)) if *el == atom.element => *n += 1,
                _ => groups.push((atom.element.clone(), 1)),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_volume_cubic() {
        let lattice = Lattice::cubic(5.0);
        assert!((lattice.volume() - 125.0).abs() < 1e-9);
    }

    #[test]
    fn test_reciprocal_lengths_cubic() {
        let lattice = Lattice::cubic(5.0);
        let b = lattice.reciprocal_lengths();
        let expected = 2.0 * PI / 5.0;
        for bi in b {
            assert!((bi - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_crystal_formula() {
        let lattice = Lattice::cubic(6.0);
        let atoms = vec![
            Atom::new("Na", [0.0, 0.0, 0.0]),
            Atom::new("Na", [0.5, 0.5, 0.0]),
            Atom::new("Cl", [0.5, 0.0, 0.0]),
            Atom::new("Cl", [0.0, 0.5, 0.0]),
        ];
        let crystal = Crystal::new("NaCl", lattice, atoms);
        assert_eq!(crystal.formula(), "Cl2Na2");
        assert_eq!(crystal.composition().unwrap().reduced_formula(), "ClNa");
    }

    #[test]
    fn test_element_groups() {
        let lattice = Lattice::cubic(4.0);
        let atoms = vec![
            Atom::new("Cd", [0.0, 0.0, 0.0]),
            Atom::new("Cd", [0.5, 0.5, 0.0]),
            Atom::new("Te", [0.25, 0.25, 0.25]),
        ];
        let crystal = Crystal::new("CdTe", lattice, atoms);
        assert_eq!(
            crystal.element_groups(),
            vec![("Cd".to_string(), 2), ("Te".to_string(), 1)]
        );
    }
}
