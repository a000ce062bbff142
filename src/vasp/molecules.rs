//! # 双原子气体参考结构
//!
//! 气态单质参考（H2/N2/O2/F2/Cl2）使用立方盒中的双原子分子，
//! 键长取实验值，盒边 30 Å。
//!
//! ## 依赖关系
//! - 被 `commands/select.rs`, `commands/generate.rs` 使用
//! - 使用 `models/structure.rs`

use crate::models::{Atom, Crystal, Lattice};

/// 分子盒边长 (Å)
const BOX_SIZE: f64 = 30.0;

/// 实验键长 (Å)
const BOND_LENGTHS: &[(&str, f64)] = &[
    ("H", 0.74),
    ("N", 1.10),
    ("O", 1.21),
    ("F", 1.42),
    ("Cl", 1.99),
];

/// 元素的单质参考是否为双原子气体
pub fn is_diatomic_gas(element: &str) -> bool {
    BOND_LENGTHS.iter().any(|(el, _)| *el == element)
}

/// 构造分子盒结构（非气体元素返回 None）
pub fn molecule_in_a_box(element: &str) -> Option<Crystal> {
    let bond = BOND_LENGTHS
        .iter()
        .find(|(el, _)| *el == element)
        .map(|(_, d)| *d)?;

    let half = bond / (2.0 * BOX_SIZE);
    let atoms = vec![
        Atom::new(element, [0.5, 0.5, 0.5 - half]),
        Atom::new(element, [0.5, 0.5, 0.5 + half]),
    ];

    Some(Crystal::new(
        format!("{}2 molecule", element),
        Lattice::cubic(BOX_SIZE),
        atoms,
    ))
}
