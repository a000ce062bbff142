//! # KPOINTS 网格生成
//!
//! 按 KSPACING 约定从倒格矢长度推导 Γ 心网格，
//! 并生成 k 点收敛测试的网格序列。
//!
//! ## 依赖关系
//! - 被 `commands/generate.rs` 使用
//! - 使用 `models/structure.rs` 的倒格矢长度

use crate::error::{ChemlimError, Result};
use crate::models::Lattice;

/// 由 k 点间距 (Å⁻¹，含 2π 因子) 推导网格
///
/// N_i = max(1, ⌈|b_i| / spacing⌉)
pub fn mesh_from_spacing(lattice: &Lattice, spacing: f64) -> [usize; 3] {
    let b = lattice.reciprocal_lengths();
    let mut mesh = [1usize; 3];
    for i in 0..3 {
        mesh[i] = ((b[i] / spacing).ceil() as usize).max(1);
    }
    mesh
}

/// k 点收敛网格序列（间距从 max 递减到 min，重复网格去除）
pub fn convergence_series(
    lattice: &Lattice,
    spacing_min: f64,
    spacing_max: f64,
    spacing_step: f64,
) -> Result<Vec<[usize; 3]>> {
    if spacing_min <= 0.0 || spacing_max < spacing_min || spacing_step <= 0.0 {
        return Err(ChemlimError::InvalidArgument(format!(
            "invalid k-spacing series: min={}, max={}, step={}",
            spacing_min, spacing_max, spacing_step
        )));
    }

    let mut meshes: Vec<[usize; 3]> = Vec::new();
    let mut spacing = spacing_max;
    while spacing >= spacing_min - 1e-9 {
        let mesh = mesh_from_spacing(lattice, spacing);
        if !meshes.contains(&mesh) {
            meshes.push(mesh);
        }
        spacing -= spacing_step;
    }
    Ok(meshes)
}

/// 网格目录标签: "k6,6,6"
pub fn mesh_label(mesh: &[usize; 3]) -> String {
    format!("k{},{},{}", mesh[0], mesh[1], mesh[2])
}

/// 生成 Γ 心 KPOINTS 文件内容
pub fn kpoints_string(mesh: &[usize; 3], comment: &str) -> String {
    format!(
        "{}\n0\nGamma\n {} {} {}\n 0 0 0\n",
        comment, mesh[0], mesh[1], mesh[2]
    )
}

/// Γ 点单点 KPOINTS（分子参考）
pub fn gamma_only_string() -> String {
    kpoints_string(&[1, 1, 1], "Gamma-only")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_from_spacing_cubic() {
        // a = 5 Å: |b| = 2π/5 ≈ 1.2566; 0.3 Å⁻¹ -> ceil(4.19) = 5
        let lattice = Lattice::cubic(5.0);
        assert_eq!(mesh_from_spacing(&lattice, 0.3), [5, 5, 5]);
    }

    #[test]
    fn test_mesh_never_zero() {
        let lattice = Lattice::cubic(30.0);
        assert_eq!(mesh_from_spacing(&lattice, 0.5), [1, 1, 1]);
    }

    #[test]
    fn test_convergence_series_dedup() {
        let lattice = Lattice::cubic(5.0);
        let series = convergence_series(&lattice, 0.1, 0.3, 0.05).unwrap();
        // 网格单调加密且无重复
        for pair in series.windows(2) {
            assert!(pair[0][0] < pair[1][0]);
        }
        assert_eq!(series.first(), Some(&[5, 5, 5]));
        assert_eq!(series.last(), Some(&[13, 13, 13]));
    }

    #[test]
    fn test_convergence_series_rejects_bad_range() {
        let lattice = Lattice::cubic(5.0);
        assert!(convergence_series(&lattice, 0.3, 0.1, 0.05).is_err());
        assert!(convergence_series(&lattice, 0.0, 0.3, 0.05).is_err());
    }

    #[test]
    fn test_kpoints_string() {
        let s = kpoints_string(&[6, 6, 4], "CdTe k-mesh");
        assert_eq!(s, "CdTe k-mesh\n0\nGamma\n 6 6 4\n 0 0 0\n");
    }

    #[test]
    fn test_mesh_label() {
        assert_eq!(mesh_label(&[6, 6, 4]), "k6,6,4");
    }
}
