//! # 凸包上方能量
//!
//! 指定成分处的凸包能量等价于线性规划
//! max Σ x_i·Δμ_i  s.t.  Σ c_ik·Δμ_i ≤ ΔH_k (每原子)，
//! 用顶点枚举在全维多面体上求解。
//!
//! ## 依赖关系
//! - 被 `phasediag/limits.rs`, `commands/select.rs` 使用
//! - 使用 `phasediag/polytope.rs`, `phasediag/formation.rs`

use crate::error::{ChemlimError, Result};
use crate::phasediag::formation::PhaseEnergy;
use crate::phasediag::polytope::{enumerate_vertices, Constraint};

/// 稳定相判定容差 (eV/atom)
pub const STABLE_TOL: f64 = 1e-6;

/// 构造每原子归一化的相约束集合
///
/// 仅纳入成分落在元素集合内的相；缺少单质约束的元素补 Δμ ≤ 0。
fn phase_constraints(phases: &[PhaseEnergy], elements: &[String]) -> Vec<Constraint> {
    let mut constraints: Vec<Constraint> = Vec::new();

    for phase in phases {
        if !phase.composition.is_subset_of(elements) {
            continue;
        }
        let per_atom = phase.composition.per_atom();
        let coeffs: Vec<f64> = elements.iter().map(|el| per_atom.amount(el)).collect();
        constraints.push(Constraint::new(
            coeffs,
            phase.formation_per_atom(),
            phase.formula.clone(),
        ));
    }

    for (i, el) in elements.iter().enumerate() {
        let has_elemental = phases
            .iter()
            .any(|p| p.composition.is_elemental() && p.composition.contains(el));
        if !has_elemental {
            let mut coeffs = vec![0.0; elements.len()];
            coeffs[i] = 1.0;
            constraints.push(Constraint::new(coeffs, 0.0, el.clone()));
        }
    }

    constraints
}

/// 目标相的凸包上方能量 (eV/atom)
///
/// 目标相自身计入约束集，故结果非负；落在凸包上时为 0。
pub fn e_above_hull(
    target: &PhaseEnergy,
    phases: &[PhaseEnergy],
    elements: &[String],
) -> Result<f64> {
    let n = elements.len();
    let mut constraints = phase_constraints(phases, elements);

    if !constraints.iter().any(|c| c.label == target.formula) {
        let per_atom = target.composition.per_atom();
        let coeffs: Vec<f64> = elements.iter().map(|el| per_atom.amount(el)).collect();
        constraints.push(Constraint::new(
            coeffs,
            target.formation_per_atom(),
            target.formula.clone(),
        ));
    }

    let vertices = enumerate_vertices(None, &constraints, n);
    if vertices.is_empty() {
        return Err(ChemlimError::DegenerateRegion(format!(
            "no hull vertices for the {} chemical space",
            elements.join("-")
        )));
    }

    let per_atom = target.composition.per_atom();
    let x: Vec<f64> = elements.iter().map(|el| per_atom.amount(el)).collect();

    let hull = vertices
        .iter()
        .map(|v| x.iter().zip(v.mu.iter()).map(|(xi, mi)| xi * mi).sum::<f64>())
        .fold(f64::NEG_INFINITY, f64::max);

    let eah = target.formation_per_atom() - hull;
    Ok(if eah < STABLE_TOL { 0.0 } else { eah })
}
