//! # 化学势极限求解
//!
//! 在宿主生成能等式约束下枚举稳定区域顶点，
//! 并组装为交换格式的 `ChempotLimits`。
//!
//! ## 依赖关系
//! - 被 `commands/chempots/calc.rs` 使用
//! - 使用 `phasediag/{polytope,hull,formation}.rs`, `models/chempots.rs`

use crate::error::{ChemlimError, Result};
use crate::models::{ChempotLimits, LimitMu};
use crate::phasediag::formation::PhaseEnergy;
use crate::phasediag::hull;
use crate::phasediag::polytope::{enumerate_vertices, Constraint, Vertex};
use std::collections::BTreeMap;

/// 宿主稳定区域求解结果
#[derive(Debug, Clone)]
pub struct HostRegion {
    /// 宿主元素（字典序，与顶点坐标同序）
    pub elements: Vec<String>,

    /// 宿主相
    pub host: PhaseEnergy,

    /// 稳定区域顶点（化学势极限，Δμ）
    pub vertices: Vec<Vertex>,

    /// 参与约束的竞争相化学式
    pub competing: Vec<String>,
}

/// 求解宿主的化学势极限
pub fn solve_limits(host_formula: &str, phases: &[PhaseEnergy]) -> Result<HostRegion> {
    let host = phases
        .iter()
        .find(|p| p.formula == host_formula)
        .cloned()
        .ok_or_else(|| ChemlimError::PhaseNotFound {
            formula: host_formula.to_string(),
        })?;

    let elements = host.composition.elements();
    let n = elements.len();
    if n < 2 {
        return Err(ChemlimError::InvalidArgument(format!(
            "host {} must contain at least two elements",
            host_formula
        )));
    }

    // 竞争相：宿主化学空间内、非宿主本身的所有相
    let mut constraints: Vec<Constraint> = Vec::new();
    let mut competing: Vec<String> = Vec::new();
    for phase in phases {
        if phase.formula == host.formula || !phase.composition.is_subset_of(&elements) {
            continue;
        }
        let coeffs: Vec<f64> = elements.iter().map(|el| phase.composition.amount(el)).collect();
        constraints.push(Constraint::new(
            coeffs,
            phase.formation_per_fu,
            phase.formula.clone(),
        ));
        competing.push(phase.formula.clone());
    }

    // 缺少单质相的元素补 Δμ ≤ 0 约束
    for (i, el) in elements.iter().enumerate() {
        let has_elemental = phases
            .iter()
            .any(|p| p.composition.is_elemental() && p.composition.contains(el));
        if !has_elemental {
            let mut coeffs = vec![0.0; n];
            coeffs[i] = 1.0;
            constraints.push(Constraint::new(coeffs, 0.0, el.clone()));
        }
    }

    let eq_coeffs: Vec<f64> = elements.iter().map(|el| host.composition.amount(el)).collect();
    let vertices = enumerate_vertices(
        Some((eq_coeffs.as_slice(), host.formation_per_fu)),
        &constraints,
        n,
    );

    if vertices.is_empty() {
        let eah = hull::e_above_hull(&host, phases, &elements)?;
        return Err(ChemlimError::UnstableHost {
            formula: host.formula.clone(),
            e_above_hull: eah,
        });
    }

    Ok(HostRegion {
        elements,
        host,
        vertices,
        competing,
    })
}

impl HostRegion {
    /// 组装为交换格式（需要单质参考能量求绝对化学势）
    pub fn to_chempot_limits(&self, refs: &BTreeMap<String, f64>) -> Result<ChempotLimits> {
        let missing: Vec<String> = self
            .elements
            .iter()
            .filter(|el| !refs.contains_key(*el))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ChemlimError::MissingElementalRefs { elements: missing });
        }

        let elemental_refs: BTreeMap<String, f64> = self
            .elements
            .iter()
            .map(|el| (el.clone(), refs[el]))
            .collect();

        let mut relative: BTreeMap<String, LimitMu> = BTreeMap::new();
        for vertex in &self.vertices {
            let mu: LimitMu = self
                .elements
                .iter()
                .zip(vertex.mu.iter())
                .map(|(el, v)| (el.clone(), *v))
                .collect();

            // 名称冲突时追加序号
            let base = vertex.name();
            let mut name = base.clone();
            let mut idx = 2;
            while relative.contains_key(&name) {
                name = format!("{}_{}", base, idx);
                idx += 1;
            }
            relative.insert(name, mu);
        }

        Ok(ChempotLimits::from_relative(elemental_refs, relative))
    }
}
