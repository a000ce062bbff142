//! # 生成能计算
//!
//! 从解析出的能量记录推导单质参考能量与各相生成能。
//!
//! ## 依赖关系
//! - 被 `phasediag/hull.rs`, `commands/parse.rs`, `commands/chempots/` 使用
//! - 使用 `models/` 数据模型

use crate::error::{ChemlimError, Result};
use crate::models::{Composition, EnergyRecord};
use std::collections::BTreeMap;

/// 求解器内部使用的归一化相
#[derive(Debug, Clone)]
pub struct PhaseEnergy {
    /// 归约化学式
    pub formula: String,

    /// 归约成分
    pub composition: Composition,

    /// 每化学式单元能量 (eV)
    pub energy_per_fu: f64,

    /// 每化学式单元生成能 (eV)
    pub formation_per_fu: f64,
}

impl PhaseEnergy {
    /// 每原子生成能 (eV/atom)
    pub fn formation_per_atom(&self) -> f64 {
        self.formation_per_fu / self.composition.num_atoms()
    }
}

/// 单质参考能量：每个元素取最低的单质每原子能量
pub fn elemental_refs(records: &[EnergyRecord]) -> BTreeMap<String, f64> {
    let mut refs: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        if let Ok(comp) = record.composition() {
            if comp.is_elemental() {
                let el = comp.elements().remove(0);
                refs.entry(el)
                    .and_modify(|e| *e = e.min(record.energy_per_atom))
                    .or_insert(record.energy_per_atom);
            }
        }
    }
    refs
}

/// 计算每化学式单元生成能
///
/// ΔH_f = E_fu − Σ n_i · E_ref(i)
pub fn formation_energy_per_fu(
    composition: &Composition,
    energy_per_fu: f64,
    refs: &BTreeMap<String, f64>,
) -> Result<f64> {
    let missing: Vec<String> = composition
        .elements()
        .into_iter()
        .filter(|el| !refs.contains_key(el))
        .collect();
    if !missing.is_empty() {
        return Err(ChemlimError::MissingElementalRefs { elements: missing });
    }

    let ref_sum: f64 = composition
        .iter()
        .map(|(el, n)| n * refs[el])
        .sum();
    Ok(energy_per_fu - ref_sum)
}

/// 填充记录的生成能字段
pub fn fill_formation_energies(
    records: &mut [EnergyRecord],
    refs: &BTreeMap<String, f64>,
) -> Result<()> {
    for record in records.iter_mut() {
        let comp = record.composition()?.reduced();
        record.formation_energy = Some(formation_energy_per_fu(
            &comp,
            record.energy_per_fu,
            refs,
        )?);
    }
    Ok(())
}

/// 将能量记录转换为求解器相列表
///
/// 同一化学式取最低能量的记录（多晶型只保留基态）。
pub fn build_phases(
    records: &[EnergyRecord],
    refs: &BTreeMap<String, f64>,
) -> Result<Vec<PhaseEnergy>> {
    let mut best: BTreeMap<String, PhaseEnergy> = BTreeMap::new();

    for record in records {
        let composition = record.composition()?.reduced();
        let formation = formation_energy_per_fu(&composition, record.energy_per_fu, refs)?;
        let phase = PhaseEnergy {
            formula: record.formula.clone(),
            composition,
            energy_per_fu: record.energy_per_fu,
            formation_per_fu: formation,
        };

        best.entry(phase.formula.clone())
            .and_modify(|existing| {
                if phase.formation_per_atom() < existing.formation_per_atom() {
                    *existing = phase.clone();
                }
            })
            .or_insert(phase);
    }

    Ok(best.into_values().collect())
}
