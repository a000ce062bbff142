//! # 相条目数据模型
//!
//! 材料数据库快照条目、竞争相选择结果与解析后的能量记录。
//!
//! ## 依赖关系
//! - 被 `parsers/entrydb.rs`, `phasediag/`, `commands/` 使用
//! - 使用 `models/composition.rs`, `models/structure.rs`

use crate::error::Result;
use crate::models::{Atom, Composition, Crystal, Lattice};
use serde::{Deserialize, Serialize};

/// 数据库快照中的结构（简化表示）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbStructure {
    /// 晶格向量矩阵 (3x3)
    pub lattice: [[f64; 3]; 3],

    /// 每个原子的元素符号
    pub species: Vec<String>,

    /// 分数坐标
    pub frac_coords: Vec<[f64; 3]>,
}

impl DbStructure {
    /// 转换为 Crystal
    pub fn to_crystal(&self, name: &str) -> Crystal {
        let atoms = self
            .species
            .iter()
            .zip(self.frac_coords.iter())
            .map(|(el, pos)| Atom::new(el.clone(), *pos))
            .collect();
        Crystal::new(name, Lattice::from_vectors(self.lattice), atoms)
    }
}

/// 材料数据库快照条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbEntry {
    /// 数据库材料编号（如 "mp-406"）
    pub material_id: String,

    /// 化学式
    pub formula: String,

    /// 每原子能量 (eV)
    pub energy_per_atom: f64,

    /// 晶胞原子数
    pub nsites: usize,

    /// 空间群符号
    #[serde(default)]
    pub spacegroup: Option<String>,

    /// 数据库报告的凸包上方能量 (eV/atom)，仅作参考
    #[serde(default)]
    pub e_above_hull: Option<f64>,

    /// 结构（生成输入文件时必需）
    #[serde(default)]
    pub structure: Option<DbStructure>,
}

impl DbEntry {
    /// 解析条目的化学成分
    pub fn composition(&self) -> Result<Composition> {
        Composition::parse(&self.formula)
    }
}

/// 竞争相选择结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedPhase {
    /// 归约化学式
    pub formula: String,

    /// 数据库材料编号
    pub material_id: String,

    /// 空间群符号
    #[serde(default)]
    pub spacegroup: Option<String>,

    /// 重新计算的凸包上方能量 (eV/atom)
    pub e_above_hull: f64,

    /// 每原子能量 (eV)
    pub energy_per_atom: f64,

    /// 晶胞原子数
    pub nsites: usize,

    /// 是否为双原子气体单质参考（分子盒处理）
    pub is_molecule: bool,

    /// 结构
    #[serde(default)]
    pub structure: Option<DbStructure>,
}

impl SelectedPhase {
    /// 计算目录名：`<Formula>_EaH_<x>`（4 位小数，去除尾零）
    pub fn calc_dir_name(&self) -> String {
        format_calc_dir_name(&self.formula, self.e_above_hull)
    }
}

/// 生成计算目录名
pub fn format_calc_dir_name(formula: &str, e_above_hull: f64) -> String {
    let s = format!("{:.4}", e_above_hull);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    format!("{}_EaH_{}", formula, s)
}

/// 从目录名反解化学式（`CdTe_EaH_0` -> `CdTe`）
pub fn formula_from_calc_dir_name(name: &str) -> Option<&str> {
    name.split_once("_EaH_").map(|(f, _)| f)
}

/// 解析后的单个计算能量记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyRecord {
    /// 归约化学式
    pub formula: String,

    /// k 点网格（如 "6x6x6"）
    pub kpoints: Option<String>,

    /// 晶胞总能量 (eV)
    pub energy: f64,

    /// 每化学式单元能量 (eV)
    pub energy_per_fu: f64,

    /// 每原子能量 (eV)
    pub energy_per_atom: f64,

    /// 每化学式单元生成能 (eV)，由解析步骤填充
    pub formation_energy: Option<f64>,
}

impl EnergyRecord {
    /// 从晶胞成分与总能量构造记录
    pub fn from_cell(composition: &Composition, energy: f64, kpoints: Option<String>) -> Self {
        let n_fu = composition.formula_units();
        let n_atoms = composition.num_atoms();
        EnergyRecord {
            formula: composition.reduced_formula(),
            kpoints,
            energy,
            energy_per_fu: energy / n_fu,
            energy_per_atom: energy / n_atoms,
            formation_energy: None,
        }
    }

    /// 记录的归约成分
    pub fn composition(&self) -> Result<Composition> {
        Composition::parse(&self.formula)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_dir_name() {
        assert_eq!(format_calc_dir_name("CdTe", 0.0), "CdTe_EaH_0");
        assert_eq!(format_calc_dir_name("Te", 0.009), "Te_EaH_0.009");
        assert_eq!(format_calc_dir_name("Cd", 0.05), "Cd_EaH_0.05");
    }

    #[test]
    fn test_formula_from_calc_dir_name() {
        assert_eq!(formula_from_calc_dir_name("CdTe_EaH_0"), Some("CdTe"));
        assert_eq!(formula_from_calc_dir_name("Li2O_EaH_0.0124"), Some("Li2O"));
        assert_eq!(formula_from_calc_dir_name("random_dir"), None);
    }

    #[test]
    fn test_energy_record_from_cell() {
        let comp = Composition::parse("Cd4Te4").unwrap();
        let rec = EnergyRecord::from_cell(&comp, -20.0, Some("6x6x6".to_string()));
        assert_eq!(rec.formula, "CdTe");
        assert!((rec.energy_per_fu - (-5.0)).abs() < 1e-9);
        assert!((rec.energy_per_atom - (-2.5)).abs() < 1e-9);
    }

    #[test]
    fn test_db_structure_to_crystal() {
        let s = DbStructure {
            lattice: [[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]],
            species: vec!["Cd".to_string(), "Te".to_string()],
            frac_coords: vec![[0.0, 0.0, 0.0], [0.25, 0.25, 0.25]],
        };
        let c = s.to_crystal("CdTe");
        assert_eq!(c.num_atoms(), 2);
        assert_eq!(c.formula(), "CdTe");
    }
}
