//! # 解析器模块
//!
//! 提供 VASP 输出与结构文件的解析器，以及计算目录的结果定位。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: vasprun, outcar, poscar, entrydb

pub mod entrydb;
pub mod outcar;
pub mod poscar;
pub mod vasprun;

use crate::error::{ChemlimError, Result};
use crate::models::Composition;
use std::path::{Path, PathBuf};

/// 统一的计算结果
#[derive(Debug, Clone)]
pub struct CalcResult {
    /// 末次总能量 (eV)
    pub energy: f64,

    /// k 点网格（OUTCAR 回退路径下不可用）
    pub kpoints: Option<String>,

    /// 晶胞成分
    pub composition: Composition,
}

/// 在计算目录中定位结果文件
///
/// 优先级: vasp_std/vasprun.xml > vasprun.xml > vasp_std/OUTCAR > OUTCAR
pub fn find_result_file(calc_dir: &Path) -> Option<PathBuf> {
    let candidates = [
        calc_dir.join("vasp_std").join("vasprun.xml"),
        calc_dir.join("vasprun.xml"),
        calc_dir.join("vasp_std").join("OUTCAR"),
        calc_dir.join("OUTCAR"),
    ];
    candidates.into_iter().find(|p| p.exists())
}

/// 解析计算目录中的结果文件
///
/// 截断或未完成的计算返回 ParseError。
pub fn parse_calc_dir(calc_dir: &Path) -> Result<CalcResult> {
    let result_file = find_result_file(calc_dir).ok_or_else(|| ChemlimError::FileNotFound {
        path: format!("{}/(vasp_std/)vasprun.xml|OUTCAR", calc_dir.display()),
    })?;

    let is_vasprun = result_file
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("vasprun"))
        .unwrap_or(false);

    let parse_error = |reason: &str| ChemlimError::ParseError {
        format: if is_vasprun { "vasprun.xml" } else { "OUTCAR" }.to_string(),
        path: result_file.display().to_string(),
        reason: reason.to_string(),
    };

    let (energy, kpoints, composition, finished) = if is_vasprun {
        let r = vasprun::parse_vasprun_file(&result_file)?;
        (r.final_energy, r.kpoints, r.composition, r.is_finished)
    } else {
        let r = outcar::parse_outcar_file(&result_file)?;
        (r.final_energy, None, r.composition, r.is_finished)
    };

    if !finished {
        return Err(parse_error("calculation did not finish"));
    }
    let energy = energy.ok_or_else(|| parse_error("no final energy found"))?;
    let composition = composition.ok_or_else(|| parse_error("no atom types found"))?;

    Ok(CalcResult {
        energy,
        kpoints,
        composition,
    })
}
