//! # parse 命令实现
//!
//! 解析已完成的竞争相计算并汇总能量表。
//!
//! ## 功能
//! - 收集 `*_EaH_*` 计算目录并并行解析
//! - 推导单质参考与生成能
//! - 生成终端表格、CSV 与可选 JSON 输出
//!
//! ## 依赖关系
//! - 使用 `cli/parse.rs` 定义的参数
//! - 使用 `batch/`, `parsers/`, `phasediag/formation.rs`
//! - 使用 `utils/output.rs`

use crate::batch::{BatchRunner, CalcDirCollector};
use crate::cli::parse::ParseArgs;
use crate::error::{ChemlimError, Result};
use crate::models::{formula_from_calc_dir_name, EnergyRecord};
use crate::parsers;
use crate::phasediag::{export, formation};
use crate::utils::output;

use std::fs;
use tabled::{Table, Tabled};

/// 能量表格行
#[derive(Debug, Tabled)]
struct EnergyRow {
    #[tabled(rename = "Formula")]
    formula: String,
    #[tabled(rename = "k-mesh")]
    kpoints: String,
    #[tabled(rename = "E/fu (eV)")]
    energy_per_fu: String,
    #[tabled(rename = "E/atom (eV)")]
    energy_per_atom: String,
    #[tabled(rename = "ΔH_f/fu (eV)")]
    formation_energy: String,
}

/// 执行 parse 命令
pub fn execute(args: ParseArgs) -> Result<()> {
    output::print_header("Parsing Competing Phase Calculations");

    if !args.dir.exists() {
        return Err(ChemlimError::DirectoryNotFound {
            path: args.dir.display().to_string(),
        });
    }

    let dirs = CalcDirCollector::new(args.dir.clone())?
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect()?;

    if dirs.is_empty() {
        return Err(ChemlimError::NoDirsFound {
            pattern: args.pattern.clone(),
        });
    }

    output::print_info(&format!(
        "Found {} calculation directories in '{}'",
        dirs.len(),
        args.dir.display()
    ));

    // 并行解析
    let runner = BatchRunner::new(args.jobs);
    let (outcomes, summary) = runner.run(dirs, |dir| {
        parsers::parse_calc_dir(dir)
            .map(|r| EnergyRecord::from_cell(&r.composition, r.energy, r.kpoints))
            .map_err(|e| e.to_string())
    });

    for (path, reason) in &summary.failures {
        output::print_warning(&format!("{}: {}", path, reason));
    }

    let mut records: Vec<EnergyRecord> = Vec::new();
    for outcome in outcomes {
        let record = match outcome.result {
            Ok(r) => r,
            Err(_) => continue,
        };
        // 目录名与解析成分不一致通常意味着放错的计算
        if let Some(dir_name) = outcome.path.file_name().and_then(|n| n.to_str()) {
            if let Some(expected) = formula_from_calc_dir_name(dir_name) {
                if expected != record.formula {
                    output::print_warning(&format!(
                        "{}: parsed formula {} does not match directory name",
                        dir_name, record.formula
                    ));
                }
            }
        }
        records.push(record);
    }

    if records.is_empty() {
        output::print_warning("No completed calculations found to parse.");
        return Ok(());
    }

    output::print_info(&format!(
        "Parsed {} calculations ({} failed)",
        summary.success, summary.failed
    ));

    // 生成能：缺失单质参考时报错并列出缺失元素
    let refs = formation::elemental_refs(&records);
    formation::fill_formation_energies(&mut records, &refs)?;

    // 按每原子生成能排序
    records.sort_by(|a, b| {
        let fa = a.formation_energy.unwrap_or(0.0) / a.composition().map(|c| c.num_atoms()).unwrap_or(1.0);
        let fb = b.formation_energy.unwrap_or(0.0) / b.composition().map(|c| c.num_atoms()).unwrap_or(1.0);
        fa.partial_cmp(&fb).unwrap_or(std::cmp::Ordering::Equal)
    });

    let rows: Vec<EnergyRow> = records
        .iter()
        .map(|r| EnergyRow {
            formula: r.formula.clone(),
            kpoints: r.kpoints.clone().unwrap_or_else(|| "-".to_string()),
            energy_per_fu: format!("{:.6}", r.energy_per_fu),
            energy_per_atom: format!("{:.6}", r.energy_per_atom),
            formation_energy: r
                .formation_energy
                .map(|f| format!("{:.6}", f))
                .unwrap_or_default(),
        })
        .collect();
    println!("{}", Table::new(&rows));

    export::write_energies_csv(&records, &args.output)?;
    output::print_success(&format!(
        "Energies table saved to '{}'",
        args.output.display()
    ));

    if let Some(ref json_path) = args.json {
        let content = serde_json::to_string_pretty(&records)?;
        fs::write(json_path, content).map_err(|e| ChemlimError::FileWriteError {
            path: json_path.display().to_string(),
            source: e,
        })?;
        output::print_success(&format!("Energies JSON saved to '{}'", json_path.display()));
    }

    Ok(())
}
