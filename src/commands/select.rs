//! # select 命令实现
//!
//! 从本地条目快照中为宿主材料选择竞争相。
//!
//! ## 功能
//! - 限定宿主化学空间内的候选相
//! - 依据快照能量重新计算凸包上方能量
//! - EaH 截断筛选，单质参考始终保留
//! - 掺杂体系按元素逐个输出选择文件
//!
//! ## 依赖关系
//! - 使用 `cli/select.rs` 定义的参数
//! - 使用 `parsers/entrydb.rs`, `phasediag/hull.rs`
//! - 使用 `utils/output.rs`

use crate::cli::select::SelectArgs;
use crate::error::{ChemlimError, Result};
use crate::models::{composition, Composition, DbEntry, SelectedPhase};
use crate::parsers::entrydb;
use crate::phasediag::formation::PhaseEnergy;
use crate::phasediag::hull;
use crate::utils::{output, progress};
use crate::vasp::molecules;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 选择结果表格行
#[derive(Debug, Tabled)]
struct SelectionRow {
    #[tabled(rename = "Formula")]
    formula: String,
    #[tabled(rename = "Space group")]
    spacegroup: String,
    #[tabled(rename = "EaH (eV/atom)")]
    e_above_hull: String,
    #[tabled(rename = "E (eV/atom)")]
    energy_per_atom: String,
    #[tabled(rename = "Molecule")]
    molecule: String,
    #[tabled(rename = "ID")]
    material_id: String,
}

/// 执行 select 命令
pub fn execute(args: SelectArgs) -> Result<()> {
    output::print_header("Selecting Competing Phases");

    let host = Composition::parse(&args.host)?.reduced();
    let host_formula = host.to_string();

    for el in &args.extrinsic {
        if !composition::is_element(el) {
            return Err(ChemlimError::UnknownElement(el.clone()));
        }
        if host.contains(el) {
            return Err(ChemlimError::InvalidArgument(format!(
                "extrinsic element {} is already a host element",
                el
            )));
        }
    }

    output::print_info(&format!(
        "Loading entries snapshot '{}'...",
        args.entries.display()
    ));
    let entries = entrydb::load_entries(&args.entries)?;
    output::print_info(&format!("Loaded {} entries", entries.len()));

    // 本征选择
    let host_elements = host.elements();
    let spinner = progress::create_spinner("Recomputing energies above hull...");
    let selection = select_in_space(&entries, &host_elements, &host_formula, args.e_above_hull);
    spinner.finish_and_clear();
    let selection = selection?;
    report_selection(&format!("{} competing phases", host_formula), &selection);
    write_selection(&selection, &args.output)?;
    if let Some(ref csv_path) = args.csv {
        write_selection_csv(&selection, csv_path)?;
    }

    // 掺杂选择：化学空间扩展一个元素，只保留含掺杂元素的相
    for dopant in &args.extrinsic {
        let mut space = host_elements.clone();
        space.push(dopant.clone());
        space.sort();

        let extended = select_in_space(&entries, &space, &host_formula, args.e_above_hull)?;
        let extrinsic_selection: Vec<SelectedPhase> = extended
            .into_iter()
            .filter(|p| {
                Composition::parse(&p.formula)
                    .map(|c| c.contains(dopant))
                    .unwrap_or(false)
            })
            .collect();

        report_selection(
            &format!("{} extrinsic phases ({})", host_formula, dopant),
            &extrinsic_selection,
        );
        let path = suffixed_path(&args.output, dopant);
        write_selection(&extrinsic_selection, &path)?;
        if let Some(ref csv_path) = args.csv {
            write_selection_csv(&extrinsic_selection, &suffixed_path(csv_path, dopant))?;
        }
    }

    Ok(())
}

/// 在给定化学空间内完成候选筛选
fn select_in_space(
    entries: &[DbEntry],
    elements: &[String],
    host_formula: &str,
    cutoff: f64,
) -> Result<Vec<SelectedPhase>> {
    // 化学空间内的候选条目
    let candidates: Vec<(&DbEntry, Composition)> = entries
        .iter()
        .filter_map(|entry| {
            let comp = entry.composition().ok()?;
            comp.is_subset_of(elements).then_some((entry, comp))
        })
        .collect();

    if !candidates
        .iter()
        .any(|(_, comp)| comp.reduced_formula() == host_formula)
    {
        return Err(ChemlimError::PhaseNotFound {
            formula: host_formula.to_string(),
        });
    }

    // 单质参考能量：各元素最低的单质每原子能量
    let mut refs: BTreeMap<String, f64> = BTreeMap::new();
    for (entry, comp) in &candidates {
        if comp.is_elemental() {
            let el = comp.elements().remove(0);
            refs.entry(el)
                .and_modify(|e| *e = e.min(entry.energy_per_atom))
                .or_insert(entry.energy_per_atom);
        }
    }
    let missing: Vec<String> = elements
        .iter()
        .filter(|el| !refs.contains_key(*el))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ChemlimError::MissingElementalRefs { elements: missing });
    }

    // 凸包约束集：每个化学式取最低能量条目
    let mut hull_phases: BTreeMap<String, PhaseEnergy> = BTreeMap::new();
    for (entry, comp) in &candidates {
        let phase = entry_phase(entry, comp, &refs);
        hull_phases
            .entry(phase.formula.clone())
            .and_modify(|existing| {
                if phase.formation_per_atom() < existing.formation_per_atom() {
                    *existing = phase.clone();
                }
            })
            .or_insert(phase);
    }
    let hull_set: Vec<PhaseEnergy> = hull_phases.into_values().collect();

    // 逐条目重新计算 EaH 并截断
    let mut all: Vec<SelectedPhase> = Vec::new();
    for (entry, comp) in &candidates {
        let phase = entry_phase(entry, comp, &refs);
        let eah = hull::e_above_hull(&phase, &hull_set, elements)?;

        let is_molecule = comp.is_elemental()
            && molecules::is_diatomic_gas(&comp.elements()[0]);

        all.push(SelectedPhase {
            formula: phase.formula,
            material_id: entry.material_id.clone(),
            spacegroup: entry.spacegroup.clone(),
            e_above_hull: eah,
            energy_per_atom: entry.energy_per_atom,
            nsites: entry.nsites,
            is_molecule,
            structure: entry.structure.clone(),
        });
    }

    let mut selection: Vec<SelectedPhase> = all
        .iter()
        .filter(|p| p.e_above_hull <= cutoff)
        .cloned()
        .collect();

    // 宿主基态条目必须在选择中，即使其 EaH 超过截断
    if !selection.iter().any(|p| p.formula == host_formula) {
        if let Some(best_host) = all
            .iter()
            .filter(|p| p.formula == host_formula)
            .min_by(|a, b| {
                a.e_above_hull
                    .partial_cmp(&b.e_above_hull)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        {
            selection.push(best_host.clone());
        }
    }

    selection.sort_by(|a, b| {
        a.e_above_hull
            .partial_cmp(&b.e_above_hull)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.formula.cmp(&b.formula))
    });
    Ok(selection)
}

/// 从条目构造求解器相
fn entry_phase(entry: &DbEntry, comp: &Composition, refs: &BTreeMap<String, f64>) -> PhaseEnergy {
    let reduced = comp.reduced();
    let n_atoms = reduced.num_atoms();
    let energy_per_fu = entry.energy_per_atom * n_atoms;
    let ref_sum: f64 = reduced.iter().map(|(el, n)| n * refs[el]).sum();

    PhaseEnergy {
        formula: reduced.to_string(),
        composition: reduced,
        energy_per_fu,
        formation_per_fu: energy_per_fu - ref_sum,
    }
}

/// 打印选择结果表格
fn report_selection(title: &str, selection: &[SelectedPhase]) {
    output::print_header(title);

    if selection.is_empty() {
        output::print_warning("No phases below the energy-above-hull cutoff.");
        return;
    }

    let rows: Vec<SelectionRow> = selection
        .iter()
        .map(|p| SelectionRow {
            formula: p.formula.clone(),
            spacegroup: p.spacegroup.clone().unwrap_or_else(|| "-".to_string()),
            e_above_hull: format!("{:.4}", p.e_above_hull),
            energy_per_atom: format!("{:.4}", p.energy_per_atom),
            molecule: if p.is_molecule { "yes" } else { "" }.to_string(),
            material_id: p.material_id.clone(),
        })
        .collect();

    println!("{}", Table::new(&rows));
    output::print_info(&format!("{} phases selected", selection.len()));
}

/// 写出选择 JSON
fn write_selection(selection: &[SelectedPhase], path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(selection)?;
    fs::write(path, content).map_err(|e| ChemlimError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    output::print_success(&format!("Selection saved to '{}'", path.display()));
    Ok(())
}

/// 写出选择 CSV 摘要
fn write_selection_csv(selection: &[SelectedPhase], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(ChemlimError::CsvError)?;
    wtr.write_record(["formula", "material_id", "spacegroup", "e_above_hull", "energy_per_atom"])
        .map_err(ChemlimError::CsvError)?;
    for p in selection {
        wtr.write_record(&[
            p.formula.clone(),
            p.material_id.clone(),
            p.spacegroup.clone().unwrap_or_default(),
            format!("{:.6}", p.e_above_hull),
            format!("{:.6}", p.energy_per_atom),
        ])
        .map_err(ChemlimError::CsvError)?;
    }
    wtr.flush().map_err(|e| ChemlimError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    output::print_success(&format!("Selection table saved to '{}'", path.display()));
    Ok(())
}

/// 在文件名后缀前追加 "_<dopant>"
fn suffixed_path(path: &Path, dopant: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("selection");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, dopant, ext),
        None => format!("{}_{}", stem, dopant),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, formula: &str, energy_per_atom: f64) -> DbEntry {
        DbEntry {
            material_id: id.to_string(),
            formula: formula.to_string(),
            energy_per_atom,
            nsites: 2,
            spacegroup: None,
            e_above_hull: None,
            structure: None,
        }
    }

    fn cd_te_entries() -> Vec<DbEntry> {
        vec![
            entry("mp-1", "Cd", -1.0),
            entry("mp-2", "Te", -3.0),
            entry("mp-3", "CdTe", -2.5),   // ΔH/atom = -0.5
            entry("mp-4", "Cd3Te", -1.55), // ΔH/atom = -0.05, EaH = 0.2
            entry("mp-5", "CdSe", -9.9),   // 不在化学空间内
        ]
    }

    #[test]
    fn test_select_honors_cutoff() {
        let entries = cd_te_entries();
        let elements = vec!["Cd".to_string(), "Te".to_string()];
        let selection = select_in_space(&entries, &elements, "CdTe", 0.1).unwrap();

        let formulas: Vec<&str> = selection.iter().map(|p| p.formula.as_str()).collect();
        assert!(formulas.contains(&"Cd"));
        assert!(formulas.contains(&"Te"));
        assert!(formulas.contains(&"CdTe"));
        assert!(!formulas.contains(&"Cd3Te"));
        assert!(!formulas.contains(&"CdSe"));
    }

    #[test]
    fn test_select_wide_cutoff_keeps_metastable() {
        let entries = cd_te_entries();
        let elements = vec!["Cd".to_string(), "Te".to_string()];
        let selection = select_in_space(&entries, &elements, "CdTe", 0.3).unwrap();

        let cd3te = selection.iter().find(|p| p.formula == "Cd3Te").unwrap();
        assert!((cd3te.e_above_hull - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_unstable_host_still_selected() {
        // CdTe ΔH/atom = +0.25 (EaH 0.25 > 截断)，宿主基态仍保留
        let entries = vec![
            entry("mp-1", "Cd", -1.0),
            entry("mp-2", "Te", -3.0),
            entry("mp-3", "CdTe", -1.75),
        ];
        let elements = vec!["Cd".to_string(), "Te".to_string()];
        let selection = select_in_space(&entries, &elements, "CdTe", 0.1).unwrap();

        let cdte = selection.iter().find(|p| p.formula == "CdTe").unwrap();
        assert!((cdte.e_above_hull - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_select_missing_host_errors() {
        let entries = vec![entry("mp-1", "Cd", -1.0), entry("mp-2", "Te", -3.0)];
        let elements = vec!["Cd".to_string(), "Te".to_string()];
        let result = select_in_space(&entries, &elements, "CdTe", 0.1);
        assert!(matches!(result, Err(ChemlimError::PhaseNotFound { .. })));
    }

    #[test]
    fn test_select_missing_elemental_ref_errors() {
        let entries = vec![entry("mp-1", "Cd", -1.0), entry("mp-3", "CdTe", -2.5)];
        let elements = vec!["Cd".to_string(), "Te".to_string()];
        let result = select_in_space(&entries, &elements, "CdTe", 0.1);
        assert!(matches!(
            result,
            Err(ChemlimError::MissingElementalRefs { .. })
        ));
    }

    #[test]
    fn test_gas_reference_flagged() {
        let entries = vec![
            entry("mp-1", "Cd", -1.0),
            entry("mp-2", "O2", -5.0),
            entry("mp-3", "CdO", -4.5),
        ];
        let elements = vec!["Cd".to_string(), "O".to_string()];
        let selection = select_in_space(&entries, &elements, "CdO", 0.1).unwrap();

        let oxygen = selection.iter().find(|p| p.formula == "O").unwrap();
        assert!(oxygen.is_molecule);
        let cd = selection.iter().find(|p| p.formula == "Cd").unwrap();
        assert!(!cd.is_molecule);
    }

    #[test]
    fn test_suffixed_path() {
        assert_eq!(
            suffixed_path(Path::new("competing_phases.json"), "F"),
            PathBuf::from("competing_phases_F.json")
        );
    }
}
