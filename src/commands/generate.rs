//! # generate 命令实现
//!
//! 为选定的竞争相生成 VASP 计算目录。
//!
//! ## 功能
//! - 创建 `<Formula>_EaH_<x>/kpoint_converge/k.../` 收敛测试目录
//! - 创建 `<Formula>_EaH_<x>/vasp_std/` 生产输入目录
//! - 分子参考使用分子盒与 Γ 点单点
//! - 可选生成 sbatch 提交脚本
//!
//! ## 依赖关系
//! - 使用 `cli/generate.rs` 定义的参数
//! - 使用 `vasp/`, `parsers/poscar.rs`
//! - 使用 `utils/output.rs`, `utils/slurm.rs`

use crate::cli::generate::GenerateArgs;
use crate::error::{ChemlimError, Result};
use crate::models::{Composition, Crystal, SelectedPhase};
use crate::parsers::poscar;
use crate::utils::slurm::{generate_sbatch_script, SlurmConfig};
use crate::utils::output;
use crate::vasp::{incar, kpoints, molecules};

use std::fs;
use std::path::Path;

/// 执行 generate 命令
pub fn execute(args: GenerateArgs) -> Result<()> {
    output::print_header("Generating VASP Inputs");

    let selection = load_selection(&args.selection)?;
    output::print_info(&format!(
        "Loaded {} phases from '{}'",
        selection.len(),
        args.selection.display()
    ));

    fs::create_dir_all(&args.output_dir).map_err(|e| ChemlimError::FileWriteError {
        path: args.output_dir.display().to_string(),
        source: e,
    })?;

    let mut generated = 0;
    let mut skipped = 0;

    for phase in &selection {
        let calc_dir = args.output_dir.join(phase.calc_dir_name());

        if calc_dir.exists() && !args.overwrite {
            output::print_skip(&format!("{} (exists)", calc_dir.display()));
            skipped += 1;
            continue;
        }

        let crystal = match phase_structure(phase)? {
            Some(c) => c,
            None => {
                output::print_warning(&format!(
                    "No structure for {} ({}), skipping",
                    phase.formula, phase.material_id
                ));
                skipped += 1;
                continue;
            }
        };

        generate_phase_dirs(phase, &crystal, &calc_dir, &args)?;
        output::print_success(&format!("{} -> {}", phase.formula, calc_dir.display()));
        generated += 1;
    }

    output::print_done(&format!(
        "Generated {} calculation folder(s), skipped {}",
        generated, skipped
    ));

    Ok(())
}

/// 读取选择 JSON
fn load_selection(path: &Path) -> Result<Vec<SelectedPhase>> {
    if !path.exists() {
        return Err(ChemlimError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| ChemlimError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let selection: Vec<SelectedPhase> = serde_json::from_str(&content)?;
    if selection.is_empty() {
        return Err(ChemlimError::InvalidArgument(format!(
            "selection '{}' contains no phases",
            path.display()
        )));
    }
    Ok(selection)
}

/// 相的输入结构：分子参考构造分子盒，其余取快照结构
fn phase_structure(phase: &SelectedPhase) -> Result<Option<Crystal>> {
    if phase.is_molecule {
        let comp = Composition::parse(&phase.formula)?;
        let element = comp.elements().remove(0);
        return Ok(molecules::molecule_in_a_box(&element));
    }
    Ok(phase
        .structure
        .as_ref()
        .map(|s| s.to_crystal(&phase.formula)))
}

/// 生成单个相的全部计算目录
fn generate_phase_dirs(
    phase: &SelectedPhase,
    crystal: &Crystal,
    calc_dir: &Path,
    args: &GenerateArgs,
) -> Result<()> {
    let poscar_content = poscar::to_poscar_string(crystal);
    let potcar_spec = potcar_spec_string(crystal);

    // 收敛测试系列（分子参考无需 k 点收敛）
    if !phase.is_molecule {
        let series = kpoints::convergence_series(
            &crystal.lattice,
            args.kspacing_min,
            args.kspacing_max,
            args.kspacing_step,
        )?;

        let conv_incar =
            incar::apply_user_settings(&incar::convergence_incar(), &args.incar_settings)?;

        for mesh in &series {
            let mesh_dir = calc_dir
                .join("kpoint_converge")
                .join(kpoints::mesh_label(mesh));
            let comment = format!("{} {}", phase.formula, kpoints::mesh_label(mesh));
            write_input_set(
                &mesh_dir,
                &poscar_content,
                &conv_incar,
                &kpoints::kpoints_string(mesh, &comment),
                &potcar_spec,
            )?;
            if args.sbatch {
                write_sbatch(&mesh_dir, &format!("{}_{}", phase.formula, kpoints::mesh_label(mesh)))?;
            }
        }
    }

    // 生产目录
    let mut prod_incar =
        incar::apply_user_settings(&incar::production_incar(), &args.incar_settings)?;
    let prod_kpoints = if phase.is_molecule {
        let comp = Composition::parse(&phase.formula)?;
        prod_incar = incar::molecule_overrides(&prod_incar, &comp.elements()[0]);
        kpoints::gamma_only_string()
    } else {
        let mesh = kpoints::mesh_from_spacing(&crystal.lattice, args.kspacing);
        kpoints::kpoints_string(&mesh, &format!("{} vasp_std", phase.formula))
    };

    let std_dir = calc_dir.join("vasp_std");
    write_input_set(&std_dir, &poscar_content, &prod_incar, &prod_kpoints, &potcar_spec)?;
    if args.sbatch {
        write_sbatch(&std_dir, &phase.calc_dir_name())?;
    }

    Ok(())
}

/// 写出一组输入文件 (POSCAR, INCAR, KPOINTS, POTCAR.spec)
fn write_input_set(
    dir: &Path,
    poscar: &str,
    incar: &str,
    kpoints: &str,
    potcar_spec: &str,
) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| ChemlimError::FileWriteError {
        path: dir.display().to_string(),
        source: e,
    })?;

    for (name, content) in [
        ("POSCAR", poscar),
        ("INCAR", incar),
        ("KPOINTS", kpoints),
        ("POTCAR.spec", potcar_spec),
    ] {
        let path = dir.join(name);
        fs::write(&path, content).map_err(|e| ChemlimError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;
    }

    Ok(())
}

/// POTCAR 符号列表（POTCAR 文件受许可限制，只写出符号）
fn potcar_spec_string(crystal: &Crystal) -> String {
    let mut spec = String::new();
    for (el, _) in crystal.element_groups() {
        spec.push_str(&el);
        spec.push('\n');
    }
    spec
}

/// 写出 sbatch 脚本
fn write_sbatch(dir: &Path, job_name: &str) -> Result<()> {
    let config = SlurmConfig {
        job_name: job_name.to_string(),
        ..SlurmConfig::default()
    };
    let script = generate_sbatch_script(&config, dir, "srun vasp_std");
    let path = dir.join("submit.sh");
    fs::write(&path, script).map_err(|e| ChemlimError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::generate::GenerateArgs;
    use crate::models::DbStructure;

    fn phase(formula: &str, eah: f64, structure: Option<DbStructure>, is_molecule: bool) -> SelectedPhase {
        SelectedPhase {
            formula: formula.to_string(),
            material_id: "mp-test".to_string(),
            spacegroup: None,
            e_above_hull: eah,
            energy_per_atom: -1.0,
            nsites: 2,
            is_molecule,
            structure,
        }
    }

    fn cubic_structure() -> DbStructure {
        DbStructure {
            lattice: [[5.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 5.0]],
            species: vec!["Cd".to_string(), "Te".to_string()],
            frac_coords: vec![[0.0, 0.0, 0.0], [0.25, 0.25, 0.25]],
        }
    }

    fn args(output_dir: &Path, selection: &Path) -> GenerateArgs {
        GenerateArgs {
            selection: selection.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            kspacing_max: 0.30,
            kspacing_min: 0.10,
            kspacing_step: 0.05,
            kspacing: 0.15,
            incar_settings: vec![],
            sbatch: false,
            overwrite: false,
        }
    }

    #[test]
    fn test_generate_crystal_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let selection_path = dir.path().join("selection.json");
        let phases = vec![phase("CdTe", 0.0, Some(cubic_structure()), false)];
        fs::write(&selection_path, serde_json::to_string(&phases).unwrap()).unwrap();

        execute(args(dir.path(), &selection_path)).unwrap();

        let calc_dir = dir.path().join("CdTe_EaH_0");
        assert!(calc_dir.join("vasp_std/POSCAR").exists());
        assert!(calc_dir.join("vasp_std/INCAR").exists());
        assert!(calc_dir.join("vasp_std/KPOINTS").exists());
        assert!(calc_dir.join("vasp_std/POTCAR.spec").exists());
        // a = 5 Å, 0.30 Å⁻¹ -> k5,5,5 为最粗网格
        assert!(calc_dir.join("kpoint_converge/k5,5,5/INCAR").exists());

        let potcar_spec = fs::read_to_string(calc_dir.join("vasp_std/POTCAR.spec")).unwrap();
        assert_eq!(potcar_spec, "Cd\nTe\n");
    }

    #[test]
    fn test_generate_molecule_gamma_only() {
        let dir = tempfile::tempdir().unwrap();
        let selection_path = dir.path().join("selection.json");
        let phases = vec![phase("O", 0.0, None, true)];
        fs::write(&selection_path, serde_json::to_string(&phases).unwrap()).unwrap();

        execute(args(dir.path(), &selection_path)).unwrap();

        let calc_dir = dir.path().join("O_EaH_0");
        assert!(!calc_dir.join("kpoint_converge").exists());

        let kpts = fs::read_to_string(calc_dir.join("vasp_std/KPOINTS")).unwrap();
        assert!(kpts.contains(" 1 1 1"));
        let incar_content = fs::read_to_string(calc_dir.join("vasp_std/INCAR")).unwrap();
        assert!(incar_content.contains("ISIF = 2"));
        assert!(incar_content.contains("NUPDOWN = 2"));
    }

    #[test]
    fn test_generate_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        let selection_path = dir.path().join("selection.json");
        let phases = vec![phase("CdTe", 0.0, Some(cubic_structure()), false)];
        fs::write(&selection_path, serde_json::to_string(&phases).unwrap()).unwrap();

        fs::create_dir_all(dir.path().join("CdTe_EaH_0")).unwrap();
        execute(args(dir.path(), &selection_path)).unwrap();
        // 已存在且未 --overwrite: 不应生成 vasp_std
        assert!(!dir.path().join("CdTe_EaH_0/vasp_std").exists());
    }

    #[test]
    fn test_generate_sbatch_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let selection_path = dir.path().join("selection.json");
        let phases = vec![phase("CdTe", 0.0, Some(cubic_structure()), false)];
        fs::write(&selection_path, serde_json::to_string(&phases).unwrap()).unwrap();

        let mut a = args(dir.path(), &selection_path);
        a.sbatch = true;
        execute(a).unwrap();

        let script =
            fs::read_to_string(dir.path().join("CdTe_EaH_0/vasp_std/submit.sh")).unwrap();
        assert!(script.contains("#SBATCH -J CdTe_EaH_0"));
        assert!(script.contains("srun vasp_std"));
    }
}
