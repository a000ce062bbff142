//! # chempots calc 子命令实现
//!
//! 从能量表计算宿主的化学势极限。
//!
//! ## 功能
//! - 读取能量表 CSV，推导单质参考与生成能
//! - 求解宿主稳定区域顶点
//! - 生成终端表格、CSV、JSON，三元体系可选绘图
//!
//! ## 依赖关系
//! - 使用 `cli/chempots.rs` 定义的参数
//! - 使用 `phasediag/`
//! - 使用 `utils/output.rs`

use crate::cli::chempots::CalcArgs;
use crate::error::Result;
use crate::models::Composition;
use crate::phasediag::{export, formation, limits, plot};
use crate::utils::output;

use tabled::builder::Builder;

/// 执行 calc 子命令
pub fn execute(args: CalcArgs) -> Result<()> {
    output::print_header("Calculating Chemical Potential Limits");

    let records = export::read_energies_csv(&args.csv)?;
    output::print_info(&format!(
        "Loaded {} energy records from '{}'",
        records.len(),
        args.csv.display()
    ));

    let refs = formation::elemental_refs(&records);
    let phases = formation::build_phases(&records, &refs)?;

    let host_formula = Composition::parse(&args.host)?.reduced_formula();
    let region = limits::solve_limits(&host_formula, &phases)?;

    output::print_info(&format!(
        "{} competing phases constrain the {} stability region",
        region.competing.len(),
        region.host.formula
    ));
    output::print_info(&format!(
        "Host formation energy: {:.4} eV/fu ({:.4} eV/atom)",
        region.host.formation_per_fu,
        region.host.formation_per_atom()
    ));

    let chempot_limits = region.to_chempot_limits(&refs)?;

    // 极限表格（列随元素动态生成）
    let mut builder = Builder::default();
    let mut header = vec!["Limit".to_string()];
    header.extend(region.elements.iter().map(|el| format!("Δμ_{} (eV)", el)));
    builder.push_record(header);
    for (name, mu) in &chempot_limits.limits_wrt_elemental_refs {
        let mut row = vec![name.clone()];
        for el in &region.elements {
            row.push(format!("{:.4}", mu.get(el).copied().unwrap_or(0.0)));
        }
        builder.push_record(row);
    }
    println!("{}", builder.build());

    export::write_limits_csv(&chempot_limits, &args.output_csv)?;
    output::print_success(&format!(
        "Limits CSV saved to '{}'",
        args.output_csv.display()
    ));

    chempot_limits.to_json_file(&args.json)?;
    output::print_success(&format!("Limits JSON saved to '{}'", args.json.display()));

    if let Some(ref plot_path) = args.plot {
        if region.elements.len() == 3 {
            plot::plot_stability_region(&region, plot_path, args.width, args.height)?;
            output::print_success(&format!(
                "Stability-region plot saved to '{}'",
                plot_path.display()
            ));
        } else {
            output::print_warning(
                "Stability-region plotting is only available for ternary hosts, skipping.",
            );
        }
    }

    Ok(())
}
