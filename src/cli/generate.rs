//! # generate 子命令 CLI 定义
//!
//! 为选定的竞争相生成 VASP 计算目录。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/generate.rs`

use clap::Args;
use std::path::PathBuf;

/// generate 子命令参数
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Selection JSON produced by `chemlim select`
    #[arg(long)]
    pub selection: PathBuf,

    /// Root directory for the generated calculation folders
    #[arg(short, long, default_value = "competing_phases")]
    pub output_dir: PathBuf,

    // ─────────────────────────────────────────────────────────────
    // k 点收敛序列参数
    // ─────────────────────────────────────────────────────────────
    /// Coarsest k-spacing of the convergence series (Å⁻¹, 2π convention)
    #[arg(long, default_value_t = 0.30)]
    pub kspacing_max: f64,

    /// Finest k-spacing of the convergence series (Å⁻¹)
    #[arg(long, default_value_t = 0.10)]
    pub kspacing_min: f64,

    /// Step of the convergence series (Å⁻¹)
    #[arg(long, default_value_t = 0.05)]
    pub kspacing_step: f64,

    /// K-spacing for the production vasp_std inputs (Å⁻¹)
    #[arg(long, default_value_t = 0.15)]
    pub kspacing: f64,

    // ─────────────────────────────────────────────────────────────
    // 输入文件选项
    // ─────────────────────────────────────────────────────────────
    /// INCAR override as TAG=VALUE (repeatable, applied to both templates)
    #[arg(long = "incar")]
    pub incar_settings: Vec<String>,

    /// Write a Slurm sbatch script into each calculation directory
    #[arg(long, default_value_t = false)]
    pub sbatch: bool,

    /// Overwrite existing calculation directories
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
