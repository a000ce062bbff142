//! # chempots 子命令 CLI 定义
//!
//! 化学势极限统一入口，包含多个子命令：
//! - `calc`: 从能量表计算化学势极限
//! - `combine`: 合并本征与掺杂极限
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/chempots/` 相应模块

use clap::{Args, Subcommand};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// Chempots 主命令
// ─────────────────────────────────────────────────────────────

/// chempots 主命令参数
#[derive(Args, Debug)]
pub struct ChempotsArgs {
    #[command(subcommand)]
    pub command: ChempotsCommands,
}

/// chempots 子命令
#[derive(Subcommand, Debug)]
pub enum ChempotsCommands {
    /// Calculate chemical potential limits from a parsed energies table
    Calc(CalcArgs),

    /// Merge an intrinsic and an extrinsic limits JSON
    Combine(CombineArgs),
}

// ─────────────────────────────────────────────────────────────
// calc 子命令
// ─────────────────────────────────────────────────────────────

/// calc 子命令参数
#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Energies table CSV from `chemlim parse`
    #[arg(long)]
    pub csv: PathBuf,

    /// Host material formula (e.g. 'CdTe')
    #[arg(long)]
    pub host: String,

    /// Filename for the limits CSV output
    #[arg(long, default_value = "chempot_limits.csv")]
    pub output_csv: PathBuf,

    /// Filename for the limits JSON output
    #[arg(long, default_value = "chempot_limits.json")]
    pub json: PathBuf,

    /// Stability-region plot output (.png or .svg; ternary hosts only)
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,
}

// ─────────────────────────────────────────────────────────────
// combine 子命令
// ─────────────────────────────────────────────────────────────

/// combine 子命令参数
#[derive(Args, Debug)]
pub struct CombineArgs {
    /// Intrinsic (host-only) limits JSON
    #[arg(long)]
    pub intrinsic: PathBuf,

    /// Extrinsic (host + dopant) limits JSON
    #[arg(long)]
    pub extrinsic: PathBuf,

    /// Dopant element whose chemical potential is merged in
    #[arg(long)]
    pub species: String,

    /// Filename for the merged limits JSON
    #[arg(short, long, default_value = "combined_chempot_limits.json")]
    pub output: PathBuf,
}
