//! # parse 子命令 CLI 定义
//!
//! 解析已完成的竞争相计算并汇总能量表。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/parse.rs`

use clap::Args;
use std::path::PathBuf;

/// parse 子命令参数
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Root directory containing competing-phase calculation folders
    #[arg(short, long, default_value = "competing_phases")]
    pub dir: PathBuf,

    /// Glob pattern(s) for calculation directory names (comma-separated)
    #[arg(long, default_value = "*_EaH_*")]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Filename for the energies table CSV
    #[arg(short, long, default_value = "competing_phase_energies.csv")]
    pub output: PathBuf,

    /// Optional JSON output of the energies table
    #[arg(long)]
    pub json: Option<PathBuf>,
}
