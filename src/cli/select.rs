//! # select 子命令 CLI 定义
//!
//! 从本地条目快照中为宿主材料选择竞争相。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/select.rs`

use clap::Args;
use std::path::PathBuf;

/// select 子命令参数
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Host material formula (e.g. 'CdTe')
    #[arg(long)]
    pub host: String,

    /// Path to the entries snapshot JSON exported from a materials database
    #[arg(long)]
    pub entries: PathBuf,

    /// Energy-above-hull cutoff for competing phases (eV/atom)
    #[arg(long, default_value_t = 0.1)]
    pub e_above_hull: f64,

    /// Extrinsic dopant element (repeatable); one selection file written per dopant
    #[arg(long)]
    pub extrinsic: Vec<String>,

    /// Filename for the selection JSON output
    #[arg(short, long, default_value = "competing_phases.json")]
    pub output: PathBuf,

    /// Optional CSV summary of the selection
    #[arg(long)]
    pub csv: Option<PathBuf>,
}
