//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `select`: 从本地条目快照选择竞争相
//! - `generate`: 生成 VASP 输入目录
//! - `parse`: 解析已完成的竞争相计算
//! - `chempots`: 化学势极限（嵌套子命令）
//!   - `calc`: 计算化学势极限
//!   - `combine`: 合并本征与掺杂极限
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: select, generate, parse, chempots

pub mod chempots;
pub mod generate;
pub mod parse;
pub mod select;

use clap::{Parser, Subcommand};

/// Chemlim - 化学势极限工具箱
#[derive(Parser)]
#[command(name = "chemlim")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Chemical potential limits toolkit for point-defect DFT workflows", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Select competing phases of a host from a local entries snapshot
    Select(select::SelectArgs),

    /// Generate VASP input directories for selected competing phases
    Generate(generate::GenerateArgs),

    /// Parse completed competing-phase calculations into an energies table
    Parse(parse::ParseArgs),

    /// Compute and combine chemical potential limits
    Chempots(chempots::ChempotsArgs),
}
