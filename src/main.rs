//! # Chemlim - 化学势极限工具箱
//!
//! 点缺陷 DFT 工作流的竞争相选择、输入生成与化学势极限计算，
//! 统一成单一可执行文件。
//!
//! ## 子命令
//! - `select`   - 从本地条目快照选择竞争相
//! - `generate` - 生成 VASP 计算目录 (POSCAR/INCAR/KPOINTS)
//! - `parse`    - 解析已完成的竞争相计算
//! - `chempots` - 化学势极限
//!   - `calc`    - 计算宿主稳定区域顶点
//!   - `combine` - 合并本征与掺杂极限
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (VASP 输出与快照解析)
//!   │     ├── phasediag/ (生成能、凸包、化学势极限)
//!   │     ├── vasp/      (输入文件生成)
//!   │     └── models/    (数据模型)
//!   ├── batch/      (目录收集与并行处理)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod phasediag;
mod utils;
mod vasp;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
