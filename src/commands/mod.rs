//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `models/`, `phasediag/`, `vasp/`, `batch/`, `utils/`
//! - 子模块: select, generate, parse, chempots

pub mod chempots;
pub mod generate;
pub mod parse;
pub mod select;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Select(args) => select::execute(args),
        Commands::Generate(args) => generate::execute(args),
        Commands::Parse(args) => parse::execute(args),
        Commands::Chempots(args) => chempots::execute(args),
    }
}
