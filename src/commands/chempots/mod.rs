//! # chempots 命令分发
//!
//! 化学势极限相关子命令的执行入口。
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 子模块: calc, combine

pub mod calc;
pub mod combine;

use crate::cli::chempots::{ChempotsArgs, ChempotsCommands};
use crate::error::Result;

/// 执行 chempots 子命令
pub fn execute(args: ChempotsArgs) -> Result<()> {
    match args.command {
        ChempotsCommands::Calc(calc_args) => calc::execute(calc_args),
        ChempotsCommands::Combine(combine_args) => combine::execute(combine_args),
    }
}
