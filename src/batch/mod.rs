//! # 批量处理模块
//!
//! 提供计算目录的收集与并行处理能力。
//!
//! ## 功能
//! - 按模式收集计算目录
//! - 并行解析
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/parse.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::CalcDirCollector;
pub use runner::{BatchRunner, BatchSummary, ItemOutcome};
