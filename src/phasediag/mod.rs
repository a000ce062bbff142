//! # 相图计算模块
//!
//! 提供生成能、凸包上方能量与化学势极限的计算核心。
//!
//! ## 子模块
//! - `formation`: 单质参考与生成能
//! - `polytope`: 化学势多面体顶点枚举
//! - `hull`: 凸包上方能量（线性规划对偶）
//! - `limits`: 宿主稳定区域与极限组装
//! - `export`: 能量表 / 极限数据 CSV 读写
//! - `plot`: 稳定区域图表
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型

pub mod export;
pub mod formation;
pub mod hull;
pub mod limits;
pub mod plot;
pub mod polytope;

pub use formation::PhaseEnergy;
pub use limits::{solve_limits, HostRegion};
pub use polytope::{Constraint, Vertex};
