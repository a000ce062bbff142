//! # 数据模型模块
//!
//! 定义化学成分、晶体结构、相条目与化学势极限的数据表示。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `phasediag/`, `vasp/`, `commands/` 使用
//! - 子模块: composition, structure, entry, chempots

pub mod chempots;
pub mod composition;
pub mod entry;
pub mod structure;

pub use chempots::{ChempotLimits, LimitMu};
pub use composition::Composition;
pub use entry::{
    format_calc_dir_name, formula_from_calc_dir_name, DbEntry, DbStructure, EnergyRecord,
    SelectedPhase,
};
pub use structure::{Atom, Crystal, Lattice};
