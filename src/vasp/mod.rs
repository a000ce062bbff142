//! # VASP 输入文件生成模块
//!
//! 提供 INCAR 模板、KPOINTS 网格与分子参考结构。
//!
//! ## 子模块
//! - `incar`: INCAR 模板与标签 upsert
//! - `kpoints`: KSPACING 风格网格与收敛序列
//! - `molecules`: 双原子气体参考结构
//!
//! ## 依赖关系
//! - 被 `commands/generate.rs` 使用
//! - 使用 `models/structure.rs`

pub mod incar;
pub mod kpoints;
pub mod molecules;
