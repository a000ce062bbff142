//! # 统一错误处理模块
//!
//! 定义 Chemlim 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// Chemlim 统一错误类型
#[derive(Error, Debug)]
pub enum ChemlimError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Invalid chemical formula: {formula}\nReason: {reason}")]
    InvalidFormula { formula: String, reason: String },

    #[error("Unknown element symbol: {0}")]
    UnknownElement(String),

    // ─────────────────────────────────────────────────────────────
    // 相图 / 化学势计算错误
    // ─────────────────────────────────────────────────────────────
    #[error("No elemental reference energy for: {}", elements.join(", "))]
    MissingElementalRefs { elements: Vec<String> },

    #[error(
        "Host {formula} is unstable ({e_above_hull:.4} eV/atom above hull); \
         no chemical potential limits exist"
    )]
    UnstableHost { formula: String, e_above_hull: f64 },

    #[error("Phase {formula} not found in the energies table")]
    PhaseNotFound { formula: String },

    #[error("Chemical potential region is degenerate: {0}")]
    DegenerateRegion(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV / JSON 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("No calculation directories found with pattern: {pattern}")]
    NoDirsFound { pattern: String },

    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ChemlimError>;
