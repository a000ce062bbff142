//! # VASP vasprun.xml 解析器
//!
//! 逐行扫描 vasprun.xml，提取末次离子步总能量、k 点网格与原子类型，
//! 不引入完整 XML 解析依赖。
//!
//! ## 依赖关系
//! - 被 `commands/parse.rs` 使用
//! - 使用 `models/composition.rs`
//! - 使用 `regex` 进行标签捕获

use crate::error::{ChemlimError, Result};
use crate::models::Composition;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// vasprun.xml 解析结果
#[derive(Debug, Clone)]
pub struct VasprunResult {
    /// 末次离子步 E0 能量 (eV)
    pub final_energy: Option<f64>,

    /// k 点网格（如 "6x6x6"）
    pub kpoints: Option<String>,

    /// 晶胞成分
    pub composition: Option<Composition>,

    /// 文件是否完整（出现 `</modeling>` 闭合标签）
    pub is_finished: bool,
}

/// 解析 vasprun.xml 文件
pub fn parse_vasprun_file(path: &Path) -> Result<VasprunResult> {
    let file = File::open(path).map_err(|e| ChemlimError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_vasprun_reader(BufReader::new(file), &path.display().to_string())
}

/// 从字符串内容解析 vasprun.xml
pub fn parse_vasprun_content(content: &str, name: &str) -> Result<VasprunResult> {
    parse_vasprun_reader(BufReader::new(content.as_bytes()), name)
}

fn parse_vasprun_reader<R: Read>(reader: BufReader<R>, name: &str) -> Result<VasprunResult> {
    let e0_re = Regex::new(r#"<i name="e_0_energy"[^>]*>\s*([-+0-9.Ee]+)"#).unwrap();
    let div_re = Regex::new(r#"<v[^>]*name="divisions"[^>]*>([^<]*)<"#).unwrap();
    let cell_re = Regex::new(r"<c>([^<]*)</c>").unwrap();

    let mut final_energy: Option<f64> = None;
    let mut kpoints: Option<String> = None;
    let mut atom_types: Vec<(String, f64)> = Vec::new();
    let mut in_atomtypes = false;
    let mut is_finished = false;

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        // 末次出现的 e_0_energy 即末次离子步能量
        if let Some(cap) = e0_re.captures(&line) {
            if let Ok(val) = cap[1].parse::<f64>() {
                final_energy = Some(val);
            }
        }

        if kpoints.is_none() {
            if let Some(cap) = div_re.captures(&line) {
                let divs: Vec<&str> = cap[1].split_whitespace().collect();
                if divs.len() == 3 {
                    kpoints = Some(divs.join("x"));
                }
            }
        }

        // atomtypes 表：每行 <rc><c>count</c><c>element</c>...</rc>
        if line.contains(r#"<array name="atomtypes""#) {
            in_atomtypes = true;
            atom_types.clear();
        } else if in_atomtypes {
            if line.contains("</array>") {
                in_atomtypes = false;
            } else if line.contains("<rc>") {
                let fields: Vec<String> = cell_re
                    .captures_iter(&line)
                    .map(|c| c[1].trim().to_string())
                    .collect();
                if fields.len() >= 2 {
                    if let Ok(count) = fields[0].parse::<f64>() {
                        atom_types.push((fields[1].clone(), count));
                    }
                }
            }
        }

        if line.contains("</modeling>") {
            is_finished = true;
        }
    }

    let composition = if atom_types.is_empty() {
        None
    } else {
        Some(
            Composition::from_pairs(atom_types).map_err(|e| ChemlimError::ParseError {
                format: "vasprun.xml".to_string(),
                path: name.to_string(),
                reason: format!("invalid atom types: {}", e),
            })?,
        )
    };

    Ok(VasprunResult {
        final_energy,
        kpoints,
        composition,
        is_finished,
    })
}
