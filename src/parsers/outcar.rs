//! # VASP OUTCAR 解析器
//!
//! 解析 VASP 计算输出文件 OUTCAR，提取末次能量与晶胞成分。
//! vasprun.xml 缺失时的回退解析路径。
//!
//! ## 依赖关系
//! - 被 `commands/parse.rs` 使用
//! - 使用 `models/composition.rs`

use crate::error::{ChemlimError, Result};
use crate::models::Composition;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// OUTCAR 解析结果
#[derive(Debug, Clone)]
pub struct OutcarResult {
    /// 末次 energy(sigma->0) (eV)
    pub final_energy: Option<f64>,

    /// 晶胞成分（VRHFIN 元素 + ions per type）
    pub composition: Option<Composition>,

    /// 原子总数 (NIONS)
    pub num_atoms: Option<usize>,

    /// 计算是否完成
    pub is_finished: bool,
}

/// 解析 VASP OUTCAR 文件
pub fn parse_outcar_file(path: &Path) -> Result<OutcarResult> {
    let file = File::open(path).map_err(|e| ChemlimError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_outcar_reader(BufReader::new(file), &path.display().to_string())
}

/// 从字符串内容解析 OUTCAR
pub fn parse_outcar_content(content: &str, name: &str) -> Result<OutcarResult> {
    parse_outcar_reader(BufReader::new(content.as_bytes()), name)
}

fn parse_outcar_reader<R: Read>(reader: BufReader<R>, name: &str) -> Result<OutcarResult> {
    let mut final_energy: Option<f64> = None;
    let mut num_atoms: Option<usize> = None;
    let mut elements: Vec<String> = Vec::new();
    let mut ions_per_type: Vec<f64> = Vec::new();
    let mut is_finished = false;

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        // 检查是否完成
        if line.contains("General timing and accounting informations for this job") {
            is_finished = true;
        }

        // 元素种类（按 POTCAR 顺序）
        // "   VRHFIN =Cd:  s2 d10"
        if line.contains("VRHFIN =") {
            if let Some(rest) = line.split("VRHFIN =").nth(1) {
                if let Some(symbol) = rest.split(':').next() {
                    elements.push(symbol.trim().to_string());
                }
            }
        }

        // 每种元素的原子数
        // "   ions per type =               2   2"
        if line.contains("ions per type") {
            if let Some(rest) = line.split('=').nth(1) {
                ions_per_type = rest
                    .split_whitespace()
                    .filter_map(|w| w.parse().ok())
                    .collect();
            }
        }

        // 提取能量
        // "energy  without entropy=     -20.432199  energy(sigma->0) =     -20.431853"
        if line.contains("energy  without entropy") {
            if let Some(pos) = line.find("energy(sigma->0)") {
                let rest = &line[pos..];
                if let Some(val) = extract_number_after(rest, "=") {
                    final_energy = Some(val);
                }
            }
        }

        // 提取原子数
        // "   NIONS =       8"
        if line.contains("NIONS =") {
            if let Some(val) = extract_last_number(&line) {
                num_atoms = Some(val as usize);
            }
        }
    }

    let composition = if !elements.is_empty() && elements.len() == ions_per_type.len() {
        Some(
            Composition::from_pairs(elements.into_iter().zip(ions_per_type)).map_err(|e| {
                ChemlimError::ParseError {
                    format: "OUTCAR".to_string(),
                    path: name.to_string(),
                    reason: format!("invalid ion types: {}", e),
                }
            })?,
        )
    } else {
        None
    };

    Ok(OutcarResult {
        final_energy,
        composition,
        num_atoms,
        is_finished,
    })
}

/// 从字符串中提取指定标记之后的数字
fn extract_number_after(s: &str, marker: &str) -> Option<f64> {
    if let Some(pos) = s.find(marker) {
        let after = &s[pos + marker.len()..];
        after.trim().split_whitespace().next()?.parse().ok()
    } else {
        None
    }
}

/// 提取字符串中最后一个数字
fn extract_last_number(s: &str) -> Option<f64> {
    s.split_whitespace()
        .filter_map(|w| w.parse::<f64>().ok())
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CDTE_OUTCAR: &str = r#" vasp.6.3.2
   VRHFIN =Cd: s2 d10
   VRHFIN =Te: s2 p4
   ions per type =               2   2
   NIONS =      4
  free  energy   TOTEN  =       -19.876543 eV
  energy  without entropy=      -19.876543  energy(sigma->0) =      -19.876012
  free  energy   TOTEN  =       -20.432199 eV
  energy  without entropy=      -20.432199  energy(sigma->0) =      -20.431853
 General timing and accounting informations for this job:
"#;

    #[test]
    fn test_parse_outcar() {
        let result = parse_outcar_content(CDTE_OUTCAR, "test").unwrap();
        assert!(result.is_finished);
        assert!((result.final_energy.unwrap() - (-20.431853)).abs() < 1e-9);
        assert_eq!(result.num_atoms, Some(4));

        let comp = result.composition.unwrap();
        assert_eq!(comp.amount("Cd"), 2.0);
        assert_eq!(comp.amount("Te"), 2.0);
    }

    #[test]
    fn test_unfinished_outcar() {
        let truncated: String = CDTE_OUTCAR
            .lines()
            .filter(|l| !l.contains("General timing"))
            .collect::<Vec<_>>()
            .join("\n");
        let result = parse_outcar_content(&truncated, "test").unwrap();
        assert!(!result.is_finished);
    }

    #[test]
    fn test_last_energy_wins() {
        let result = parse_outcar_content(CDTE_OUTCAR, "test").unwrap();
        assert!((result.final_energy.unwrap() - (-20.431853)).abs() < 1e-9);
    }
}
