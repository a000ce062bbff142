//! # VASP POSCAR 格式解析与输出
//!
//! 解析 VASP POSCAR/CONTCAR 文件格式，并生成 POSCAR 字符串。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1               # atom positions
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs`, `vasp/`, `commands/generate.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{ChemlimError, Result};
use crate::models::{Atom, Crystal, Lattice};
use std::fs;
use std::path::Path;

/// 解析 POSCAR/CONTCAR 文件
pub fn parse_poscar_file(path: &Path) -> Result<Crystal> {
    let content = fs::read_to_string(path).map_err(|e| ChemlimError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_poscar_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
}

/// 从字符串内容解析 POSCAR 格式
pub fn parse_poscar_content(content: &str, default_name: &str) -> Result<Crystal> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 8 {
        return Err(ChemlimError::ParseError {
            format: "poscar".to_string(),
            path: default_name.to_string(),
            reason: "File too short".to_string(),
        });
    }

    // Line 0: Comment/name
    let name = lines[0].trim().to_string();
    let name = if name.is_empty() {
        default_name.to_string()
    } else {
        name
    };

    // Line 1: Scaling factor
    let scale: f64 = lines[1].trim().parse().unwrap_or(1.0);

    // Lines 2-4: Lattice vectors
    let mut matrix = [[0.0; 3]; 3];
    for i in 0..3 {
        let parts: Vec<f64> = lines[2 + i]
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();
        if parts.len() < 3 {
            return Err(ChemlimError::ParseError {
                format: "poscar".to_string(),
                path: name.clone(),
                reason: format!("Invalid lattice vector at line {}", 3 + i),
            });
        }
        matrix[i] = [parts[0] * scale, parts[1] * scale, parts[2] * scale];
    }
    let lattice = Lattice::from_vectors(matrix);

    // Line 5: 元素符号行（VASP 5+）；竞争相工作流需要元素身份，VASP 4 格式直接拒绝
    let line5_parts: Vec<&str> = lines[5].split_whitespace().collect();
    if line5_parts.is_empty() || line5_parts[0].parse::<i32>().is_ok() {
        return Err(ChemlimError::ParseError {
            format: "poscar".to_string(),
            path: name.clone(),
            reason: "Missing element symbol line (VASP 4 format unsupported)".to_string(),
        });
    }
    let elements: Vec<String> = line5_parts.iter().map(|s| s.to_string()).collect();
    let counts: Vec<usize> = lines[6]
        .split_whitespace()
        .filter_map(|s| s.parse().ok())
        .collect();
    if counts.len() != elements.len() {
        return Err(ChemlimError::ParseError {
            format: "poscar".to_string(),
            path: name.clone(),
            reason: "Element and count lines have different lengths".to_string(),
        });
    }

    // Check for "Selective dynamics" line
    let mut coord_line = 7;
    if lines.len() > coord_line
        && lines[coord_line]
            .trim()
            .to_lowercase()
            .starts_with("selective")
    {
        coord_line += 1;
    }

    if lines.len() <= coord_line {
        return Err(ChemlimError::ParseError {
            format: "poscar".to_string(),
            path: name.clone(),
            reason: "Missing coordinate type line".to_string(),
        });
    }

    let coord_type = lines[coord_line].trim().to_lowercase();
    let is_cartesian = coord_type.starts_with('c') || coord_type.starts_with('k');

    // Parse atom positions
    let mut atoms: Vec<Atom> = Vec::new();
    let mut line_idx = coord_line + 1;

    for (elem, &count) in elements.iter().zip(counts.iter()) {
        for _ in 0..count {
            if line_idx >= lines.len() {
                break;
            }
            let parts: Vec<f64> = lines[line_idx]
                .split_whitespace()
                .take(3)
                .filter_map(|s| s.parse().ok())
                .collect();

            if parts.len() >= 3 {
                let position = if is_cartesian {
                    cart_to_frac([parts[0], parts[1], parts[2]], &lattice)
                } else {
                    [parts[0], parts[1], parts[2]]
                };
                atoms.push(Atom::new(elem.clone(), position));
            }
            line_idx += 1;
        }
    }

    let expected: usize = counts.iter().sum();
    if atoms.len() != expected {
        return Err(ChemlimError::ParseError {
            format: "poscar".to_string(),
            path: name.clone(),
            reason: format!("Expected {} atoms, found {}", expected, atoms.len()),
        });
    }

    Ok(Crystal::new(name, lattice, atoms))
}

/// 笛卡尔坐标转分数坐标
fn cart_to_frac(cart: [f64; 3], lattice: &Lattice) -> [f64; 3] {
    let m = lattice.matrix;
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);

    if det.abs() < 1e-10 {
        return cart;
    }

    let inv = [
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
        ],
    ];

    [
        inv[0][0] * cart[0] + inv[0][1] * cart[1] + inv[0][2] * cart[2],
        inv[1][0] * cart[0] + inv[1][1] * cart[1] + inv[1][2] * cart[2],
        inv[2][0] * cart[0] + inv[2][1] * cart[1] + inv[2][2] * cart[2],
    ]
}

/// 将 Crystal 转换为 POSCAR 格式字符串（VASP 5+，Direct 坐标）
pub fn to_poscar_string(crystal: &Crystal) -> String {
    let groups = crystal.element_groups();

    let mut result = format!("{}\n1.0\n", crystal.name);

    for row in &crystal.lattice.matrix {
        result.push_str(&format!(
            "  {:>18.10}  {:>18.10}  {:>18.10}\n",
            row[0], row[1], row[2]
        ));
    }

    let symbols: Vec<&str> = groups.iter().map(|(el, _)| el.as_str()).collect();
    let counts: Vec<String> = groups.iter().map(|(_, n)| n.to_string()).collect();
    result.push_str(&format!("  {}\n", symbols.join("  ")));
    result.push_str(&format!("  {}\n", counts.join("  ")));
    result.push_str("Direct\n");

    for atom in &crystal.atoms {
        result.push_str(&format!(
            "  {:>16.10}  {:>16.10}  {:>16.10}\n",
            atom.position[0], atom.position[1], atom.position[2]
        ));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const CDTE_POSCAR: &str = "CdTe
1.0
   6.62  0.00  0.00
   0.00  6.62  0.00
   0.00  0.00  6.62
Cd Te
2 2
Direct
  0.00 0.00 0.00
  0.50 0.50 0.00
  0.25 0.25 0.25
  0.75 0.75 0.25
";

    #[test]
    fn test_parse_poscar() {
        let crystal = parse_poscar_content(CDTE_POSCAR, "CdTe").unwrap();
        assert_eq!(crystal.name, "CdTe");
        assert_eq!(crystal.num_atoms(), 4);
        assert_eq!(crystal.atoms[0].element, "Cd");
        assert_eq!(crystal.atoms[2].element, "Te");
        assert!((crystal.lattice.volume() - 6.62f64.powi(3)).abs() < 1e-6);
    }

    #[test]
    fn test_parse_cartesian() {
        let content = "Fe
1.0
   4.0  0.0  0.0
   0.0  4.0  0.0
   0.0  0.0  4.0
Fe
2
Cartesian
  0.0 0.0 0.0
  2.0 2.0 2.0
";
        let crystal = parse_poscar_content(content, "Fe").unwrap();
        assert!((crystal.atoms[1].position[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_rejects_vasp4() {
        let content = "X
1.0
   4.0  0.0  0.0
   0.0  4.0  0.0
   0.0  0.0  4.0
2
Direct
  0.0 0.0 0.0
  0.5 0.5 0.5
";
        assert!(parse_poscar_content(content, "X").is_err());
    }

    #[test]
    fn test_round_trip() {
        let crystal = parse_poscar_content(CDTE_POSCAR, "CdTe").unwrap();
        let written = to_poscar_string(&crystal);
        let reparsed = parse_poscar_content(&written, "CdTe").unwrap();

        assert_eq!(reparsed.num_atoms(), 4);
        assert_eq!(reparsed.element_groups(), crystal.element_groups());
        assert!((reparsed.atoms[3].position[1] - 0.75).abs() < 1e-9);
    }
}
