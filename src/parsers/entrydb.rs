//! # 材料数据库快照读取
//!
//! 读取本地 JSON 条目快照（材料数据库导出的相条目列表）。
//!
//! ## 依赖关系
//! - 被 `commands/select.rs` 使用
//! - 使用 `models/entry.rs`
//! - 使用 `serde_json`

use crate::error::{ChemlimError, Result};
use crate::models::DbEntry;
use std::fs;
use std::path::Path;

/// 读取条目快照文件（JSON 数组）
pub fn load_entries(path: &Path) -> Result<Vec<DbEntry>> {
    if !path.exists() {
        return Err(ChemlimError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| ChemlimError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let entries: Vec<DbEntry> = serde_json::from_str(&content)?;

    if entries.is_empty() {
        return Err(ChemlimError::ParseError {
            format: "entries".to_string(),
            path: path.display().to_string(),
            reason: "snapshot contains no entries".to_string(),
        });
    }

    // 化学式必须可解析，否则尽早报错
    for entry in &entries {
        entry.composition().map_err(|e| ChemlimError::ParseError {
            format: "entries".to_string(),
            path: path.display().to_string(),
            reason: format!("entry {}: {}", entry.material_id, e),
        })?;
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SNAPSHOT: &str = r#"[
  {
    "material_id": "mp-406",
    "formula": "CdTe",
    "energy_per_atom": -3.54,
    "nsites": 2,
    "spacegroup": "F-43m",
    "e_above_hull": 0.0,
    "structure": {
      "lattice": [[4.7, 0.0, 0.0], [0.0, 4.7, 0.0], [0.0, 0.0, 4.7]],
      "species": ["Cd", "Te"],
      "frac_coords": [[0.0, 0.0, 0.0], [0.25, 0.25, 0.25]]
    }
  },
  {
    "material_id": "mp-94",
    "formula": "Cd",
    "energy_per_atom": -0.92,
    "nsites": 2
  }
]"#;

    #[test]
    fn test_load_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.json");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(SNAPSHOT.as_bytes()).unwrap();

        let entries = load_entries(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].material_id, "mp-406");
        assert!(entries[0].structure.is_some());
        assert!(entries[1].structure.is_none());
        assert_eq!(entries[1].spacegroup, None);
    }

    #[test]
    fn test_missing_file() {
        let result = load_entries(Path::new("/nonexistent/entries.json"));
        assert!(matches!(result, Err(ChemlimError::FileNotFound { .. })));
    }

    #[test]
    fn test_bad_formula_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.json");
        fs::write(
            &path,
            r#"[{"material_id": "mp-1", "formula": "NotAFormula!", "energy_per_atom": -1.0, "nsites": 1}]"#,
        )
        .unwrap();
        assert!(load_entries(&path).is_err());
    }
}
