//! # 能量表与极限数据导出
//!
//! 竞争相能量表的 CSV 读写与化学势极限的 CSV 导出。
//!
//! ## 依赖关系
//! - 被 `commands/parse.rs`, `commands/chempots/` 使用
//! - 使用 `models/` 数据模型
//! - 使用 `csv` 库

use crate::error::{ChemlimError, Result};
use crate::models::{ChempotLimits, EnergyRecord};
use std::path::Path;

/// 写出能量表 CSV
///
/// 列: formula,kpoints,energy,energy_per_fu,energy_per_atom,formation_energy
pub fn write_energies_csv(records: &[EnergyRecord], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path).map_err(ChemlimError::CsvError)?;

    for record in records {
        wtr.serialize(record).map_err(ChemlimError::CsvError)?;
    }

    wtr.flush().map_err(|e| ChemlimError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 读取能量表 CSV
pub fn read_energies_csv(path: &Path) -> Result<Vec<EnergyRecord>> {
    if !path.exists() {
        return Err(ChemlimError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut rdr = csv::Reader::from_path(path).map_err(ChemlimError::CsvError)?;
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        let record: EnergyRecord = row.map_err(ChemlimError::CsvError)?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(ChemlimError::ParseError {
            format: "csv".to_string(),
            path: path.display().to_string(),
            reason: "no energy records found".to_string(),
        });
    }

    Ok(records)
}

/// 写出化学势极限 CSV（相对单质参考的 Δμ）
///
/// 列: limit,<El1>,<El2>,...
pub fn write_limits_csv(limits: &ChempotLimits, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path).map_err(ChemlimError::CsvError)?;

    let elements = limits.elements();
    let mut header = vec!["limit".to_string()];
    header.extend(elements.iter().cloned());
    wtr.write_record(&header).map_err(ChemlimError::CsvError)?;

    for (name, mu) in &limits.limits_wrt_elemental_refs {
        let mut row = vec![name.clone()];
        for el in &elements {
            row.push(format!("{:.6}", mu.get(el).copied().unwrap_or(0.0)));
        }
        wtr.write_record(&row).map_err(ChemlimError::CsvError)?;
    }

    wtr.flush().map_err(|e| ChemlimError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Composition;

    #[test]
    fn test_energies_csv_round_trip() {
        let comp = Composition::parse("Cd2Te2").unwrap();
        let mut record = EnergyRecord::from_cell(&comp, -10.86, Some("6x6x6".to_string()));
        record.formation_energy = Some(-1.02);
        let records = vec![
            record,
            EnergyRecord::from_cell(&Composition::parse("Cd").unwrap(), -0.92, None),
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("energies.csv");
        write_energies_csv(&records, &path).unwrap();

        let loaded = read_energies_csv(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].formula, "CdTe");
        assert_eq!(loaded[0].kpoints.as_deref(), Some("6x6x6"));
        assert!((loaded[0].energy_per_fu - (-5.43)).abs() < 1e-9);
        assert!((loaded[0].formation_energy.unwrap() - (-1.02)).abs() < 1e-9);
        assert_eq!(loaded[1].kpoints, None);
        assert_eq!(loaded[1].formation_energy, None);
    }

    #[test]
    fn test_read_missing_csv() {
        let result = read_energies_csv(Path::new("/nonexistent/energies.csv"));
        assert!(matches!(result, Err(ChemlimError::FileNotFound { .. })));
    }
}
