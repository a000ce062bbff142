//! # INCAR 模板与标签更新
//!
//! k 点收敛测试使用静态 PBEsol 模板，生产弛豫使用 HSE06 模板；
//! 用户自定义标签通过正则 upsert 覆盖。
//!
//! ## 依赖关系
//! - 被 `commands/generate.rs` 使用
//! - 使用 `regex` 进行标签替换

use crate::error::{ChemlimError, Result};
use regex::Regex;

/// k 点收敛测试 INCAR（静态 PBEsol）
pub fn convergence_incar() -> String {
    "\
ALGO = Normal
EDIFF = 1e-06
ENCUT = 600
GGA = PS
ISMEAR = 0
LCHARG = False
LWAVE = False
NSW = 0
PREC = Accurate
SIGMA = 0.01
"
    .to_string()
}

/// 生产弛豫 INCAR（HSE06）
pub fn production_incar() -> String {
    "\
AEXX = 0.25
ALGO = Normal
EDIFF = 1e-06
EDIFFG = -0.01
ENCUT = 600
GGA = PE
HFSCREEN = 0.208
IBRION = 2
ISIF = 3
ISMEAR = 0
LASPH = True
LHFCALC = True
LORBIT = 11
LREAL = False
LWAVE = False
NSW = 300
PREC = Accurate
PRECFOCK = Fast
SIGMA = 0.05
"
    .to_string()
}

/// 插入或替换 INCAR 标签行
pub fn upsert_incar_tag(incar: &str, tag: &str, value: &str) -> String {
    let pattern = Regex::new(&format!(r"(?im)^\s*{}\s*=.*$", regex::escape(tag))).unwrap();
    let line = format!("{} = {}", tag, value);

    if pattern.is_match(incar) {
        pattern.replace_all(incar, line.as_str()).to_string()
    } else {
        let mut out = incar.trim_end().to_string();
        out.push('\n');
        out.push_str(&line);
        out.push('\n');
        out
    }
}

/// 应用一组 "TAG=VALUE" 形式的用户设置
pub fn apply_user_settings(incar: &str, settings: &[String]) -> Result<String> {
    let mut out = incar.to_string();
    for setting in settings {
        let (tag, value) = setting
            .split_once('=')
            .ok_or_else(|| ChemlimError::InvalidArgument(format!(
                "INCAR setting '{}' is not of the form TAG=VALUE",
                setting
            )))?;
        let tag = tag.trim();
        let value = value.trim();
        if tag.is_empty() || value.is_empty() {
            return Err(ChemlimError::InvalidArgument(format!(
                "INCAR setting '{}' is not of the form TAG=VALUE",
                setting
            )));
        }
        out = upsert_incar_tag(&out, tag, value);
    }
    Ok(out)
}

/// 分子参考的模板修正（不弛豫盒子；O2 为三重态基态）
pub fn molecule_overrides(incar: &str, element: &str) -> String {
    let mut out = upsert_incar_tag(incar, "ISIF", "2");
    if element == "O" {
        out = upsert_incar_tag(&out, "ISPIN", "2");
        out = upsert_incar_tag(&out, "NUPDOWN", "2");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces_existing() {
        let incar = convergence_incar();
        let updated = upsert_incar_tag(&incar, "ENCUT", "700");
        assert!(updated.contains("ENCUT = 700"));
        assert!(!updated.contains("ENCUT = 600"));
        // 其他标签保留
        assert!(updated.contains("GGA = PS"));
    }

    #[test]
    fn test_upsert_appends_missing() {
        let incar = convergence_incar();
        let updated = upsert_incar_tag(&incar, "NKRED", "2");
        assert!(updated.ends_with("NKRED = 2\n"));
    }

    #[test]
    fn test_apply_user_settings() {
        let incar = production_incar();
        let settings = vec!["ENCUT = 520".to_string(), "NKRED=2".to_string()];
        let updated = apply_user_settings(&incar, &settings).unwrap();
        assert!(updated.contains("ENCUT = 520"));
        assert!(updated.contains("NKRED = 2"));
    }

    #[test]
    fn test_apply_rejects_malformed() {
        let incar = production_incar();
        assert!(apply_user_settings(&incar, &["ENCUT".to_string()]).is_err());
        assert!(apply_user_settings(&incar, &["=520".to_string()]).is_err());
    }

    #[test]
    fn test_molecule_overrides() {
        let incar = production_incar();
        let n2 = molecule_overrides(&incar, "N");
        assert!(n2.contains("ISIF = 2"));
        assert!(!n2.contains("NUPDOWN"));

        let o2 = molecule_overrides(&incar, "O");
        assert!(o2.contains("ISPIN = 2"));
        assert!(o2.contains("NUPDOWN = 2"));
    }
}
