//! # 化学势极限数据模型
//!
//! 宿主材料稳定区域顶点（化学势极限）的交换格式，
//! 包含绝对化学势与相对单质参考的化学势两套数值。
//!
//! ## 依赖关系
//! - 被 `phasediag/`, `commands/chempots/` 使用
//! - 使用 `serde_json` 进行 JSON 交换

use crate::error::{ChemlimError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// 单个极限：元素 -> 化学势 (eV)
pub type LimitMu = BTreeMap<String, f64>;

/// 化学势极限集合
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChempotLimits {
    /// 单质参考能量：元素 -> 每原子能量 (eV)
    pub elemental_refs: BTreeMap<String, f64>,

    /// 绝对化学势极限：极限名 -> {元素 -> μ}
    pub limits: BTreeMap<String, LimitMu>,

    /// 相对单质参考的化学势极限：极限名 -> {元素 -> Δμ}
    pub limits_wrt_elemental_refs: BTreeMap<String, LimitMu>,
}

impl ChempotLimits {
    /// 从相对化学势极限与单质参考能量构造（绝对值 = 参考 + Δμ）
    pub fn from_relative(
        elemental_refs: BTreeMap<String, f64>,
        relative: BTreeMap<String, LimitMu>,
    ) -> Self {
        let limits = relative
            .iter()
            .map(|(name, mu)| {
                let abs = mu
                    .iter()
                    .map(|(el, dmu)| {
                        let reference = elemental_refs.get(el).copied().unwrap_or(0.0);
                        (el.clone(), reference + dmu)
                    })
                    .collect();
                (name.clone(), abs)
            })
            .collect();

        ChempotLimits {
            elemental_refs,
            limits,
            limits_wrt_elemental_refs: relative,
        }
    }

    /// 涉及的元素列表（字典序）
    pub fn elements(&self) -> Vec<String> {
        self.elemental_refs.keys().cloned().collect()
    }

    /// 极限数量
    pub fn num_limits(&self) -> usize {
        self.limits_wrt_elemental_refs.len()
    }

    /// 校验：每个极限覆盖所有元素
    pub fn validate(&self) -> Result<()> {
        let elements = self.elements();
        for (name, mu) in &self.limits_wrt_elemental_refs {
            for el in &elements {
                if !mu.contains_key(el) {
                    return Err(ChemlimError::Other(format!(
                        "limit '{}' is missing element {}",
                        name, el
                    )));
                }
            }
        }
        Ok(())
    }

    /// 从 JSON 文件读取
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ChemlimError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        let limits: ChempotLimits = serde_json::from_str(&content)?;
        limits.validate()?;
        Ok(limits)
    }

    /// 写入 JSON 文件（带缩进）
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ChemlimError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChempotLimits {
        let mut refs = BTreeMap::new();
        refs.insert("Cd".to_string(), -0.9167);
        refs.insert("Te".to_string(), -3.1433);

        let mut rich = LimitMu::new();
        rich.insert("Cd".to_string(), 0.0);
        rich.insert("Te".to_string(), -1.25);
        let mut poor = LimitMu::new();
        poor.insert("Cd".to_string(), -1.25);
        poor.insert("Te".to_string(), 0.0);

        let mut relative = BTreeMap::new();
        relative.insert("CdTe-Cd".to_string(), rich);
        relative.insert("CdTe-Te".to_string(), poor);

        ChempotLimits::from_relative(refs, relative)
    }

    #[test]
    fn test_absolute_from_relative() {
        let limits = sample();
        let rich = &limits.limits["CdTe-Cd"];
        assert!((rich["Cd"] - (-0.9167)).abs() < 1e-9);
        assert!((rich["Te"] - (-3.1433 - 1.25)).abs() < 1e-9);
    }

    #[test]
    fn test_validate() {
        let limits = sample();
        assert!(limits.validate().is_ok());

        let mut broken = limits.clone();
        broken
            .limits_wrt_elemental_refs
            .get_mut("CdTe-Cd")
            .unwrap()
            .remove("Te");
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let limits = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chempot_limits.json");
        limits.to_json_file(&path).unwrap();
        let loaded = ChempotLimits::from_json_file(&path).unwrap();
        assert_eq!(limits, loaded);
    }
}
