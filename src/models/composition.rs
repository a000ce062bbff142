//! # 化学成分数据模型
//!
//! 化学式解析与归约（"CdTe", "Li2ZrO3", "Ca(OH)2" 等）。
//!
//! ## 依赖关系
//! - 被 `models/entry.rs`, `phasediag/`, `commands/` 使用
//! - 使用 `regex` 进行化学式分词

use crate::error::{ChemlimError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 周期表元素符号（按原子序数排列）
const ELEMENT_SYMBOLS: &[&str] = &[
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// 检查元素符号是否合法
pub fn is_element(symbol: &str) -> bool {
    ELEMENT_SYMBOLS.contains(&symbol)
}

/// 化学成分：元素 -> 数量（按元素符号字典序存储）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    amounts: BTreeMap<String, f64>,
}

impl Composition {
    /// 从 (元素, 数量) 列表创建
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut amounts: BTreeMap<String, f64> = BTreeMap::new();
        for (el, n) in pairs {
            let el = el.into();
            if !is_element(&el) {
                return Err(ChemlimError::UnknownElement(el));
            }
            if n <= 0.0 {
                return Err(ChemlimError::InvalidFormula {
                    formula: el,
                    reason: "non-positive amount".to_string(),
                });
            }
            *amounts.entry(el).or_insert(0.0) += n;
        }
        if amounts.is_empty() {
            return Err(ChemlimError::InvalidFormula {
                formula: String::new(),
                reason: "empty composition".to_string(),
            });
        }
        Ok(Composition { amounts })
    }

    /// 解析化学式字符串（支持一层括号，如 "Ca(OH)2"）
    pub fn parse(formula: &str) -> Result<Self> {
        let trimmed = formula.trim();
        if trimmed.is_empty() {
            return Err(ChemlimError::InvalidFormula {
                formula: formula.to_string(),
                reason: "empty formula".to_string(),
            });
        }

        // 括号展开： "(OH)2" -> "O2H2"
        let flat = expand_parentheses(trimmed, formula)?;

        let token_re = Regex::new(r"([A-Z][a-z]?)(\d*\.?\d*)").unwrap();
        let mut pairs: Vec<(String, f64)> = Vec::new();
        let mut covered = 0usize;

        for cap in token_re.captures_iter(&flat) {
            let whole = cap.get(0).unwrap();
            // 必须连续覆盖整个字符串，否则存在非法字符
            if whole.start() != covered {
                return Err(ChemlimError::InvalidFormula {
                    formula: formula.to_string(),
                    reason: format!("unexpected characters at '{}'", &flat[covered..]),
                });
            }
            covered = whole.end();

            let symbol = cap.get(1).unwrap().as_str().to_string();
            if !is_element(&symbol) {
                return Err(ChemlimError::UnknownElement(symbol));
            }
            let amount_str = cap.get(2).unwrap().as_str();
            let amount: f64 = if amount_str.is_empty() {
                1.0
            } else {
                amount_str
                    .parse()
                    .map_err(|_| ChemlimError::InvalidFormula {
                        formula: formula.to_string(),
                        reason: format!("invalid amount '{}'", amount_str),
                    })?
            };
            pairs.push((symbol, amount));
        }

        if covered != flat.len() {
            return Err(ChemlimError::InvalidFormula {
                formula: formula.to_string(),
                reason: format!("unexpected characters at '{}'", &flat[covered..]),
            });
        }

        Self::from_pairs(pairs)
    }

    /// 元素列表（字典序）
    pub fn elements(&self) -> Vec<String> {
        self.amounts.keys().cloned().collect()
    }

    /// 指定元素的数量（不存在时为 0）
    pub fn amount(&self, element: &str) -> f64 {
        self.amounts.get(element).copied().unwrap_or(0.0)
    }

    /// 是否包含指定元素
    pub fn contains(&self, element: &str) -> bool {
        self.amounts.contains_key(element)
    }

    /// 总原子数
    pub fn num_atoms(&self) -> f64 {
        self.amounts.values().sum()
    }

    /// 是否为单质
    pub fn is_elemental(&self) -> bool {
        self.amounts.len() == 1
    }

    /// 所有元素是否都属于给定集合
    pub fn is_subset_of(&self, elements: &[String]) -> bool {
        self.amounts.keys().all(|el| elements.contains(el))
    }

    /// 迭代 (元素, 数量)
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.amounts.iter()
    }

    /// 归约成分（每化学式单元）
    ///
    /// 寻找使所有数量成为整数的最小倍率，再除以最大公约数。
    /// 无法整数化时按原比例返回。
    pub fn reduced(&self) -> Composition {
        for mult in 1..=12u64 {
            let scaled: Vec<f64> = self.amounts.values().map(|v| v * mult as f64).collect();
            if scaled.iter().all(|v| (v - v.round()).abs() < 1e-6 * mult as f64) {
                let ints: Vec<u64> = scaled.iter().map(|v| v.round() as u64).collect();
                let g = ints.iter().copied().fold(0u64, gcd);
                if g > 0 {
                    let amounts = self
                        .amounts
                        .keys()
                        .zip(ints.iter())
                        .map(|(el, n)| (el.clone(), *n as f64 / g as f64))
                        .collect();
                    return Composition { amounts };
                }
            }
        }
        self.clone()
    }

    /// 每原子归一化成分（数量和为 1）
    pub fn per_atom(&self) -> Composition {
        let total = self.num_atoms();
        let amounts = self
            .amounts
            .iter()
            .map(|(el, n)| (el.clone(), n / total))
            .collect();
        Composition { amounts }
    }

    /// 归约化学式字符串
    pub fn reduced_formula(&self) -> String {
        self.reduced().to_string()
    }

    /// 该成分相对归约化学式的单元数
    pub fn formula_units(&self) -> f64 {
        self.num_atoms() / self.reduced().num_atoms()
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (el, n) in &self.amounts {
            if (n - 1.0).abs() < 1e-9 {
                write!(f, "{}", el)?;
            } else if (n - n.round()).abs() < 1e-9 {
                write!(f, "{}{}", el, n.round() as i64)?;
            } else {
                let s = format!("{:.4}", n);
                let s = s.trim_end_matches('0').trim_end_matches('.');
                write!(f, "{}{}", el, s)?;
            }
        }
        Ok(())
    }
}

/// 展开一层括号 "(OH)2" -> "OHOH" 形式（按倍数重写数量）
fn expand_parentheses(s: &str, original: &str) -> Result<String> {
    if !s.contains('(') {
        if s.contains(')') {
            return Err(ChemlimError::InvalidFormula {
                formula: original.to_string(),
                reason: "unbalanced parentheses".to_string(),
            });
        }
        return Ok(s.to_string());
    }

    let group_re = Regex::new(r"\(([^()]+)\)(\d*\.?\d*)").unwrap();
    let mut out = String::new();
    let mut last = 0usize;

    for cap in group_re.captures_iter(s) {
        let whole = cap.get(0).unwrap();
        out.push_str(&s[last..whole.start()]);
        last = whole.end();

        let inner = cap.get(1).unwrap().as_str();
        let mult_str = cap.get(2).unwrap().as_str();
        let mult: f64 = if mult_str.is_empty() {
            1.0
        } else {
            mult_str
                .parse()
                .map_err(|_| ChemlimError::InvalidFormula {
                    formula: original.to_string(),
                    reason: format!("invalid group multiplier '{}'", mult_str),
                })?
        };

        // 组内各 token 的数量乘以倍数后展平
        let token_re = Regex::new(r"([A-Z][a-z]?)(\d*\.?\d*)").unwrap();
        for tcap in token_re.captures_iter(inner) {
            let symbol = tcap.get(1).unwrap().as_str();
            let n_str = tcap.get(2).unwrap().as_str();
            let n: f64 = if n_str.is_empty() {
                1.0
            } else {
                n_str.parse().unwrap_or(1.0)
            };
            let scaled = n * mult;
            if (scaled - scaled.round()).abs() < 1e-9 {
                out.push_str(&format!("{}{}", symbol, scaled.round() as i64));
            } else {
                out.push_str(&format!("{}{}", symbol, scaled));
            }
        }
    }
    out.push_str(&s[last..]);

    if out.contains('(') || out.contains(')') {
        return Err(ChemlimError::InvalidFormula {
            formula: original.to_string(),
            reason: "nested or unbalanced parentheses".to_string(),
        });
    }
    Ok(out)
}

/// 最大公约数
fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let c = Composition::parse("CdTe").unwrap();
        assert_eq!(c.amount("Cd"), 1.0);
        assert_eq!(c.amount("Te"), 1.0);
        assert_eq!(c.num_atoms(), 2.0);
    }

    #[test]
    fn test_parse_with_counts() {
        let c = Composition::parse("Li2ZrO3").unwrap();
        assert_eq!(c.amount("Li"), 2.0);
        assert_eq!(c.amount("Zr"), 1.0);
        assert_eq!(c.amount("O"), 3.0);
    }

    #[test]
    fn test_parse_fractional() {
        let c = Composition::parse("Na0.5Bi0.5TiO3").unwrap();
        assert!((c.amount("Na") - 0.5).abs() < 1e-9);
        assert!((c.amount("Bi") - 0.5).abs() < 1e-9);
        assert_eq!(c.amount("Ti"), 1.0);
    }

    #[test]
    fn test_parse_parentheses() {
        let c = Composition::parse("Ca(OH)2").unwrap();
        assert_eq!(c.amount("Ca"), 1.0);
        assert_eq!(c.amount("O"), 2.0);
        assert_eq!(c.amount("H"), 2.0);
    }

    #[test]
    fn test_parse_rejects_junk() {
        assert!(Composition::parse("CdTe!").is_err());
        assert!(Composition::parse("cdte").is_err());
        assert!(Composition::parse("").is_err());
        assert!(Composition::parse("Xx2O").is_err());
    }

    #[test]
    fn test_reduced_formula() {
        assert_eq!(Composition::parse("Cd2Te2").unwrap().reduced_formula(), "CdTe");
        assert_eq!(Composition::parse("Zr4O8").unwrap().reduced_formula(), "O2Zr");
        assert_eq!(Composition::parse("O2").unwrap().reduced_formula(), "O");
    }

    #[test]
    fn test_formula_units() {
        let c = Composition::parse("Cd4Te4").unwrap();
        assert!((c.formula_units() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_per_atom() {
        let c = Composition::parse("Li2O").unwrap().per_atom();
        assert!((c.amount("Li") - 2.0 / 3.0).abs() < 1e-9);
        assert!((c.amount("O") - 1.0 / 3.0).abs() < 1e-9);
        assert!((c.num_atoms() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_subset() {
        let host: Vec<String> = vec!["Cd".into(), "Te".into(), "Se".into()];
        assert!(Composition::parse("CdSe").unwrap().is_subset_of(&host));
        assert!(!Composition::parse("CdS").unwrap().is_subset_of(&host));
    }
}
