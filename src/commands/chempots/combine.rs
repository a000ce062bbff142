//! # chempots combine 子命令实现
//!
//! 合并本征（仅宿主）与掺杂（宿主 + 掺杂元素）两套化学势极限：
//! 共享元素的 Δμ 在容差内配对，配对极限中掺杂元素的 Δμ 并入本征极限。
//!
//! ## 依赖关系
//! - 使用 `cli/chempots.rs` 定义的参数
//! - 使用 `models/chempots.rs`
//! - 使用 `utils/output.rs`

use crate::cli::chempots::CombineArgs;
use crate::error::{ChemlimError, Result};
use crate::models::{ChempotLimits, LimitMu};
use crate::utils::output;

use std::collections::BTreeMap;

/// 极限配对容差：共享元素 Δμ 的平均绝对偏差 (eV)
const MATCH_TOL: f64 = 0.05;

/// 执行 combine 子命令
pub fn execute(args: CombineArgs) -> Result<()> {
    output::print_header("Combining Chemical Potential Limits");

    let intrinsic = ChempotLimits::from_json_file(&args.intrinsic)?;
    let extrinsic = ChempotLimits::from_json_file(&args.extrinsic)?;

    let combined = combine_extrinsic(&intrinsic, &extrinsic, &args.species)?;
    combined.to_json_file(&args.output)?;

    output::print_info(&format!(
        "Merged {} limits with dopant {}",
        combined.num_limits(),
        args.species
    ));
    output::print_success(&format!(
        "Combined limits saved to '{}'",
        args.output.display()
    ));

    Ok(())
}

/// 合并本征与掺杂极限集合
pub fn combine_extrinsic(
    intrinsic: &ChempotLimits,
    extrinsic: &ChempotLimits,
    species: &str,
) -> Result<ChempotLimits> {
    let host_elements = intrinsic.elements();

    if host_elements.iter().any(|el| el == species) {
        return Err(ChemlimError::InvalidArgument(format!(
            "dopant {} is already an intrinsic element",
            species
        )));
    }
    if !extrinsic.elemental_refs.contains_key(species) {
        return Err(ChemlimError::InvalidArgument(format!(
            "extrinsic limits do not contain dopant {}",
            species
        )));
    }
    for el in &host_elements {
        if !extrinsic.elemental_refs.contains_key(el) {
            return Err(ChemlimError::InvalidArgument(format!(
                "extrinsic limits are missing host element {}",
                el
            )));
        }
    }

    let mut relative: BTreeMap<String, LimitMu> = BTreeMap::new();

    for (name, mu) in &intrinsic.limits_wrt_elemental_refs {
        // 共享元素 Δμ 偏差最小的掺杂极限
        let best = extrinsic
            .limits_wrt_elemental_refs
            .iter()
            .map(|(ext_name, ext_mu)| {
                let mad: f64 = host_elements
                    .iter()
                    .map(|el| {
                        (mu.get(el).copied().unwrap_or(0.0)
                            - ext_mu.get(el).copied().unwrap_or(0.0))
                        .abs()
                    })
                    .sum::<f64>()
                    / host_elements.len() as f64;
                (ext_name, ext_mu, mad)
            })
            .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

        let (_, ext_mu, mad) = best.ok_or_else(|| {
            ChemlimError::Other("extrinsic limits set is empty".to_string())
        })?;

        if mad > MATCH_TOL {
            return Err(ChemlimError::Other(format!(
                "no extrinsic limit matches intrinsic limit '{}' \
                 (best mean deviation {:.4} eV exceeds {:.2} eV)",
                name, mad, MATCH_TOL
            )));
        }

        let mut merged = mu.clone();
        merged.insert(species.to_string(), ext_mu[species]);
        relative.insert(name.clone(), merged);
    }

    let mut refs = intrinsic.elemental_refs.clone();
    refs.insert(species.to_string(), extrinsic.elemental_refs[species]);

    Ok(ChempotLimits::from_relative(refs, relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(entries: &[(&str, &[(&str, f64)])], refs: &[(&str, f64)]) -> ChempotLimits {
        let relative: BTreeMap<String, LimitMu> = entries
            .iter()
            .map(|(name, mus)| {
                (
                    name.to_string(),
                    mus.iter()
                        .map(|(el, v)| (el.to_string(), *v))
                        .collect::<LimitMu>(),
                )
            })
            .collect();
        let refs: BTreeMap<String, f64> =
            refs.iter().map(|(el, v)| (el.to_string(), *v)).collect();
        ChempotLimits::from_relative(refs, relative)
    }

    fn intrinsic_sample() -> ChempotLimits {
        limits(
            &[
                ("Cd", &[("Cd", 0.0), ("Te", -1.25)]),
                ("Te", &[("Cd", -1.25), ("Te", 0.0)]),
            ],
            &[("Cd", -0.9), ("Te", -3.1)],
        )
    }

    fn extrinsic_sample() -> ChempotLimits {
        limits(
            &[
                ("Cd-CdF2", &[("Cd", 0.0), ("Te", -1.25), ("F", -2.0)]),
                ("Te-CdF2", &[("Cd", -1.26), ("Te", 0.0), ("F", -1.4)]),
            ],
            &[("Cd", -0.9), ("Te", -3.1), ("F", -1.8)],
        )
    }

    #[test]
    fn test_combine_merges_dopant_mu() {
        let combined =
            combine_extrinsic(&intrinsic_sample(), &extrinsic_sample(), "F").unwrap();

        assert_eq!(combined.num_limits(), 2);
        let cd_rich = &combined.limits_wrt_elemental_refs["Cd"];
        assert!((cd_rich["F"] - (-2.0)).abs() < 1e-9);
        let te_rich = &combined.limits_wrt_elemental_refs["Te"];
        assert!((te_rich["F"] - (-1.4)).abs() < 1e-9);

        // 参考能量并入掺杂元素
        assert!((combined.elemental_refs["F"] - (-1.8)).abs() < 1e-9);
        // 绝对值 = 参考 + Δμ
        assert!((combined.limits["Cd"]["F"] - (-3.8)).abs() < 1e-9);
    }

    #[test]
    fn test_combine_rejects_mismatched_sets() {
        let far_extrinsic = limits(
            &[("Cd-CdF2", &[("Cd", -0.5), ("Te", -0.75), ("F", -2.0)])],
            &[("Cd", -0.9), ("Te", -3.1), ("F", -1.8)],
        );
        let result = combine_extrinsic(&intrinsic_sample(), &far_extrinsic, "F");
        assert!(result.is_err());
    }

    #[test]
    fn test_combine_rejects_missing_dopant() {
        let result = combine_extrinsic(&intrinsic_sample(), &intrinsic_sample(), "F");
        assert!(matches!(result, Err(ChemlimError::InvalidArgument(_))));
    }

    #[test]
    fn test_combine_rejects_intrinsic_dopant() {
        let result = combine_extrinsic(&intrinsic_sample(), &extrinsic_sample(), "Cd");
        assert!(matches!(result, Err(ChemlimError::InvalidArgument(_))));
    }
}
