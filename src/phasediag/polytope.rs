//! # 化学势多面体顶点枚举
//!
//! 宿主稳定区域是化学势空间中由竞争相约束围成的凸多面体，
//! 其顶点即化学势极限。枚举所有 (n-1) 个不等式约束与宿主等式
//! 联立的 n×n 线性方程组，保留可行解并去重。
//!
//! ## 依赖关系
//! - 被 `phasediag/hull.rs`, `commands/chempots/` 使用
//! - 使用 `nalgebra` 求解线性方程组

use nalgebra::{DMatrix, DVector};

/// 可行性容差 (eV)
pub const FEAS_TOL: f64 = 1e-6;

/// 约束活跃判定容差 (eV)
pub const ACTIVE_TOL: f64 = 1e-5;

/// 顶点去重容差 (eV)
const DEDUP_TOL: f64 = 1e-6;

/// 线性不等式约束: Σ coeffs[i]·μ_i ≤ bound
#[derive(Debug, Clone)]
pub struct Constraint {
    pub coeffs: Vec<f64>,
    pub bound: f64,
    pub label: String,
}

impl Constraint {
    pub fn new(coeffs: Vec<f64>, bound: f64, label: impl Into<String>) -> Self {
        Constraint {
            coeffs,
            bound,
            label: label.into(),
        }
    }

    /// 约束左端在 μ 处的取值
    fn eval(&self, mu: &[f64]) -> f64 {
        self.coeffs.iter().zip(mu.iter()).map(|(c, m)| c * m).sum()
    }

    /// μ 是否满足约束
    fn satisfied(&self, mu: &[f64]) -> bool {
        self.eval(mu) <= self.bound + FEAS_TOL
    }

    /// 约束在 μ 处是否活跃（取等）
    fn is_active(&self, mu: &[f64]) -> bool {
        (self.eval(mu) - self.bound).abs() < ACTIVE_TOL
    }
}

/// 多面体顶点
#[derive(Debug, Clone)]
pub struct Vertex {
    /// 化学势坐标（与元素列表同序）
    pub mu: Vec<f64>,

    /// 活跃约束标签（字典序）
    pub active: Vec<String>,
}

impl Vertex {
    /// 顶点名：活跃约束标签以 '-' 连接
    pub fn name(&self) -> String {
        if self.active.is_empty() {
            "limit".to_string()
        } else {
            self.active.join("-")
        }
    }
}

/// 枚举多面体顶点
///
/// `equality` 给定时，每个顶点由等式加 n-1 个活跃不等式确定；
/// 否则由 n 个活跃不等式确定（凸包对偶问题使用）。
pub fn enumerate_vertices(
    equality: Option<(&[f64], f64)>,
    constraints: &[Constraint],
    n: usize,
) -> Vec<Vertex> {
    let k = if equality.is_some() { n - 1 } else { n };
    if constraints.len() < k || n == 0 {
        return Vec::new();
    }

    let mut vertices: Vec<Vertex> = Vec::new();
    let mut seen: Vec<Vec<f64>> = Vec::new();

    for combo in combinations(constraints.len(), k) {
        // 组装 n×n 线性方程组
        let mut rows: Vec<f64> = Vec::with_capacity(n * n);
        let mut rhs: Vec<f64> = Vec::with_capacity(n);

        if let Some((eq_coeffs, eq_bound)) = equality {
            rows.extend_from_slice(eq_coeffs);
            rhs.push(eq_bound);
        }
        for &idx in &combo {
            rows.extend_from_slice(&constraints[idx].coeffs);
            rhs.push(constraints[idx].bound);
        }

        let a = DMatrix::from_row_slice(n, n, &rows);
        let b = DVector::from_vec(rhs.clone());

        let solution = match a.clone().lu().solve(&b) {
            Some(x) => x,
            None => continue,
        };

        // LU 对病态矩阵可能返回低精度解，残差校验
        let residual = (&a * &solution - &b).norm();
        if residual > 1e-6 {
            continue;
        }

        let mu: Vec<f64> = solution.iter().copied().collect();
        if mu.iter().any(|v| !v.is_finite()) {
            continue;
        }

        if !constraints.iter().all(|c| c.satisfied(&mu)) {
            continue;
        }

        if seen
            .iter()
            .any(|s| s.iter().zip(mu.iter()).all(|(a, b)| (a - b).abs() < DEDUP_TOL))
        {
            continue;
        }

        // 活跃集按全部约束重算，退化顶点也能拿到完整标签
        let mut active: Vec<String> = constraints
            .iter()
            .filter(|c| c.is_active(&mu))
            .map(|c| c.label.clone())
            .collect();
        active.sort();
        active.dedup();

        seen.push(mu.clone());
        vertices.push(Vertex { mu, active });
    }

    vertices
}

/// k 元组合枚举 (0..m 中取 k 个下标)
fn combinations(m: usize, k: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    let mut current = Vec::with_capacity(k);
    fill_combinations(m, k, 0, &mut current, &mut result);
    result
}

fn fill_combinations(
    m: usize,
    k: usize,
    start: usize,
    current: &mut Vec<usize>,
    result: &mut Vec<Vec<usize>>,
) {
    if current.len() == k {
        result.push(current.clone());
        return;
    }
    let remaining = k - current.len();
    if remaining > m - start {
        return;
    }
    for i in start..=(m - remaining) {
        current.push(i);
        fill_combinations(m, k, i + 1, current, result);
        current.pop();
    }
}
