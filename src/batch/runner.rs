//! # 批量执行器
//!
//! 并行解析批量计算目录并收集结果。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代
//! - 进度条显示
//! - 按条目返回结果，错误汇总报告
//!
//! ## 依赖关系
//! - 被 `commands/parse.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::utils::progress;

use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// 单个目录的处理结果
#[derive(Debug)]
pub struct ItemOutcome<T> {
    /// 处理的目录
    pub path: PathBuf,
    /// 结果或错误信息
    pub result: std::result::Result<T, String>,
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// 成功数量
    pub success: usize,
    /// 失败数量
    pub failed: usize,
    /// 失败详情 (目录, 错误信息)
    pub failures: Vec<(String, String)>,
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器（0 = 自动检测核心数）
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    /// 并行处理目录列表，按输入顺序返回各目录结果
    pub fn run<T, F>(&self, dirs: Vec<PathBuf>, processor: F) -> (Vec<ItemOutcome<T>>, BatchSummary)
    where
        T: Send,
        F: Fn(&Path) -> std::result::Result<T, String> + Sync + Send,
    {
        let pb = progress::create_progress_bar(dirs.len() as u64, "Parsing");

        // 配置 rayon 线程池
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .unwrap();

        let outcomes: Vec<ItemOutcome<T>> = pool.install(|| {
            dirs.par_iter()
                .map(|dir| {
                    let result = processor(dir);
                    pb.inc(1);
                    ItemOutcome {
                        path: dir.clone(),
                        result,
                    }
                })
                .collect()
        });

        pb.finish_and_clear();

        let mut summary = BatchSummary::default();
        for outcome in &outcomes {
            match &outcome.result {
                Ok(_) => summary.success += 1,
                Err(msg) => {
                    summary.failed += 1;
                    summary
                        .failures
                        .push((outcome.path.display().to_string(), msg.clone()));
                }
            }
        }

        (outcomes, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_collects_results_in_order() {
        let dirs: Vec<PathBuf> = (0..8).map(|i| PathBuf::from(format!("dir{}", i))).collect();
        let runner = BatchRunner::new(2);

        let (outcomes, summary) = runner.run(dirs, |dir| {
            let name = dir.display().to_string();
            if name.ends_with('3') {
                Err("boom".to_string())
            } else {
                Ok(name)
            }
        });

        assert_eq!(outcomes.len(), 8);
        assert_eq!(summary.success, 7);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].0, "dir3");
        // par_iter 保序
        assert_eq!(outcomes[5].result.as_deref().unwrap(), "dir5");
    }
}
