//! # 计算目录收集器
//!
//! 扫描根目录，收集匹配模式的竞争相计算目录（默认 `*_EaH_*`）。
//!
//! ## 功能
//! - glob 模式匹配目录名
//! - 可选递归搜索
//!
//! ## 依赖关系
//! - 被 `commands/parse.rs` 调用
//! - 使用 `walkdir` 遍历目录
//! - 使用 `glob` 编译匹配模式

use crate::error::{ChemlimError, Result};
use glob::Pattern;
use std::path::PathBuf;
use walkdir::WalkDir;

/// 计算目录收集器
pub struct CalcDirCollector {
    /// 根目录
    root: PathBuf,
    /// 匹配模式列表
    patterns: Vec<Pattern>,
    /// 是否递归
    recursive: bool,
}

impl CalcDirCollector {
    /// 创建新的收集器（默认模式 `*_EaH_*`）
    pub fn new(root: PathBuf) -> Result<Self> {
        let mut collector = CalcDirCollector {
            root,
            patterns: Vec::new(),
            recursive: false,
        };
        collector.set_patterns("*_EaH_*")?;
        Ok(collector)
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.set_patterns(pattern)?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    fn set_patterns(&mut self, pattern: &str) -> Result<()> {
        let patterns: Vec<Pattern> = pattern
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                Pattern::new(s).map_err(|e| {
                    ChemlimError::InvalidArgument(format!("invalid pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<_>>()?;

        if patterns.is_empty() {
            return Err(ChemlimError::InvalidArgument(format!(
                "empty pattern: '{}'",
                pattern
            )));
        }
        self.patterns = patterns;
        Ok(())
    }

    /// 收集所有匹配的计算目录
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(ChemlimError::DirectoryNotFound {
                path: self.root.display().to_string(),
            });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut dirs: Vec<PathBuf> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .map(|name| self.patterns.iter().any(|p| p.matches(name)))
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();

        dirs.sort();
        Ok(dirs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_calc_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("CdTe_EaH_0")).unwrap();
        fs::create_dir(dir.path().join("Te_EaH_0.009")).unwrap();
        fs::create_dir(dir.path().join("not_a_calc")).unwrap();
        fs::write(dir.path().join("CdTe_EaH_5"), "a file, not a dir").unwrap();

        let collector = CalcDirCollector::new(dir.path().to_path_buf()).unwrap();
        let dirs = collector.collect().unwrap();
        assert_eq!(dirs.len(), 2);
        assert!(dirs[0].ends_with("CdTe_EaH_0"));
        assert!(dirs[1].ends_with("Te_EaH_0.009"));
    }

    #[test]
    fn test_recursive_collect() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("batch1/CdTe_EaH_0")).unwrap();

        let flat = CalcDirCollector::new(dir.path().to_path_buf()).unwrap();
        assert!(flat.collect().unwrap().is_empty());

        let recursive = CalcDirCollector::new(dir.path().to_path_buf())
            .unwrap()
            .recursive(true);
        assert_eq!(recursive.collect().unwrap().len(), 1);
    }

    #[test]
    fn test_custom_pattern() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("phase_Cd")).unwrap();
        fs::create_dir(dir.path().join("phase_Te")).unwrap();

        let collector = CalcDirCollector::new(dir.path().to_path_buf())
            .unwrap()
            .with_pattern("phase_*")
            .unwrap();
        assert_eq!(collector.collect().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = CalcDirCollector::new(dir.path().to_path_buf())
            .unwrap()
            .with_pattern("[");
        assert!(result.is_err());
    }
}
