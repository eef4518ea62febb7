// crates/sw_workflow/src/results.rs

//! 结果树读取
//!
//! 供下游分析使用：列出结果树中同时具备力系数与残差文件的
//! `(tag, Re)`，并把归档文件解析为按列存储的数值表。

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::harvest::{FORCES_COLUMNS, RESIDUALS_COLUMNS};

/// 结果读取错误
#[derive(Debug, Error)]
pub enum ResultsError {
    /// IO 错误
    #[error("IO error on {path}: {source}")]
    Io {
        /// 出错路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 数据行格式错误
    #[error("{path}:{line}: {message}")]
    Parse {
        /// 文件
        path: PathBuf,
        /// 行号（从 1 开始）
        line: usize,
        /// 原因
        message: String,
    },
}

/// 结果树中的一条记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    /// 结果标签
    pub tag: String,
    /// 雷诺数
    pub re: u32,
    /// 力系数文件
    pub forces: PathBuf,
    /// 残差文件
    pub residuals: PathBuf,
}

/// 结果树
#[derive(Debug, Clone)]
pub struct ResultTree {
    root: PathBuf,
}

impl ResultTree {
    /// 以 `root`（通常为 `<case>/Results`）为根
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 列出所有完整的结果，按 (tag, Re) 排序
    pub fn scan(&self) -> Result<Vec<ResultEntry>, ResultsError> {
        let io = |path: &Path, source| ResultsError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut entries = Vec::new();
        for dir in std::fs::read_dir(&self.root).map_err(|e| io(&self.root, e))? {
            let dir = dir.map_err(|e| io(&self.root, e))?.path();
            let tag = match dir.file_name().and_then(|n| n.to_str()) {
                Some(name) if dir.is_dir() => match name.strip_prefix("forces_") {
                    Some(tag) => tag.to_string(),
                    None => continue,
                },
                _ => continue,
            };
            let residual_dir = self.root.join(format!("residuals_{}", tag));

            for file in std::fs::read_dir(&dir).map_err(|e| io(&dir, e))? {
                let forces = file.map_err(|e| io(&dir, e))?.path();
                let re = forces
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| n.strip_prefix("Re_"))
                    .and_then(|n| n.strip_suffix(".dat"))
                    .and_then(|n| n.parse::<u32>().ok());
                let Some(re) = re else { continue };

                let residuals = residual_dir.join(format!("Re_{}.dat", re));
                if residuals.is_file() {
                    entries.push(ResultEntry {
                        tag: tag.clone(),
                        re,
                        forces,
                        residuals,
                    });
                }
            }
        }

        entries.sort_by(|a, b| (&a.tag, a.re).cmp(&(&b.tag, b.re)));
        Ok(entries)
    }
}

/// 按列存储的结果表
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    columns: Vec<String>,
    data: Vec<Vec<f64>>,
}

impl ResultTable {
    /// 解析文本
    ///
    /// 以空白分隔，括号视为空白，`#` 开头的行忽略；无法解析的值
    /// （如 `N/A`）记为 NaN。每行的值个数必须等于列数。
    pub fn parse(text: &str, columns: &[&str], source: &Path) -> Result<Self, ResultsError> {
        let mut data = vec![Vec::new(); columns.len()];

        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cleaned = line.replace(['(', ')'], " ");
            let values: Vec<f64> = cleaned
                .split_whitespace()
                .map(|v| v.parse::<f64>().unwrap_or(f64::NAN))
                .collect();
            if values.len() != columns.len() {
                return Err(ResultsError::Parse {
                    path: source.to_path_buf(),
                    line: i + 1,
                    message: format!("expected {} values, found {}", columns.len(), values.len()),
                });
            }
            for (column, value) in data.iter_mut().zip(values) {
                column.push(value);
            }
        }

        Ok(Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            data,
        })
    }

    /// 读取文件
    pub fn load(path: impl AsRef<Path>, columns: &[&str]) -> Result<Self, ResultsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ResultsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, columns, path)
    }

    /// 读取力系数文件
    pub fn load_forces(path: impl AsRef<Path>) -> Result<Self, ResultsError> {
        Self::load(path, &FORCES_COLUMNS)
    }

    /// 读取残差文件
    pub fn load_residuals(path: impl AsRef<Path>) -> Result<Self, ResultsError> {
        Self::load(path, &RESIDUALS_COLUMNS)
    }

    /// 列名
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按名称取列
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(&self.data[index])
    }

    /// 某列最后一行的值（如收敛后的 Cd）
    pub fn final_value(&self, name: &str) -> Option<f64> {
        self.column(name)?.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forces() {
        let text = "1\t0.01\t1.20\t0.30\t0.16\t0.14\n2\t0.02\t1.10\t0.31\t0.17\t0.14\n";
        let table = ResultTable::parse(text, &FORCES_COLUMNS, Path::new("Re_100.dat")).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.column("Time"), Some(&[1.0, 2.0][..]));
        assert_eq!(table.final_value("Cd"), Some(1.10));
        assert_eq!(table.final_value("Cq"), None);
    }

    #[test]
    fn test_parse_residuals_with_vectors_and_na() {
        let text = "# Time U p\n1\t(1 1 1)\t1\n2\t(0.5 0.4 N/A)\t0.3\n";
        let table = ResultTable::parse(text, &RESIDUALS_COLUMNS, Path::new("r.dat")).unwrap();

        assert_eq!(table.final_value("p"), Some(0.3));
        assert!(table.final_value("Uz").unwrap().is_nan());
    }

    #[test]
    fn test_parse_rejects_short_rows() {
        let err = ResultTable::parse("1\t2\n", &FORCES_COLUMNS, Path::new("bad.dat")).unwrap_err();
        assert!(matches!(err, ResultsError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_scan_pairs_only() {
        let root = tempfile::tempdir().unwrap();
        let tag = "RAS_kEpsilon_turbmodel_10_meshpoints";
        let forces = root.path().join(format!("forces_{}", tag));
        let residuals = root.path().join(format!("residuals_{}", tag));
        std::fs::create_dir_all(&forces).unwrap();
        std::fs::create_dir_all(&residuals).unwrap();

        for re in [200, 100, 300] {
            std::fs::write(forces.join(format!("Re_{}.dat", re)), "").unwrap();
        }
        for re in [100, 200] {
            std::fs::write(residuals.join(format!("Re_{}.dat", re)), "").unwrap();
        }
        std::fs::write(forces.join("notes.txt"), "").unwrap();

        let entries = ResultTree::new(root.path()).scan().unwrap();
        let found: Vec<u32> = entries.iter().map(|e| e.re).collect();
        assert_eq!(found, vec![100, 200]);
        assert!(entries.iter().all(|e| e.tag == tag));
    }
}
