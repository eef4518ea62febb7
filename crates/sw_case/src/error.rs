// crates/sw_case/src/error.rs

//! 算例层错误类型

use std::path::{Path, PathBuf};
use sw_foundation::FsError;
use thiserror::Error;

/// 算例操作结果
pub type CaseResult<T> = Result<T, CaseError>;

/// 算例错误
#[derive(Debug, Error)]
pub enum CaseError {
    /// 字典中找不到目标行
    #[error("Key '{key}' not found in {file}")]
    KeyNotFound {
        /// 字典文件
        file: PathBuf,
        /// 查找的键（或块名）
        key: String,
    },

    /// 不支持的湍流类型
    #[error("Unsupported turbulence type '{value}' (expected 'laminar' or 'RAS')")]
    UnsupportedTurbulence {
        /// 输入值
        value: String,
    },

    /// 未知的湍流场
    #[error("Unknown turbulence field '{name}' (expected k, epsilon or omega)")]
    UnknownField {
        /// 输入的场名
        name: String,
    },

    /// 未知的分解方法
    #[error("Unknown decomposition method '{value}' (expected simple, scotch or hierarchical)")]
    UnknownMethod {
        /// 输入值
        value: String,
    },

    /// 分解系数与进程数不一致
    #[error("Decomposition coefficients {coeffs:?} do not multiply to {n_proc} subdomains")]
    InvalidDecomposition {
        /// 进程数
        n_proc: u32,
        /// 分解系数
        coeffs: [u32; 3],
    },

    /// 算例已被另一个扫描锁定
    #[error("Case is locked by {path} (holder pid: {holder})")]
    Locked {
        /// 锁文件
        path: PathBuf,
        /// 持有者进程号（无法读取时为 "unknown"）
        holder: String,
    },

    /// IO 错误
    #[error("IO error on {path}: {source}")]
    Io {
        /// 出错路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 文件系统原语错误
    #[error(transparent)]
    Fs(#[from] FsError),
}

impl CaseError {
    /// 包装 IO 错误
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// 键缺失
    pub fn key_not_found(file: impl AsRef<Path>, key: impl Into<String>) -> Self {
        Self::KeyNotFound {
            file: file.as_ref().to_path_buf(),
            key: key.into(),
        }
    }

    /// 是否为键缺失错误
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }
}
