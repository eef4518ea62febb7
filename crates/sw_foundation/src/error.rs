// crates/sw_foundation/src/error.rs

//! 文件系统错误类型
//!
//! 所有变体都携带出错的路径或通配模式，便于上层定位失败的算例文件。

use std::path::{Path, PathBuf};
use thiserror::Error;

/// 文件系统操作结果
pub type FsResult<T> = Result<T, FsError>;

/// 文件系统错误
#[derive(Error, Debug)]
pub enum FsError {
    /// 通配模式语法错误
    #[error("Invalid glob pattern '{pattern}': {message}")]
    Pattern {
        /// 原始模式
        pattern: String,
        /// 解析器给出的原因
        message: String,
    },

    /// 通配模式没有匹配任何文件
    #[error("No file matches '{pattern}'")]
    NoMatch {
        /// 原始模式
        pattern: String,
    },

    /// 目标文件已存在（独占写入时）
    #[error("Refusing to overwrite existing file: {path}")]
    AlreadyExists {
        /// 已存在的路径
        path: PathBuf,
    },

    /// 底层 IO 错误
    #[error("IO error on {path}: {source}")]
    Io {
        /// 出错路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// 包装 IO 错误并附带路径
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// 是否为"目标已存在"错误
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// 是否为"无匹配"错误
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch { .. })
    }
}
