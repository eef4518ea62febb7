// crates/sw_foundation/src/lib.rs

//! SweepFoam Foundation Layer
//!
//! 基础层，提供算例目录操作所需的文件系统原语。
//!
//! # 模块概览
//!
//! - [`fs`]: 目录创建、通配删除、带表头剥离的文件复制、整文件原子重写
//! - [`error`]: 文件系统错误类型
//!
//! # 设计原则
//!
//! 1. **作用域明确**: 所有通配模式都由调用方拼接到算例根目录下
//! 2. **确定性**: 通配展开结果按字典序排序
//! 3. **宽容删除**: 删除不存在的目标不是错误
//!
//! # 示例
//!
//! ```no_run
//! use sw_foundation::fs::{case_pattern, copy_files, rm_folder};
//! use std::path::Path;
//!
//! let case = Path::new("pipe_case");
//! rm_folder(&case_pattern(case, "processor*"))?;
//! copy_files(&case_pattern(case, "postProcessing/forces/**/*.dat"), case.join("forces.dat"), 9)?;
//! # Ok::<(), sw_foundation::FsError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod fs;

/// 层级标识
pub const LAYER: u8 = 1;

// 重导出常用类型
pub use error::{FsError, FsResult};
