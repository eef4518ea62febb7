// crates/sw_case/src/lib.rs

//! SweepFoam Case Layer
//!
//! 算例层：对求解器算例目录的按行编辑与带类型的设置器。
//!
//! # 模块概览
//!
//! - [`dictionary`]: 按键定位的行替换 / 删除，以及块内条目编辑
//! - [`solution`]: 时间目录视图与初始场边界改写
//! - [`case`]: `CaseModel` 带类型设置器（湍流模式、分解、入口速度、湍流边界、magUInf）
//! - [`store`]: 磁盘与内存两种算例存储后端
//! - [`lock`]: 算例独占锁
//! - [`types`]: 湍流类型、分解方法、湍流场枚举
//!
//! # 设计原则
//!
//! 1. **不解析整个字典**: 只改命中的行，其余字节保持不变
//! 2. **可替换存储**: 所有改写都经过 `CaseStore`，测试可以使用内存算例树
//! 3. **幂等**: 同一设置重复执行得到相同文件

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod case;
pub mod dictionary;
pub mod error;
pub mod lock;
pub mod solution;
pub mod store;
pub mod types;

/// 层级标识
pub const LAYER: u8 = 2;

// 重导出核心类型
pub use case::{CaseModel, CONTROL_DICT, DECOMPOSE_PAR_DICT, TURBULENCE_PROPERTIES};
pub use dictionary::DictionaryEditor;
pub use error::{CaseError, CaseResult};
pub use lock::CaseLock;
pub use solution::{format_scalar, SolutionDirectory, SolutionFile, REMOVED_MARKER};
pub use store::{CaseStore, FileCase, MemoryCase};
pub use types::{DecompositionMethod, TurbulenceField, TurbulenceType};
