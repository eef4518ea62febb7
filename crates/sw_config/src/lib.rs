// crates/sw_config/src/lib.rs

//! SweepFoam Config Layer
//!
//! 配置层，定义一次雷诺数扫描的全部输入 [`SweepConfig`]。
//!
//! # 模块概览
//!
//! - [`sweep_config`]: `SweepConfig` 与 `ReynoldsRange`，JSON 读写与校验
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: sw_cli        ─> loads SweepConfig, runs SweepEngine
//! Layer 4: sw_workflow   ─> SweepEngine, Harvester, CommandRunner
//! Layer 3: sw_config     ─> SweepConfig (本层)
//! Layer 2: sw_case       ─> CaseModel, DictionaryEditor
//! Layer 1: sw_foundation ─> fs primitives
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod sweep_config;

/// 层级标识
pub const LAYER: u8 = 3;

// 重导出核心类型
pub use error::ConfigError;
pub use sweep_config::{ReynoldsRange, SweepConfig, KNOWN_RAS_MODELS};
