// crates/sw_workflow/src/lib.rs

//! SweepFoam Workflow Layer
//!
//! 工作流层：雷诺数扫描的状态机、外部命令运行与结果归档。
//!
//! # 模块概览
//!
//! - [`flow`]: 由雷诺数推导入口速度与湍流量
//! - [`engine`]: `SweepEngine` 逐雷诺数执行 CLEAN → ... → HARVEST
//! - [`runner`]: `CommandRunner` 外部命令抽象与 `ShellRunner`
//! - [`harvest`]: 结果标签与 `Harvester`
//! - [`report`]: 扫描报告
//! - [`results`]: 结果树读取
//! - [`events`]: 扫描事件系统
//! - [`stage`] / [`error`]: 阶段、终止状态与带标签的扫描错误
//!
//! # 示例
//!
//! ```rust,ignore
//! use sw_config::SweepConfig;
//! use sw_workflow::{LoggingListener, ShellRunner, SweepEngine};
//! use std::sync::Arc;
//!
//! let config = SweepConfig::from_file("sweep.json")?;
//! let engine = SweepEngine::new(config.clone(), ShellRunner::from_config(&config));
//! engine.events().add_listener(Arc::new(LoggingListener::new()));
//!
//! let report = engine.run();
//! std::process::exit(report.exit_code());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod events;
pub mod flow;
pub mod harvest;
pub mod report;
pub mod results;
pub mod runner;
pub mod stage;

/// 层级标识
pub const LAYER: u8 = 4;

// 重导出核心类型
pub use engine::SweepEngine;
pub use error::{ErrorKind, Recovery, SweepError, SweepResult};
pub use events::{EventDispatcher, EventListener, FnListener, LoggingListener, SweepEvent};
pub use flow::DerivedFlow;
pub use harvest::{Harvester, ResultArtifact, ResultTag};
pub use report::{ReRecord, SweepId, SweepReport};
pub use results::{ResultEntry, ResultTable, ResultTree, ResultsError};
pub use runner::{CommandRunner, RunnerError, ShellRunner};
pub use stage::{ReOutcome, Stage};
