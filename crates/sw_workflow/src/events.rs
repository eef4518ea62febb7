// crates/sw_workflow/src/events.rs

//! 扫描事件
//!
//! 引擎在每个阶段开始与结束时发出 [`SweepEvent`]，由 [`EventDispatcher`]
//! 分发给已注册的监听器。[`LoggingListener`] 输出单行阶段进度。

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::Recovery;
use crate::report::SweepId;
use crate::stage::{ReOutcome, Stage};

/// 扫描事件
#[derive(Debug, Clone)]
pub enum SweepEvent {
    /// 扫描开始
    SweepStarted {
        /// 扫描ID
        sweep_id: SweepId,
        /// 结果标签
        tag: String,
        /// 雷诺数序列
        reynolds: Vec<u32>,
    },
    /// 阶段开始
    StageStarted {
        /// 雷诺数
        re: u32,
        /// 阶段
        stage: Stage,
    },
    /// 阶段成功结束
    StageFinished {
        /// 雷诺数
        re: u32,
        /// 阶段
        stage: Stage,
    },
    /// 阶段出错
    StageFailed {
        /// 雷诺数
        re: u32,
        /// 阶段
        stage: Stage,
        /// 错误信息
        error: String,
        /// 处理方式
        recovery: Recovery,
    },
    /// 单个雷诺数结束
    ReFinished {
        /// 雷诺数
        re: u32,
        /// 终止状态
        outcome: ReOutcome,
    },
    /// 扫描结束
    SweepFinished {
        /// 扫描ID
        sweep_id: SweepId,
        /// 未到达 DONE 的雷诺数个数
        failed: usize,
        /// 运行时长 (秒)
        duration_secs: f64,
    },
}

impl SweepEvent {
    /// 事件对应的雷诺数
    pub fn re(&self) -> Option<u32> {
        match self {
            Self::StageStarted { re, .. }
            | Self::StageFinished { re, .. }
            | Self::StageFailed { re, .. }
            | Self::ReFinished { re, .. } => Some(*re),
            Self::SweepStarted { .. } | Self::SweepFinished { .. } => None,
        }
    }

    /// 事件名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::SweepStarted { .. } => "SweepStarted",
            Self::StageStarted { .. } => "StageStarted",
            Self::StageFinished { .. } => "StageFinished",
            Self::StageFailed { .. } => "StageFailed",
            Self::ReFinished { .. } => "ReFinished",
            Self::SweepFinished { .. } => "SweepFinished",
        }
    }
}

/// 事件监听器trait
pub trait EventListener: Send + Sync {
    /// 处理事件
    fn on_event(&self, event: &SweepEvent);

    /// 获取监听器名称 (用于调试)
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// 函数式事件监听器
pub struct FnListener<F>
where
    F: Fn(&SweepEvent) + Send + Sync,
{
    name: String,
    handler: F,
}

impl<F> FnListener<F>
where
    F: Fn(&SweepEvent) + Send + Sync,
{
    /// 创建函数式监听器
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> EventListener for FnListener<F>
where
    F: Fn(&SweepEvent) + Send + Sync,
{
    fn on_event(&self, event: &SweepEvent) {
        (self.handler)(event);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 日志事件监听器
#[derive(Debug, Default)]
pub struct LoggingListener {
    verbose: bool,
}

impl LoggingListener {
    /// 创建日志监听器
    pub fn new() -> Self {
        Self::default()
    }

    /// 同时记录阶段结束事件
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl EventListener for LoggingListener {
    fn on_event(&self, event: &SweepEvent) {
        match event {
            SweepEvent::SweepStarted {
                sweep_id,
                tag,
                reynolds,
            } => {
                info!("Sweep {} ({}) over Re {:?}", sweep_id, tag, reynolds);
            }
            SweepEvent::StageStarted { re, stage } => {
                info!("Re {}: {}", re, stage.description());
            }
            SweepEvent::StageFinished { re, stage } if self.verbose => {
                info!("Re {}: {} done", re, stage);
            }
            SweepEvent::StageFailed {
                error: message,
                recovery,
                ..
            } => match recovery {
                Recovery::Abort => error!("{}", message),
                Recovery::SkipHarvest | Recovery::Continue => warn!("{}", message),
            },
            SweepEvent::ReFinished { re, outcome } => {
                info!("Re {}: {}", re, outcome);
            }
            SweepEvent::SweepFinished {
                sweep_id,
                failed,
                duration_secs,
            } => {
                info!(
                    "Sweep {} finished in {:.1}s, {} Re value(s) not done",
                    sweep_id, duration_secs, failed
                );
            }
            _ => {}
        }
    }

    fn name(&self) -> &str {
        "LoggingListener"
    }
}

/// 事件分发器
#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
}

impl EventDispatcher {
    /// 创建新的事件分发器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加监听器
    pub fn add_listener(&self, listener: Arc<dyn EventListener>) {
        let name = listener.name().to_string();
        self.listeners.write().push(listener);
        tracing::debug!("Added event listener: {}", name);
    }

    /// 添加函数式监听器
    pub fn add_fn_listener<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&SweepEvent) + Send + Sync + 'static,
    {
        self.add_listener(Arc::new(FnListener::new(name, handler)));
    }

    /// 清除所有监听器
    pub fn clear(&self) {
        self.listeners.write().clear();
    }

    /// 分发事件
    pub fn emit(&self, event: SweepEvent) {
        let listeners = self.listeners.read();
        tracing::trace!("Emitting event: {}", event.name());
        for listener in listeners.iter() {
            listener.on_event(&event);
        }
    }

    /// 获取监听器数量
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}
