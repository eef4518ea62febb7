// crates/sw_workflow/src/stage.rs

//! 扫描阶段与终止状态
//!
//! 每个雷诺数严格按 [`Stage::PIPELINE`] 顺序执行。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 扫描阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// 扫描前准备（校验配置、加锁、湍流模式）
    Setup,
    /// 清理上一次运行的产物
    Clean,
    /// 写入入口条件与分解参数
    Configure,
    /// decomposePar
    Decompose,
    /// renumberMesh
    Renumber,
    /// 求解
    Solve,
    /// reconstructPar
    Reconstruct,
    /// 结果归档
    Harvest,
}

impl Stage {
    /// 单个雷诺数的阶段顺序
    pub const PIPELINE: [Stage; 7] = [
        Stage::Clean,
        Stage::Configure,
        Stage::Decompose,
        Stage::Renumber,
        Stage::Solve,
        Stage::Reconstruct,
        Stage::Harvest,
    ];

    /// 阶段名
    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup => "SETUP",
            Self::Clean => "CLEAN",
            Self::Configure => "CONFIGURE",
            Self::Decompose => "DECOMPOSE",
            Self::Renumber => "RENUMBER",
            Self::Solve => "SOLVE",
            Self::Reconstruct => "RECONSTRUCT",
            Self::Harvest => "HARVEST",
        }
    }

    /// 进度提示
    pub fn description(&self) -> &'static str {
        match self {
            Self::Setup => "Prepare case.",
            Self::Clean => "Remove folders from previous run.",
            Self::Configure => "Set inlet velocity, magUInf, turbulence boundaries and decomposition.",
            Self::Decompose => "Decompose case.",
            Self::Renumber => "Renumber mesh for speedup.",
            Self::Solve => "Run solver in parallel.",
            Self::Reconstruct => "Reconstruct case.",
            Self::Harvest => "Copy results into results folder.",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 单个雷诺数的终止状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReOutcome {
    /// 尚未执行（扫描提前终止）
    NotAttempted,
    /// 全部完成并已归档
    Done,
    /// 跳过归档，扫描继续
    SkipHarvest,
    /// 致命错误，扫描终止
    Fatal,
}

impl ReOutcome {
    /// 是否到达 DONE
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for ReOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotAttempted => "NOT_ATTEMPTED",
            Self::Done => "DONE",
            Self::SkipHarvest => "SKIP_HARVEST",
            Self::Fatal => "FATAL",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_order() {
        assert_eq!(Stage::PIPELINE.first(), Some(&Stage::Clean));
        assert_eq!(Stage::PIPELINE.last(), Some(&Stage::Harvest));
        assert!(!Stage::PIPELINE.contains(&Stage::Setup));
    }

    #[test]
    fn test_outcome() {
        assert!(ReOutcome::Done.is_done());
        assert!(!ReOutcome::SkipHarvest.is_done());
        assert_eq!(ReOutcome::SkipHarvest.to_string(), "SKIP_HARVEST");
    }
}
