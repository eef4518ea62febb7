// crates/sw_workflow/src/error.rs

//! 扫描错误
//!
//! [`SweepError`] 的每个变体都带有出错的雷诺数与阶段。引擎只在一处
//! 通过 [`SweepError::recovery`] 决定继续、跳过归档还是终止扫描。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sw_case::CaseError;
use sw_config::ConfigError;
use sw_foundation::FsError;
use thiserror::Error;

use crate::runner::RunnerError;
use crate::stage::Stage;

/// 扫描操作结果
pub type SweepResult<T> = Result<T, SweepError>;

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 字典中找不到目标行
    KeyNotFound,
    /// 不支持的湍流类型
    UnsupportedTurbulence,
    /// decomposePar 失败
    DecomposeFailed,
    /// renumberMesh 非零退出
    RenumberFailed,
    /// 求解器非零退出
    SolveNonzero,
    /// reconstructPar 失败
    ReconstructFailed,
    /// 结果文件已存在
    ArtifactExists,
    /// 文件系统错误
    Filesystem,
    /// 配置错误
    Config,
    /// 外部命令无法启动
    Runner,
    /// 算例被锁定
    Lock,
}

/// 出错后的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    /// 记录后进入下一阶段
    Continue,
    /// 当前雷诺数以 SKIP_HARVEST 结束，扫描继续
    SkipHarvest,
    /// 终止整个扫描
    Abort,
}

/// 扫描错误
#[derive(Debug, Error)]
pub enum SweepError {
    /// 配置无效
    #[error("Invalid sweep configuration: {0}")]
    Config(#[from] ConfigError),

    /// 无法获取算例锁
    #[error("Cannot lock case: {0}")]
    Lock(#[source] CaseError),

    /// 扫描前的算例准备失败
    #[error("[SETUP] {0}")]
    Setup(#[source] CaseError),

    /// 算例编辑失败
    #[error("Re {re} [{stage}]: {source}")]
    Case {
        /// 雷诺数
        re: u32,
        /// 阶段
        stage: Stage,
        /// 底层错误
        #[source]
        source: CaseError,
    },

    /// decomposePar 非零退出
    #[error("Re {re} [DECOMPOSE]: decomposePar exited with code {code}")]
    DecomposeFailed {
        /// 雷诺数
        re: u32,
        /// 退出码
        code: i32,
    },

    /// renumberMesh 非零退出
    #[error("Re {re} [RENUMBER]: renumberMesh exited with code {code}")]
    RenumberFailed {
        /// 雷诺数
        re: u32,
        /// 退出码
        code: i32,
    },

    /// 求解器非零退出
    #[error("Re {re} [SOLVE]: solver exited with code {code}")]
    SolveNonzero {
        /// 雷诺数
        re: u32,
        /// 退出码
        code: i32,
    },

    /// reconstructPar 非零退出
    #[error("Re {re} [RECONSTRUCT]: reconstructPar exited with code {code}")]
    ReconstructFailed {
        /// 雷诺数
        re: u32,
        /// 退出码
        code: i32,
    },

    /// 结果文件已存在
    #[error("Re {re} [HARVEST]: result already exists at {path}")]
    ArtifactExists {
        /// 雷诺数
        re: u32,
        /// 已存在的文件
        path: PathBuf,
    },

    /// 文件系统错误
    #[error("Re {re} [{stage}]: {source}")]
    Filesystem {
        /// 雷诺数
        re: u32,
        /// 阶段
        stage: Stage,
        /// 底层错误
        #[source]
        source: FsError,
    },

    /// 外部命令无法启动
    #[error("Re {re} [{stage}]: {source}")]
    Runner {
        /// 雷诺数
        re: u32,
        /// 阶段
        stage: Stage,
        /// 底层错误
        #[source]
        source: RunnerError,
    },
}

fn case_kind(error: &CaseError) -> ErrorKind {
    match error {
        CaseError::KeyNotFound { .. } => ErrorKind::KeyNotFound,
        CaseError::UnsupportedTurbulence { .. } => ErrorKind::UnsupportedTurbulence,
        CaseError::UnknownField { .. }
        | CaseError::UnknownMethod { .. }
        | CaseError::InvalidDecomposition { .. } => ErrorKind::Config,
        CaseError::Locked { .. } => ErrorKind::Lock,
        CaseError::Io { .. } | CaseError::Fs(_) => ErrorKind::Filesystem,
    }
}

impl SweepError {
    /// 错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(ConfigError::UnsupportedTurbulence { .. }) => {
                ErrorKind::UnsupportedTurbulence
            }
            Self::Config(_) => ErrorKind::Config,
            Self::Lock(_) => ErrorKind::Lock,
            Self::Setup(source) | Self::Case { source, .. } => case_kind(source),
            Self::DecomposeFailed { .. } => ErrorKind::DecomposeFailed,
            Self::RenumberFailed { .. } => ErrorKind::RenumberFailed,
            Self::SolveNonzero { .. } => ErrorKind::SolveNonzero,
            Self::ReconstructFailed { .. } => ErrorKind::ReconstructFailed,
            Self::ArtifactExists { .. } => ErrorKind::ArtifactExists,
            Self::Filesystem { .. } => ErrorKind::Filesystem,
            Self::Runner { .. } => ErrorKind::Runner,
        }
    }

    /// 出错的雷诺数（扫描前的错误为 `None`）
    pub fn re(&self) -> Option<u32> {
        match self {
            Self::Config(_) | Self::Lock(_) | Self::Setup(_) => None,
            Self::Case { re, .. }
            | Self::DecomposeFailed { re, .. }
            | Self::RenumberFailed { re, .. }
            | Self::SolveNonzero { re, .. }
            | Self::ReconstructFailed { re, .. }
            | Self::ArtifactExists { re, .. }
            | Self::Filesystem { re, .. }
            | Self::Runner { re, .. } => Some(*re),
        }
    }

    /// 出错的阶段
    pub fn stage(&self) -> Stage {
        match self {
            Self::Config(_) | Self::Lock(_) | Self::Setup(_) => Stage::Setup,
            Self::Case { stage, .. } | Self::Filesystem { stage, .. } | Self::Runner { stage, .. } => {
                *stage
            }
            Self::DecomposeFailed { .. } => Stage::Decompose,
            Self::RenumberFailed { .. } => Stage::Renumber,
            Self::SolveNonzero { .. } => Stage::Solve,
            Self::ReconstructFailed { .. } => Stage::Reconstruct,
            Self::ArtifactExists { .. } => Stage::Harvest,
        }
    }

    /// 处理方式
    ///
    /// - CLEAN 阶段的任何错误、renumber 与求解器的非零退出：继续
    /// - reconstruct 失败、结果已存在、求解器没有产生输出：跳过归档
    /// - 其余全部终止扫描
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Case { stage: Stage::Clean, .. } | Self::Filesystem { stage: Stage::Clean, .. } => {
                Recovery::Continue
            }
            Self::RenumberFailed { .. } | Self::SolveNonzero { .. } => Recovery::Continue,
            Self::ReconstructFailed { .. } | Self::ArtifactExists { .. } => Recovery::SkipHarvest,
            Self::Filesystem {
                stage: Stage::Harvest,
                source: FsError::NoMatch { .. },
                ..
            } => Recovery::SkipHarvest,
            _ => Recovery::Abort,
        }
    }

    /// 是否终止扫描
    pub fn is_fatal(&self) -> bool {
        self.recovery() == Recovery::Abort
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_decisions() {
        let decompose = SweepError::DecomposeFailed { re: 100, code: 1 };
        assert_eq!(decompose.kind(), ErrorKind::DecomposeFailed);
        assert!(decompose.is_fatal());
        assert_eq!(decompose.stage(), Stage::Decompose);

        let renumber = SweepError::RenumberFailed { re: 100, code: 1 };
        assert_eq!(renumber.kind(), ErrorKind::RenumberFailed);
        assert_eq!(renumber.recovery(), Recovery::Continue);
        assert_eq!(renumber.stage(), Stage::Renumber);

        let solve = SweepError::SolveNonzero { re: 100, code: 139 };
        assert_eq!(solve.recovery(), Recovery::Continue);

        let reconstruct = SweepError::ReconstructFailed { re: 200, code: 1 };
        assert_eq!(reconstruct.recovery(), Recovery::SkipHarvest);

        let exists = SweepError::ArtifactExists {
            re: 300,
            path: PathBuf::from("Results/forces_x/Re_300.dat"),
        };
        assert_eq!(exists.recovery(), Recovery::SkipHarvest);
        assert_eq!(exists.re(), Some(300));
    }

    #[test]
    fn test_filesystem_recovery_depends_on_stage() {
        let io = || std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");

        let clean = SweepError::Filesystem {
            re: 100,
            stage: Stage::Clean,
            source: FsError::io("processor0", io()),
        };
        assert!(!clean.is_fatal());

        let no_output = SweepError::Filesystem {
            re: 100,
            stage: Stage::Harvest,
            source: FsError::NoMatch {
                pattern: "postProcessing/forces/**/*.dat".into(),
            },
        };
        assert_eq!(no_output.recovery(), Recovery::SkipHarvest);

        let harvest_io = SweepError::Filesystem {
            re: 100,
            stage: Stage::Harvest,
            source: FsError::io("Results", io()),
        };
        assert!(harvest_io.is_fatal());
    }

    #[test]
    fn test_case_errors_map_to_kinds() {
        let missing = SweepError::Case {
            re: 100,
            stage: Stage::Configure,
            source: CaseError::key_not_found("system/controlDict", "magUInf"),
        };
        assert_eq!(missing.kind(), ErrorKind::KeyNotFound);
        assert!(missing.is_fatal());
        assert!(missing.to_string().starts_with("Re 100 [CONFIGURE]"));

        let unsupported = SweepError::Config(ConfigError::UnsupportedTurbulence {
            value: "LES".into(),
        });
        assert_eq!(unsupported.kind(), ErrorKind::UnsupportedTurbulence);
        assert_eq!(unsupported.re(), None);
        assert_eq!(unsupported.stage(), Stage::Setup);
    }
}
