// crates/sw_workflow/src/report.rs

//! 扫描报告
//!
//! 每次扫描生成一份 [`SweepReport`]，以 JSON 写入
//! `<case>/sweepReports/<sweep_id>.json`。

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flow::DerivedFlow;
use crate::harvest::ResultArtifact;
use crate::stage::ReOutcome;

/// 报告目录（相对算例根目录）
pub const REPORT_DIR: &str = "sweepReports";

/// 扫描ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SweepId(Uuid);

impl SweepId {
    /// 创建新的扫描ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 获取内部UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SweepId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SweepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SweepId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// 单个雷诺数的执行记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReRecord {
    /// 雷诺数
    pub re: u32,
    /// 入口流动量
    pub flow: Option<DerivedFlow>,
    /// 终止状态
    pub outcome: ReOutcome,
    /// renumberMesh 退出码
    pub renumber_exit_code: Option<i32>,
    /// 求解器退出码
    pub solve_exit_code: Option<i32>,
    /// reconstructPar 退出码
    pub reconstruct_exit_code: Option<i32>,
    /// 最新时间目录
    pub latest_time: Option<String>,
    /// 求解器日志中的第一条致命错误
    pub solver_fatal: Option<String>,
    /// 归档结果
    pub artifact: Option<ResultArtifact>,
    /// 各阶段错误信息
    pub errors: Vec<String>,
}

impl ReRecord {
    /// 尚未执行的记录
    pub fn new(re: u32) -> Self {
        Self {
            re,
            flow: None,
            outcome: ReOutcome::NotAttempted,
            renumber_exit_code: None,
            solve_exit_code: None,
            reconstruct_exit_code: None,
            latest_time: None,
            solver_fatal: None,
            artifact: None,
            errors: Vec::new(),
        }
    }
}

/// 扫描报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// 扫描ID
    pub id: SweepId,
    /// 结果标签
    pub tag: String,
    /// 算例目录
    pub case_dir: PathBuf,
    /// 开始时间
    pub started_at: DateTime<Utc>,
    /// 结束时间
    pub finished_at: Option<DateTime<Utc>>,
    /// 终止扫描的错误
    pub aborted: Option<String>,
    /// 各雷诺数记录（按执行顺序）
    pub records: Vec<ReRecord>,
}

impl SweepReport {
    /// 为给定雷诺数序列创建报告
    pub fn new(tag: impl Into<String>, case_dir: impl Into<PathBuf>, reynolds: &[u32]) -> Self {
        Self {
            id: SweepId::new(),
            tag: tag.into(),
            case_dir: case_dir.into(),
            started_at: Utc::now(),
            finished_at: None,
            aborted: None,
            records: reynolds.iter().map(|&re| ReRecord::new(re)).collect(),
        }
    }

    /// 查找雷诺数记录
    pub fn record(&self, re: u32) -> Option<&ReRecord> {
        self.records.iter().find(|r| r.re == re)
    }

    /// 标记扫描终止
    pub fn abort(&mut self, reason: impl Into<String>) {
        self.aborted = Some(reason.into());
    }

    /// 标记扫描结束
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// 运行时长 (秒)
    pub fn duration_secs(&self) -> f64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// 到达 DONE 的雷诺数个数
    pub fn completed(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_done()).count()
    }

    /// 未到达 DONE 的雷诺数个数
    pub fn failed(&self) -> usize {
        self.records.len() - self.completed()
    }

    /// 进程退出码：未到达 DONE 的雷诺数个数
    pub fn exit_code(&self) -> i32 {
        i32::try_from(self.failed()).unwrap_or(i32::MAX)
    }

    /// 写入 `<dir>/<id>.json`，返回文件路径
    pub fn save(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", self.id));
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// 读取报告
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_counts_not_done() {
        let mut report = SweepReport::new("laminar_no_turbmodel_1_meshpoints", "case", &[100, 200, 300]);
        assert_eq!(report.exit_code(), 3);

        report.records[0].outcome = ReOutcome::Done;
        report.records[1].outcome = ReOutcome::SkipHarvest;
        report.records[2].outcome = ReOutcome::Done;
        assert_eq!(report.completed(), 2);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_duration_uses_finish_time() {
        let mut report = SweepReport::new("tag", "case", &[100]);
        report.finished_at = Some(report.started_at + chrono::Duration::milliseconds(1500));
        assert!((report.duration_secs() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = SweepReport::new("tag", dir.path(), &[100]);
        report.records[0].flow = Some(DerivedFlow::compute(100, 1e-5, 0.1274, 0.05));
        report.records[0].errors.push("Re 100 [SOLVE]: solver exited with code 1".into());
        report.finish();

        let path = report.save(dir.path().join(REPORT_DIR)).unwrap();
        assert!(path.ends_with(format!("{}.json", report.id)));

        let loaded = SweepReport::load(&path).unwrap();
        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.records[0].errors.len(), 1);
        assert_eq!(loaded.record(100).and_then(|r| r.flow).map(|f| f.reynolds), Some(100));
        assert!(loaded.finished_at.is_some());
    }
}
