// crates/sw_workflow/src/engine.rs

//! 雷诺数扫描引擎
//!
//! 对配置中的每个雷诺数依次执行：
//!
//! ```text
//! CLEAN -> CONFIGURE -> DECOMPOSE -> RENUMBER -> SOLVE -> RECONSTRUCT -> HARVEST -> DONE
//! ```
//!
//! 出错时由 [`SweepError::recovery`] 决定继续、以 SKIP_HARVEST 结束当前
//! 雷诺数，还是终止扫描（剩余雷诺数记为未执行）。雷诺数之间不共享状态，
//! 每次迭代都从 CLEAN 开始。

use std::path::Path;

use sw_case::{CaseLock, CaseModel, FileCase, SolutionDirectory, TurbulenceField};
use sw_config::SweepConfig;
use sw_foundation::fs::{case_pattern, rm_file, rm_folder};
use sw_foundation::FsResult;
use tracing::{error, info, warn};

use crate::error::{Recovery, SweepError, SweepResult};
use crate::events::{EventDispatcher, SweepEvent};
use crate::flow::DerivedFlow;
use crate::harvest::Harvester;
use crate::report::{ReRecord, SweepReport, REPORT_DIR};
use crate::runner::{log_offset, scan_log_since, CommandRunner, RunnerError};
use crate::stage::{ReOutcome, Stage};

/// 分解命令
pub const DECOMPOSE_COMMAND: &str = "decomposePar -force";
/// 网格重编号命令（并行）
pub const RENUMBER_COMMAND: &str = "renumberMesh -overwrite -parallel";
/// 重构命令
pub const RECONSTRUCT_COMMAND: &str = "reconstructPar";

/// CLEAN 删除的目录
///
/// `0/cellLevel` 与 `0/pointLevel` 可能是文件也可能是目录，两份列表都包含它们。
pub const CLEAN_FOLDERS: [&str; 4] = ["processor*", "0/cellLevel", "0/pointLevel", "postProcessing"];
/// CLEAN 删除的文件
pub const CLEAN_FILES: [&str; 4] = ["0/cellLevel", "0/pointLevel", "log*", "PyFoam*"];

/// 扫描引擎
pub struct SweepEngine<R: CommandRunner> {
    config: SweepConfig,
    runner: R,
    case: CaseModel<FileCase>,
    harvester: Harvester,
    events: EventDispatcher,
}

impl<R: CommandRunner> SweepEngine<R> {
    /// 创建引擎
    pub fn new(config: SweepConfig, runner: R) -> Self {
        let case = CaseModel::new(FileCase::new(&config.case_dir))
            .with_inlet_patch(config.inlet_patch.clone());
        let harvester = Harvester::from_config(&config);
        Self {
            config,
            runner,
            case,
            harvester,
            events: EventDispatcher::new(),
        }
    }

    /// 扫描配置
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// 事件分发器
    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// 结果归档器
    pub fn harvester(&self) -> &Harvester {
        &self.harvester
    }

    fn case_dir(&self) -> &Path {
        &self.config.case_dir
    }

    /// 执行整个扫描并写出报告
    ///
    /// 报告的 [`SweepReport::exit_code`] 为未到达 DONE 的雷诺数个数。
    pub fn run(&self) -> SweepReport {
        let reynolds = self.config.reynolds_values();
        let mut report = SweepReport::new(
            self.harvester.tag().to_string(),
            self.case_dir(),
            &reynolds,
        );

        self.events.emit(SweepEvent::SweepStarted {
            sweep_id: report.id,
            tag: report.tag.clone(),
            reynolds,
        });

        match self.prepare() {
            Ok(_lock) => {
                for record in report.records.iter_mut() {
                    let re = record.re;
                    let outcome = self.run_reynolds(record);
                    record.outcome = outcome;
                    self.events.emit(SweepEvent::ReFinished { re, outcome });
                    if outcome == ReOutcome::Fatal {
                        break;
                    }
                }
                if let Some(record) = report.records.iter().find(|r| r.outcome == ReOutcome::Fatal) {
                    let reason = record
                        .errors
                        .last()
                        .cloned()
                        .unwrap_or_else(|| format!("Re {} failed", record.re));
                    report.abort(reason);
                }
            }
            Err(e) => {
                error!("{}", e);
                report.abort(e.to_string());
            }
        }

        report.finish();
        match report.save(self.case_dir().join(REPORT_DIR)) {
            Ok(path) => info!("Sweep report written to {}", path.display()),
            Err(e) => warn!("Failed to write sweep report: {}", e),
        }

        self.events.emit(SweepEvent::SweepFinished {
            sweep_id: report.id,
            failed: report.failed(),
            duration_secs: report.duration_secs(),
        });
        report
    }

    /// 扫描前准备：校验配置、加锁、写入湍流模式
    fn prepare(&self) -> SweepResult<Option<CaseLock>> {
        self.config.validate()?;
        for warning in self.config.warnings() {
            warn!("{}", warning);
        }

        let lock = if self.config.lock_case {
            Some(CaseLock::acquire(self.case_dir()).map_err(SweepError::Lock)?)
        } else {
            None
        };

        self.case
            .set_turbulence_mode(self.config.turbulence_type, &self.config.turbulence_model)
            .map_err(SweepError::Setup)?;
        Ok(lock)
    }

    /// 单个雷诺数的状态机
    fn run_reynolds(&self, record: &mut ReRecord) -> ReOutcome {
        let re = record.re;
        let flow = DerivedFlow::from_config(&self.config, re);
        record.flow = Some(flow);

        for stage in Stage::PIPELINE {
            self.events.emit(SweepEvent::StageStarted { re, stage });
            let result = match stage {
                Stage::Clean => self.clean(re),
                Stage::Configure => self.configure(&flow),
                Stage::Decompose => self.decompose(re),
                Stage::Renumber => self.renumber(record),
                Stage::Solve => self.solve(record),
                Stage::Reconstruct => self.reconstruct(record),
                Stage::Harvest => self.harvest(record),
                Stage::Setup => Ok(()),
            };

            match result {
                Ok(()) => self.events.emit(SweepEvent::StageFinished { re, stage }),
                Err(e) => {
                    let recovery = e.recovery();
                    let message = e.to_string();
                    record.errors.push(message.clone());
                    self.events.emit(SweepEvent::StageFailed {
                        re,
                        stage,
                        error: message,
                        recovery,
                    });
                    match recovery {
                        Recovery::Continue => {}
                        Recovery::SkipHarvest => return ReOutcome::SkipHarvest,
                        Recovery::Abort => return ReOutcome::Fatal,
                    }
                }
            }
        }
        ReOutcome::Done
    }

    /// CLEAN：删除上一次运行的时间目录、分解目录、日志与求解器输出
    ///
    /// 每一项都会尝试，返回遇到的第一个错误。锁文件与结果树不受影响。
    pub fn clean(&self, re: u32) -> SweepResult<()> {
        let root = self.case_dir();
        let mut failures = Vec::new();

        if let Err(source) = SolutionDirectory::new(root).clear_results() {
            failures.push(SweepError::Case {
                re,
                stage: Stage::Clean,
                source,
            });
        }

        let mut removals: Vec<FsResult<usize>> = Vec::new();
        for rel in CLEAN_FOLDERS {
            removals.push(rm_folder(&case_pattern(root, rel)));
        }
        for rel in CLEAN_FILES {
            removals.push(rm_file(&case_pattern(root, rel)));
        }
        removals.push(rm_file(&case_pattern(root, &self.config.log_file)));

        failures.extend(removals.into_iter().filter_map(Result::err).map(|source| {
            SweepError::Filesystem {
                re,
                stage: Stage::Clean,
                source,
            }
        }));

        let mut failures = failures.into_iter();
        match failures.next() {
            Some(first) => {
                for other in failures {
                    warn!("{}", other);
                }
                Err(first)
            }
            None => Ok(()),
        }
    }

    /// CONFIGURE：入口速度、magUInf、湍流边界与分解参数
    fn configure(&self, flow: &DerivedFlow) -> SweepResult<()> {
        let re = flow.reynolds;
        let patches = [self.config.inlet_patch.as_str(), self.config.wall_patch.as_str()];
        let case_error = |source| SweepError::Case {
            re,
            stage: Stage::Configure,
            source,
        };

        self.case.set_inlet_velocity(flow.velocity).map_err(case_error)?;
        self.case.set_freestream_magnitude(flow.velocity).map_err(case_error)?;
        for (field, value) in [
            (TurbulenceField::K, flow.k),
            (TurbulenceField::Epsilon, flow.epsilon),
            (TurbulenceField::Omega, flow.omega),
        ] {
            self.case
                .set_turbulence_boundary(field, &patches, value)
                .map_err(case_error)?;
        }
        self.case
            .set_decomposition(
                self.config.n_proc,
                self.config.decompose_method,
                self.config.decompose_coeffs,
            )
            .map_err(case_error)?;
        Ok(())
    }

    fn runner_error(re: u32, stage: Stage) -> impl Fn(RunnerError) -> SweepError {
        move |source| SweepError::Runner { re, stage, source }
    }

    fn log_path(&self) -> std::path::PathBuf {
        self.config.log_path()
    }

    /// DECOMPOSE：非零退出为致命错误
    fn decompose(&self, re: u32) -> SweepResult<()> {
        let code = self
            .runner
            .run(DECOMPOSE_COMMAND, self.case_dir(), &self.log_path())
            .map_err(Self::runner_error(re, Stage::Decompose))?;
        if code != 0 {
            return Err(SweepError::DecomposeFailed { re, code });
        }
        Ok(())
    }

    /// RENUMBER：非零退出仅记录
    fn renumber(&self, record: &mut ReRecord) -> SweepResult<()> {
        let re = record.re;
        let code = self
            .runner
            .run_parallel(RENUMBER_COMMAND, self.config.n_proc, self.case_dir(), &self.log_path())
            .map_err(Self::runner_error(re, Stage::Renumber))?;
        record.renumber_exit_code = Some(code);
        if code != 0 {
            return Err(SweepError::RenumberFailed { re, code });
        }
        Ok(())
    }

    /// SOLVE：退出码与日志中的致命错误写入记录，非零退出不中断
    fn solve(&self, record: &mut ReRecord) -> SweepResult<()> {
        let re = record.re;
        let command = format!("{} -parallel", self.config.solver);
        let log = self.log_path();
        // 日志与前面的阶段共用，只扫描求解器追加的部分
        let offset = log_offset(&log);
        let code = self
            .runner
            .run_parallel(&command, self.config.n_proc, self.case_dir(), &log)
            .map_err(Self::runner_error(re, Stage::Solve))?;

        record.solve_exit_code = Some(code);
        record.solver_fatal = scan_log_since(&log, offset);
        if let Some(line) = &record.solver_fatal {
            warn!("Re {}: solver log reports '{}'", re, line);
        }
        if code != 0 {
            return Err(SweepError::SolveNonzero { re, code });
        }
        Ok(())
    }

    /// RECONSTRUCT：非零退出跳过归档
    fn reconstruct(&self, record: &mut ReRecord) -> SweepResult<()> {
        let re = record.re;
        let code = self
            .runner
            .run(RECONSTRUCT_COMMAND, self.case_dir(), &self.log_path())
            .map_err(Self::runner_error(re, Stage::Reconstruct))?;

        record.reconstruct_exit_code = Some(code);
        record.latest_time = SolutionDirectory::new(self.case_dir())
            .latest_time()
            .ok()
            .flatten();
        if code != 0 {
            return Err(SweepError::ReconstructFailed { re, code });
        }
        Ok(())
    }

    /// HARVEST：复制结果文件对
    fn harvest(&self, record: &mut ReRecord) -> SweepResult<()> {
        let artifact = self.harvester.harvest(record.re, record.solve_exit_code)?;
        record.artifact = Some(artifact);
        Ok(())
    }
}
