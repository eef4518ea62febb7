// apps/sw_cli/src/commands/run.rs

//! 执行扫描命令

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use sw_workflow::{LoggingListener, ShellRunner, SweepEngine};
use tracing::info;

/// 扫描参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 算例目录（覆盖配置）
    #[arg(long)]
    pub case: Option<PathBuf>,

    /// 不锁定算例目录
    #[arg(long)]
    pub no_lock: bool,

    /// 输出每个阶段的结束事件
    #[arg(short, long)]
    pub verbose: bool,
}

/// 执行扫描，退出码为未到达 DONE 的雷诺数个数（上限 255）
pub fn execute(args: RunArgs) -> Result<ExitCode> {
    let mut config = super::load_config(&args.config, args.case.as_deref())?;
    if args.no_lock {
        config.lock_case = false;
    }
    if !config.case_dir.is_dir() {
        bail!("Case directory {} does not exist", config.case_dir.display());
    }

    info!("=== SweepFoam sweep: {} ===", config.case_dir.display());

    let runner = ShellRunner::from_config(&config);
    let engine = SweepEngine::new(config, runner);
    let listener = if args.verbose {
        LoggingListener::new().verbose()
    } else {
        LoggingListener::new()
    };
    engine.events().add_listener(Arc::new(listener));

    let report = engine.run();

    info!(
        "{} of {} Re value(s) done in {:.1} s",
        report.completed(),
        report.records.len(),
        report.duration_secs()
    );
    if let Some(reason) = &report.aborted {
        info!("Sweep aborted: {}", reason);
    }

    let code = u8::try_from(report.exit_code()).unwrap_or(u8::MAX);
    Ok(ExitCode::from(code))
}
