// apps/sw_cli/src/commands/init.rs

//! 写出默认配置命令

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use sw_config::SweepConfig;
use tracing::info;

/// 初始化参数
#[derive(Args)]
pub struct InitArgs {
    /// 输出文件
    #[arg(short, long, default_value = "sweep.json")]
    pub output: PathBuf,

    /// 算例目录
    #[arg(long, default_value = ".")]
    pub case: PathBuf,

    /// 覆盖已存在的文件
    #[arg(long)]
    pub force: bool,
}

/// 写出默认配置
pub fn execute(args: InitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", args.output.display());
    }
    SweepConfig::new(&args.case).save_to_file(&args.output)?;
    info!("Default configuration written to {}", args.output.display());
    Ok(())
}
