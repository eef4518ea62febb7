// apps/sw_cli/src/commands/mod.rs

//! 子命令

pub mod flow;
pub mod init;
pub mod run;
pub mod summary;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use sw_config::SweepConfig;

/// 加载配置，`case` 覆盖配置中的算例目录
pub fn load_config(path: &Path, case: Option<&Path>) -> Result<SweepConfig> {
    let mut config = SweepConfig::from_file(path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    if let Some(case) = case {
        config.case_dir = case.to_path_buf();
    }
    Ok(config)
}
