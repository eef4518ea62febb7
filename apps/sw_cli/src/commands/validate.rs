// apps/sw_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 检查配置文件与算例目录中扫描需要改写的文件。

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use sw_case::{CONTROL_DICT, DECOMPOSE_PAR_DICT, TURBULENCE_PROPERTIES};
use sw_config::SweepConfig;
use tracing::{error, info, warn};

/// 扫描会改写的初始场
const INITIAL_FIELDS: [&str; 4] = ["0/U", "0/k", "0/epsilon", "0/omega"];

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 算例目录（覆盖配置）
    #[arg(long)]
    pub case: Option<PathBuf>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn is_ok(&self, strict: bool) -> bool {
        self.errors.is_empty() && (!strict || self.warnings.is_empty())
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== SweepFoam config validation ===");

    let mut result = ValidationResult::default();
    let content = std::fs::read_to_string(&args.config)
        .with_context(|| format!("Cannot read {}", args.config.display()))?;

    match SweepConfig::from_json_str(&content) {
        Ok(mut config) => {
            if let Some(case) = &args.case {
                config.case_dir = case.clone();
            }
            result.warnings.extend(config.warnings());
            check_case(&config.case_dir, &mut result);
            println!("Reynolds numbers: {:?}", config.reynolds_values());
        }
        Err(e) => result.add_error(e.to_string()),
    }

    print_validation_result(&result, args.strict)
}

fn check_case(case_dir: &Path, result: &mut ValidationResult) {
    if !case_dir.is_dir() {
        result.add_error(format!("Case directory not found: {}", case_dir.display()));
        return;
    }
    let required = [TURBULENCE_PROPERTIES, CONTROL_DICT, DECOMPOSE_PAR_DICT];
    for rel in required.iter().chain(INITIAL_FIELDS.iter()) {
        if !case_dir.join(rel).is_file() {
            result.add_error(format!("Missing case file: {}", case_dir.join(rel).display()));
        }
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    for err in &result.errors {
        error!("{}", err);
        println!("  error: {}", err);
    }
    for warning in &result.warnings {
        warn!("{}", warning);
        println!("  warning: {}", warning);
    }

    if result.is_ok(strict) {
        println!("Configuration OK");
        Ok(())
    } else {
        bail!(
            "Validation failed: {} error(s), {} warning(s)",
            result.errors.len(),
            result.warnings.len()
        )
    }
}
