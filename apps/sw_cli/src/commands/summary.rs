// apps/sw_cli/src/commands/summary.rs

//! 结果汇总命令

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sw_workflow::{ResultTable, ResultTree};
use tracing::warn;

/// 汇总参数
#[derive(Args)]
pub struct SummaryArgs {
    /// 算例目录
    #[arg(long, default_value = ".")]
    pub case: PathBuf,

    /// 结果目录名
    #[arg(long, default_value = "Results")]
    pub results: String,
}

/// 打印每个 (tag, Re) 的最终 Cd 与压力残差
pub fn execute(args: SummaryArgs) -> Result<()> {
    let root = args.case.join(&args.results);
    let entries = ResultTree::new(&root)
        .scan()
        .with_context(|| format!("Cannot scan {}", root.display()))?;

    if entries.is_empty() {
        println!("No results under {}", root.display());
        return Ok(());
    }

    println!("{:<48} {:>8} {:>12} {:>12}", "tag", "Re", "Cd", "p residual");
    for entry in &entries {
        let cd = match ResultTable::load_forces(&entry.forces) {
            Ok(table) => table.final_value("Cd"),
            Err(e) => {
                warn!("{}", e);
                None
            }
        };
        let p = match ResultTable::load_residuals(&entry.residuals) {
            Ok(table) => table.final_value("p"),
            Err(e) => {
                warn!("{}", e);
                None
            }
        };
        println!(
            "{:<48} {:>8} {:>12} {:>12}",
            entry.tag,
            entry.re,
            cd.map_or_else(|| "-".to_string(), |v| format!("{:.6}", v)),
            p.map_or_else(|| "-".to_string(), |v| format!("{:.3e}", v)),
        );
    }
    Ok(())
}
