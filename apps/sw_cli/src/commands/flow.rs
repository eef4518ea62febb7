// apps/sw_cli/src/commands/flow.rs

//! 入口流动量命令

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use sw_workflow::DerivedFlow;

/// 流动量参数
#[derive(Args)]
pub struct FlowArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

/// 打印每个雷诺数的 U、k、ε、ω
pub fn execute(args: FlowArgs) -> Result<()> {
    let config = super::load_config(&args.config, None)?;
    let flows: Vec<DerivedFlow> = config
        .reynolds_values()
        .into_iter()
        .map(|re| DerivedFlow::from_config(&config, re))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&flows)?);
        return Ok(());
    }

    println!(
        "{:>8} {:>14} {:>14} {:>14} {:>14}",
        "Re", "U", "k", "epsilon", "omega"
    );
    for flow in &flows {
        println!(
            "{:>8} {:>14.6e} {:>14.6e} {:>14.6e} {:>14.6e}",
            flow.reynolds, flow.velocity, flow.k, flow.epsilon, flow.omega
        );
    }
    Ok(())
}
