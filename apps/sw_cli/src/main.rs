// apps/sw_cli/src/main.rs

//! SweepFoam 命令行界面
//!
//! 对外部求解器算例执行雷诺数扫描。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 5: Application**：只负责加载配置、安装日志订阅者
//! 并把进程退出码设为未完成的雷诺数个数。

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// SweepFoam 雷诺数扫描工具
#[derive(Parser)]
#[command(name = "sw_cli")]
#[command(author = "SweepFoam Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reynolds-number sweep driver for OpenFOAM cases", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 执行扫描
    Run(commands::run::RunArgs),
    /// 验证配置
    Validate(commands::validate::ValidateArgs),
    /// 打印各雷诺数的入口流动量
    Flow(commands::flow::FlowArgs),
    /// 汇总结果树
    Summary(commands::summary::SummaryArgs),
    /// 写出默认配置
    Init(commands::init::InitArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 执行命令
    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Validate(args) => commands::validate::execute(args).map(|_| ExitCode::SUCCESS),
        Commands::Flow(args) => commands::flow::execute(args).map(|_| ExitCode::SUCCESS),
        Commands::Summary(args) => commands::summary::execute(args).map(|_| ExitCode::SUCCESS),
        Commands::Init(args) => commands::init::execute(args).map(|_| ExitCode::SUCCESS),
    }
}
