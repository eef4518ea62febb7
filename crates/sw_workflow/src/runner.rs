// crates/sw_workflow/src/runner.rs

//! 外部命令运行器
//!
//! [`CommandRunner`] 在算例目录中执行一条命令，标准输出与标准错误
//! 追加到同一个日志文件，返回退出码。测试时可替换为脚本化的假运行器。

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use sw_config::SweepConfig;
use thiserror::Error;
use tracing::debug;

/// 求解器日志中的致命错误标志
pub const FATAL_BANNERS: [&str; 2] = ["FOAM FATAL IO ERROR", "FOAM FATAL ERROR"];

/// 运行器错误
#[derive(Debug, Error)]
pub enum RunnerError {
    /// 日志文件无法打开
    #[error("Cannot open log file {path}: {source}")]
    Log {
        /// 日志路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 命令无法启动
    #[error("Failed to launch '{command}': {source}")]
    Spawn {
        /// 命令行
        command: String,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },
}

/// 并行命令行 `<launcher> -np <n> <command>`
pub fn parallel_command(launcher: &str, n_proc: u32, command: &str) -> String {
    format!("{} -np {} {}", launcher, n_proc, command)
}

/// 外部命令运行器trait
pub trait CommandRunner {
    /// 在 `working_dir` 中执行命令，输出追加到 `log`，返回退出码
    ///
    /// 被信号终止时退出码为 -1。
    fn run(&self, command: &str, working_dir: &Path, log: &Path) -> Result<i32, RunnerError>;

    /// MPI 启动器
    fn mpi_launcher(&self) -> &str {
        "mpirun"
    }

    /// 以 `n_proc` 个进程并行执行
    fn run_parallel(
        &self,
        command: &str,
        n_proc: u32,
        working_dir: &Path,
        log: &Path,
    ) -> Result<i32, RunnerError> {
        let line = parallel_command(self.mpi_launcher(), n_proc, command);
        self.run(&line, working_dir, log)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, command: &str, working_dir: &Path, log: &Path) -> Result<i32, RunnerError> {
        (**self).run(command, working_dir, log)
    }

    fn mpi_launcher(&self) -> &str {
        (**self).mpi_launcher()
    }
}

/// 通过 shell 执行命令的运行器
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
    env_setup: Option<String>,
    mpi_launcher: String,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self {
            shell: "bash".to_string(),
            env_setup: None,
            mpi_launcher: "mpirun".to_string(),
        }
    }
}

impl ShellRunner {
    /// 默认 `bash` 运行器
    pub fn new() -> Self {
        Self::default()
    }

    /// 从扫描配置创建
    pub fn from_config(config: &SweepConfig) -> Self {
        Self {
            shell: config.shell.clone(),
            env_setup: config.env_setup.clone(),
            mpi_launcher: config.mpi_launcher.clone(),
        }
    }

    /// 设置 shell
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// 每条命令前执行的环境脚本（例如 `source .../bashrc`）
    pub fn with_env_setup(mut self, setup: impl Into<String>) -> Self {
        self.env_setup = Some(setup.into());
        self
    }

    /// 设置 MPI 启动器
    pub fn with_mpi_launcher(mut self, launcher: impl Into<String>) -> Self {
        self.mpi_launcher = launcher.into();
        self
    }

    /// 传给 `<shell> -c` 的完整命令行
    pub fn shell_line(&self, command: &str) -> String {
        match &self.env_setup {
            Some(setup) if !setup.trim().is_empty() => format!("{} && {}", setup.trim(), command),
            _ => command.to_string(),
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, working_dir: &Path, log: &Path) -> Result<i32, RunnerError> {
        let log_error = |source| RunnerError::Log {
            path: log.to_path_buf(),
            source,
        };
        let stdout = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log)
            .map_err(log_error)?;
        let stderr = stdout.try_clone().map_err(log_error)?;

        let line = self.shell_line(command);
        debug!("Running `{}` in {}", line, working_dir.display());

        let status = Command::new(&self.shell)
            .arg("-c")
            .arg(&line)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .map_err(|source| RunnerError::Spawn {
                command: line.clone(),
                source,
            })?;

        let code = status.code().unwrap_or(-1);
        debug!("`{}` exited with code {}", command, code);
        Ok(code)
    }

    fn mpi_launcher(&self) -> &str {
        &self.mpi_launcher
    }
}

/// 返回日志中第一条致命错误所在行，日志不存在或不可读时返回 `None`
pub fn scan_log_for_errors(log: &Path) -> Option<String> {
    scan_log_since(log, 0)
}

/// 当前日志长度（字节），日志不存在时为 0
pub fn log_offset(log: &Path) -> u64 {
    std::fs::metadata(log).map(|m| m.len()).unwrap_or(0)
}

/// 只扫描 `offset` 字节之后追加的日志
pub fn scan_log_since(log: &Path, offset: u64) -> Option<String> {
    let bytes = std::fs::read(log).ok()?;
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(bytes.len());
    String::from_utf8_lossy(&bytes[start..])
        .lines()
        .find(|line| FATAL_BANNERS.iter().any(|banner| line.contains(banner)))
        .map(|line| line.trim().to_string())
}
