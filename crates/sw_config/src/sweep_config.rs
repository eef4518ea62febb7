// crates/sw_config/src/sweep_config.rs

//! SweepConfig - 一次扫描的输入
//!
//! 扫描期间配置不可变。默认值对应参考算例（Suzanne 外流，simpleFoam，
//! 4 进程 simple 分解，Re = 100..1000 步长 100）。

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use sw_case::{DecompositionMethod, TurbulenceType};

use crate::error::ConfigError;

/// 求解器已知的不可压 RAS 模型
pub const KNOWN_RAS_MODELS: &[&str] = &[
    "LRR",
    "LamBremhorstKE",
    "LaunderSharmaKE",
    "LienCubicKE",
    "LienLeschziner",
    "RNGkEpsilon",
    "SSG",
    "ShihQuadraticKE",
    "SpalartAllmaras",
    "kEpsilon",
    "kOmega",
    "kOmegaSST",
    "kOmegaSSTSAS",
    "kkLOmega",
    "qZeta",
    "realizableKE",
    "v2f",
];

/// 雷诺数序列
///
/// 可以是显式列表，也可以是半开等差区间 `[start, stop)`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReynoldsRange {
    /// 显式列表
    List(Vec<u32>),
    /// 等差区间（不含 stop）
    Stepped {
        /// 起点
        start: u32,
        /// 终点（不含）
        stop: u32,
        /// 步长
        step: u32,
    },
}

impl ReynoldsRange {
    /// 展开为有序序列
    pub fn values(&self) -> Vec<u32> {
        match self {
            Self::List(values) => values.clone(),
            Self::Stepped { start, stop, step } => {
                if *step == 0 {
                    return Vec::new();
                }
                (*start..*stop).step_by(*step as usize).collect()
            }
        }
    }
}

impl Default for ReynoldsRange {
    fn default() -> Self {
        Self::Stepped {
            start: 100,
            stop: 1100,
            step: 100,
        }
    }
}

/// 扫描配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// 求解器名
    #[serde(default = "default_solver")]
    pub solver: String,

    /// 算例目录
    #[serde(default = "default_case_dir")]
    pub case_dir: PathBuf,

    /// MPI 进程数
    #[serde(default = "default_n_proc")]
    pub n_proc: u32,

    /// 分解方法
    #[serde(default = "default_method")]
    pub decompose_method: DecompositionMethod,

    /// 分解系数 (nx, ny, nz)
    #[serde(default = "default_coeffs")]
    pub decompose_coeffs: [u32; 3],

    /// 日志文件名（相对算例目录）
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// 网格点数（仅用于结果标签）
    #[serde(default = "default_mesh_points")]
    pub mesh_points: u64,

    /// 湍流类型
    #[serde(default = "default_turbulence_type")]
    pub turbulence_type: TurbulenceType,

    /// 湍流模型名，层流时为 "no"
    #[serde(default = "default_turbulence_model")]
    pub turbulence_model: String,

    /// 水力直径 d_h [m]
    #[serde(default = "default_hydraulic_diameter")]
    pub hydraulic_diameter: f64,

    /// 运动粘度 ν [m²/s]
    #[serde(default = "default_kinematic_viscosity")]
    pub kinematic_viscosity: f64,

    /// 湍流强度 I
    #[serde(default = "default_turbulence_intensity")]
    pub turbulence_intensity: f64,

    /// 雷诺数序列
    #[serde(default)]
    pub reynolds: ReynoldsRange,

    /// 入口边界名
    #[serde(default = "default_inlet_patch")]
    pub inlet_patch: String,

    /// 壁面边界名
    #[serde(default = "default_wall_patch")]
    pub wall_patch: String,

    /// 结果目录名（相对算例目录）
    #[serde(default = "default_results_dir")]
    pub results_dir: String,

    /// 执行命令所用的 shell
    #[serde(default = "default_shell")]
    pub shell: String,

    /// 每条命令前执行的环境初始化片段，例如 `source /opt/openfoam6/etc/bashrc`
    #[serde(default)]
    pub env_setup: Option<String>,

    /// MPI 启动器
    #[serde(default = "default_mpi_launcher")]
    pub mpi_launcher: String,

    /// 是否在扫描期间锁定算例目录
    #[serde(default = "default_lock_case")]
    pub lock_case: bool,
}

fn default_solver() -> String { "simpleFoam".to_string() }
fn default_case_dir() -> PathBuf { PathBuf::from(".") }
fn default_n_proc() -> u32 { 4 }
fn default_method() -> DecompositionMethod { DecompositionMethod::Simple }
fn default_coeffs() -> [u32; 3] { [2, 2, 1] }
fn default_log_file() -> String { format!("log_{}", default_solver()) }
fn default_mesh_points() -> u64 { 333_329 }
fn default_turbulence_type() -> TurbulenceType { TurbulenceType::Laminar }
fn default_turbulence_model() -> String { "no".to_string() }
fn default_hydraulic_diameter() -> f64 { 4.0 * 0.02562 / 0.804201 }
fn default_kinematic_viscosity() -> f64 { 1e-5 }
fn default_turbulence_intensity() -> f64 { 0.05 }
fn default_inlet_patch() -> String { "inlet".to_string() }
fn default_wall_patch() -> String { "monkey".to_string() }
fn default_results_dir() -> String { "Results".to_string() }
fn default_shell() -> String { "bash".to_string() }
fn default_mpi_launcher() -> String { "mpirun".to_string() }
fn default_lock_case() -> bool { true }

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            solver: default_solver(),
            case_dir: default_case_dir(),
            n_proc: default_n_proc(),
            decompose_method: default_method(),
            decompose_coeffs: default_coeffs(),
            log_file: default_log_file(),
            mesh_points: default_mesh_points(),
            turbulence_type: default_turbulence_type(),
            turbulence_model: default_turbulence_model(),
            hydraulic_diameter: default_hydraulic_diameter(),
            kinematic_viscosity: default_kinematic_viscosity(),
            turbulence_intensity: default_turbulence_intensity(),
            reynolds: ReynoldsRange::default(),
            inlet_patch: default_inlet_patch(),
            wall_patch: default_wall_patch(),
            results_dir: default_results_dir(),
            shell: default_shell(),
            env_setup: None,
            mpi_launcher: default_mpi_launcher(),
            lock_case: default_lock_case(),
        }
    }
}

impl SweepConfig {
    /// 以算例目录创建默认配置
    pub fn new(case_dir: impl Into<PathBuf>) -> Self {
        Self {
            case_dir: case_dir.into(),
            ..Default::default()
        }
    }

    /// 设置雷诺数序列
    pub fn with_reynolds(mut self, reynolds: ReynoldsRange) -> Self {
        self.reynolds = reynolds;
        self
    }

    /// 设置湍流类型与模型
    pub fn with_turbulence(mut self, kind: TurbulenceType, model: impl Into<String>) -> Self {
        self.turbulence_type = kind;
        self.turbulence_model = model.into();
        self
    }

    /// 设置分解参数
    pub fn with_decomposition(
        mut self,
        n_proc: u32,
        method: DecompositionMethod,
        coeffs: [u32; 3],
    ) -> Self {
        self.n_proc = n_proc;
        self.decompose_method = method;
        self.decompose_coeffs = coeffs;
        self
    }

    /// 设置求解器并同步默认日志名
    pub fn with_solver(mut self, solver: impl Into<String>) -> Self {
        self.solver = solver.into();
        self.log_file = format!("log_{}", self.solver);
        self
    }

    /// 展开后的雷诺数序列
    pub fn reynolds_values(&self) -> Vec<u32> {
        self.reynolds.values()
    }

    /// 结果目录绝对路径
    pub fn results_path(&self) -> PathBuf {
        self.case_dir.join(&self.results_dir)
    }

    /// 日志文件路径
    pub fn log_path(&self) -> PathBuf {
        self.case_dir.join(&self.log_file)
    }

    /// 从 JSON 文本解析并校验
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let raw: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;

        // 先单独检查湍流类型，使错误归类为不支持的湍流类型而非一般解析错误
        if let Some(kind) = raw.get("turbulence_type").and_then(|v| v.as_str()) {
            kind.parse::<TurbulenceType>()
                .map_err(|_| ConfigError::UnsupportedTurbulence {
                    value: kind.to_string(),
                })?;
        }

        let config: SweepConfig =
            serde_json::from_value(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solver.trim().is_empty() {
            return Err(ConfigError::invalid("solver", "\"\"", "solver name must not be empty"));
        }

        if self.log_file.trim().is_empty() {
            return Err(ConfigError::invalid("log_file", "\"\"", "log file name must not be empty"));
        }

        if self.n_proc == 0 {
            return Err(ConfigError::invalid("n_proc", self.n_proc, "process count must be positive"));
        }

        if self.decompose_method.uses_coeffs() {
            if self.decompose_coeffs.contains(&0) {
                return Err(ConfigError::invalid(
                    "decompose_coeffs",
                    format!("{:?}", self.decompose_coeffs),
                    "coefficients must be positive",
                ));
            }
            let product: u32 = self.decompose_coeffs.iter().product();
            if product != self.n_proc {
                return Err(ConfigError::invalid(
                    "decompose_coeffs",
                    format!("{:?}", self.decompose_coeffs),
                    format!("product {} must equal n_proc {}", product, self.n_proc),
                ));
            }
        }

        if !(self.hydraulic_diameter.is_finite() && self.hydraulic_diameter > 0.0) {
            return Err(ConfigError::invalid(
                "hydraulic_diameter",
                self.hydraulic_diameter,
                "hydraulic diameter must be positive",
            ));
        }

        if !(self.kinematic_viscosity.is_finite() && self.kinematic_viscosity > 0.0) {
            return Err(ConfigError::invalid(
                "kinematic_viscosity",
                self.kinematic_viscosity,
                "kinematic viscosity must be positive",
            ));
        }

        if !(self.turbulence_intensity > 0.0 && self.turbulence_intensity < 1.0) {
            return Err(ConfigError::invalid(
                "turbulence_intensity",
                self.turbulence_intensity,
                "turbulence intensity must be in (0, 1)",
            ));
        }

        let values = self.reynolds_values();
        if values.is_empty() {
            return Err(ConfigError::invalid(
                "reynolds",
                format!("{:?}", self.reynolds),
                "Reynolds range must not be empty",
            ));
        }
        if values.contains(&0) {
            return Err(ConfigError::invalid(
                "reynolds",
                format!("{:?}", values),
                "Reynolds numbers must be positive",
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = values.iter().find(|re| !seen.insert(**re)) {
            return Err(ConfigError::invalid(
                "reynolds",
                dup,
                "Reynolds numbers must not repeat",
            ));
        }

        if self.inlet_patch.trim().is_empty() || self.wall_patch.trim().is_empty() {
            return Err(ConfigError::invalid(
                "inlet_patch/wall_patch",
                "\"\"",
                "patch names must not be empty",
            ));
        }

        Ok(())
    }

    /// 非致命问题
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        match self.turbulence_type {
            TurbulenceType::Ras => {
                if !KNOWN_RAS_MODELS.contains(&self.turbulence_model.as_str()) {
                    warnings.push(format!(
                        "RAS model '{}' is not a known incompressible RAS model",
                        self.turbulence_model
                    ));
                }
            }
            TurbulenceType::Laminar => {
                if self.turbulence_model != "no" {
                    warnings.push(format!(
                        "turbulence model '{}' is ignored for laminar runs",
                        self.turbulence_model
                    ));
                }
            }
        }

        if !self.decompose_method.uses_coeffs() && self.decompose_coeffs != default_coeffs() {
            warnings.push(format!(
                "decompose_coeffs {:?} are ignored by the {} method",
                self.decompose_coeffs, self.decompose_method
            ));
        }

        warnings
    }
}
