// crates/sw_workflow/src/harvest.rs

//! 结果归档
//!
//! 把求解器的 `postProcessing/forces` 与 `postProcessing/residuals` 输出
//! 剥离文件头后复制到结果树：
//!
//! ```text
//! Results/
//!   forces_<tag>/Re_<Re>.dat
//!   residuals_<tag>/Re_<Re>.dat
//! ```
//!
//! 结果文件只写一次：任一目标已存在时整个雷诺数以 `ArtifactExists` 失败，
//! 已有文件保持不变。不同雷诺数之间互不干扰。

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sw_case::TurbulenceType;
use sw_config::SweepConfig;
use sw_foundation::fs::{case_pattern, copy_files_exclusive, make_folder};
use sw_foundation::FsError;
use tracing::{debug, warn};

use crate::error::{SweepError, SweepResult};
use crate::stage::Stage;

/// 力系数文件头行数
pub const FORCES_HEADER_LINES: usize = 9;
/// 残差文件头行数
pub const RESIDUALS_HEADER_LINES: usize = 2;

/// 力系数文件的列
pub const FORCES_COLUMNS: [&str; 6] = ["Time", "Cm", "Cd", "Cl", "Cl_f", "Cl_r"];
/// 残差文件的列
pub const RESIDUALS_COLUMNS: [&str; 5] = ["Time", "Ux", "Uy", "Uz", "p"];

/// 力系数输出（相对算例根目录）
pub const FORCES_SOURCE: &str = "postProcessing/forces/**/*.dat";
/// 残差输出（相对算例根目录）
pub const RESIDUALS_SOURCE: &str = "postProcessing/residuals/**/*.dat";

/// 结果文件名 `Re_<Re>.dat`
pub fn artifact_name(re: u32) -> String {
    format!("Re_{}.dat", re)
}

/// 结果标签 `<turb_type>_<turb_model>_turbmodel_<mesh_points>_meshpoints`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultTag(String);

impl ResultTag {
    /// 构造标签
    pub fn new(kind: TurbulenceType, model: &str, mesh_points: u64) -> Self {
        Self(format!(
            "{}_{}_turbmodel_{}_meshpoints",
            kind.as_str(),
            model,
            mesh_points
        ))
    }

    /// 由扫描配置构造
    pub fn from_config(config: &SweepConfig) -> Self {
        Self::new(
            config.turbulence_type,
            &config.turbulence_model,
            config.mesh_points,
        )
    }

    /// 标签字符串
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResultTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 一个雷诺数的结果文件对
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultArtifact {
    /// 雷诺数
    pub re: u32,
    /// 结果标签
    pub tag: String,
    /// 力系数文件
    pub forces: PathBuf,
    /// 残差文件
    pub residuals: PathBuf,
    /// 求解器退出码（非零时结果可能未收敛）
    pub solve_exit_code: Option<i32>,
}

/// 结果归档器
#[derive(Debug, Clone)]
pub struct Harvester {
    case_root: PathBuf,
    results_root: PathBuf,
    tag: ResultTag,
}

impl Harvester {
    /// 创建归档器
    pub fn new(case_root: impl Into<PathBuf>, results_root: impl Into<PathBuf>, tag: ResultTag) -> Self {
        Self {
            case_root: case_root.into(),
            results_root: results_root.into(),
            tag,
        }
    }

    /// 由扫描配置创建
    pub fn from_config(config: &SweepConfig) -> Self {
        Self::new(
            &config.case_dir,
            config.results_path(),
            ResultTag::from_config(config),
        )
    }

    /// 结果标签
    pub fn tag(&self) -> &ResultTag {
        &self.tag
    }

    /// 结果树根目录
    pub fn results_root(&self) -> &Path {
        &self.results_root
    }

    /// `forces_<tag>/`
    pub fn forces_dir(&self) -> PathBuf {
        self.results_root.join(format!("forces_{}", self.tag))
    }

    /// `residuals_<tag>/`
    pub fn residuals_dir(&self) -> PathBuf {
        self.results_root.join(format!("residuals_{}", self.tag))
    }

    /// 力系数结果文件路径
    pub fn forces_path(&self, re: u32) -> PathBuf {
        self.forces_dir().join(artifact_name(re))
    }

    /// 残差结果文件路径
    pub fn residuals_path(&self, re: u32) -> PathBuf {
        self.residuals_dir().join(artifact_name(re))
    }

    /// 归档当前算例输出
    ///
    /// 残差复制失败时删除刚写入的力系数文件，保证结果文件成对出现。
    pub fn harvest(&self, re: u32, solve_exit_code: Option<i32>) -> SweepResult<ResultArtifact> {
        let fs_error = |source: FsError| match source {
            FsError::AlreadyExists { path } => SweepError::ArtifactExists { re, path },
            source => SweepError::Filesystem {
                re,
                stage: Stage::Harvest,
                source,
            },
        };

        let forces = self.forces_path(re);
        let residuals = self.residuals_path(re);
        for path in [&forces, &residuals] {
            if path.exists() {
                return Err(SweepError::ArtifactExists {
                    re,
                    path: path.clone(),
                });
            }
        }

        make_folder(self.forces_dir()).map_err(fs_error)?;
        make_folder(self.residuals_dir()).map_err(fs_error)?;

        copy_files_exclusive(
            &case_pattern(&self.case_root, FORCES_SOURCE),
            &forces,
            FORCES_HEADER_LINES,
        )
        .map_err(fs_error)?;

        if let Err(e) = copy_files_exclusive(
            &case_pattern(&self.case_root, RESIDUALS_SOURCE),
            &residuals,
            RESIDUALS_HEADER_LINES,
        ) {
            if let Err(remove) = std::fs::remove_file(&forces) {
                warn!("Failed to roll back {}: {}", forces.display(), remove);
            }
            return Err(fs_error(e));
        }

        debug!("Harvested Re {} into {}", re, self.results_root.display());
        Ok(ResultArtifact {
            re,
            tag: self.tag.to_string(),
            forces,
            residuals,
            solve_exit_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    const FORCES_DAT: &str = "\
# Force coefficients
# dragDir           : (0 1 0)
# sideDir           : (0 0 1)
# liftDir           : (1 0 0)
# rollAxis          : (0 1 0)
# pitchAxis         : (0 0 1)
# magUInf           : 0.00784739
# lRef              : 0.8
# Time          Cm              Cd              Cl              Cl(f)           Cl(r)
1\t0.01\t1.20\t0.30\t0.16\t0.14
2\t0.02\t1.10\t0.31\t0.17\t0.14
";

    const RESIDUALS_DAT: &str = "\
# Residuals
# Time          U_x             U_y             U_z             p
1\t1\t1\t1\t1
2\t0.5\t0.4\tN/A\t0.3
";

    fn write_output(case: &Path) {
        let forces = case.join("postProcessing/forces/0");
        let residuals = case.join("postProcessing/residuals/0");
        std::fs::create_dir_all(&forces).unwrap();
        std::fs::create_dir_all(&residuals).unwrap();
        std::fs::write(forces.join("forceCoeffs.dat"), FORCES_DAT).unwrap();
        std::fs::write(residuals.join("residuals.dat"), RESIDUALS_DAT).unwrap();
    }

    fn tree(root: &Path) -> BTreeMap<String, String> {
        let mut files = BTreeMap::new();
        for dir in std::fs::read_dir(root).unwrap() {
            let dir = dir.unwrap().path();
            for file in std::fs::read_dir(&dir).unwrap() {
                let file = file.unwrap().path();
                let key = file.strip_prefix(root).unwrap().to_string_lossy().into_owned();
                files.insert(key, std::fs::read_to_string(&file).unwrap());
            }
        }
        files
    }

    fn tag() -> ResultTag {
        ResultTag::new(TurbulenceType::Ras, "kOmegaSST", 333329)
    }

    #[test]
    fn test_tag_format() {
        assert_eq!(tag().as_str(), "RAS_kOmegaSST_turbmodel_333329_meshpoints");
        assert_eq!(
            ResultTag::new(TurbulenceType::Laminar, "no", 100).to_string(),
            "laminar_no_turbmodel_100_meshpoints"
        );
        assert_eq!(artifact_name(1000), "Re_1000.dat");
    }

    #[test]
    fn test_harvest_strips_headers() {
        let case = tempfile::tempdir().unwrap();
        write_output(case.path());
        let harvester = Harvester::new(case.path(), case.path().join("Results"), tag());

        let artifact = harvester.harvest(100, Some(0)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&artifact.forces).unwrap(),
            "1\t0.01\t1.20\t0.30\t0.16\t0.14\n2\t0.02\t1.10\t0.31\t0.17\t0.14\n"
        );
        assert_eq!(
            std::fs::read_to_string(&artifact.residuals).unwrap(),
            "1\t1\t1\t1\t1\n2\t0.5\t0.4\tN/A\t0.3\n"
        );
        assert!(artifact
            .forces
            .ends_with("Results/forces_RAS_kOmegaSST_turbmodel_333329_meshpoints/Re_100.dat"));
    }

    #[test]
    fn test_harvest_refuses_overwrite() {
        let case = tempfile::tempdir().unwrap();
        write_output(case.path());
        let harvester = Harvester::new(case.path(), case.path().join("Results"), tag());

        harvester.harvest(100, None).unwrap();
        std::fs::write(harvester.forces_path(100), "kept\n").unwrap();

        let err = harvester.harvest(100, None).unwrap_err();
        assert!(matches!(err, SweepError::ArtifactExists { re: 100, .. }));
        assert_eq!(std::fs::read_to_string(harvester.forces_path(100)).unwrap(), "kept\n");
    }

    #[test]
    fn test_harvest_is_additive_across_re() {
        let case = tempfile::tempdir().unwrap();
        write_output(case.path());

        let a = Harvester::new(case.path(), case.path().join("A"), tag());
        a.harvest(100, None).unwrap();
        a.harvest(200, None).unwrap();

        let b = Harvester::new(case.path(), case.path().join("B"), tag());
        b.harvest(200, None).unwrap();
        b.harvest(100, None).unwrap();

        let tree_a = tree(&case.path().join("A"));
        assert_eq!(tree_a.len(), 4);
        assert_eq!(tree_a, tree(&case.path().join("B")));
    }

    #[test]
    fn test_missing_residuals_rolls_back_forces() {
        let case = tempfile::tempdir().unwrap();
        write_output(case.path());
        std::fs::remove_dir_all(case.path().join("postProcessing/residuals")).unwrap();
        let harvester = Harvester::new(case.path(), case.path().join("Results"), tag());

        let err = harvester.harvest(100, None).unwrap_err();
        assert!(matches!(
            err,
            SweepError::Filesystem {
                source: FsError::NoMatch { .. },
                ..
            }
        ));
        assert!(!harvester.forces_path(100).exists());
    }
}
