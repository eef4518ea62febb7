// crates/sw_case/src/case.rs

//! 算例模型
//!
//! 在字典编辑器和初始场文件抽象之上提供带类型的设置器。
//! 所有设置器都是幂等的：同一值重复设置得到逐字节相同的文件。

use std::path::Path;

use tracing::debug;

use crate::dictionary::DictionaryEditor;
use crate::error::{CaseError, CaseResult};
use crate::solution::{format_scalar, format_vector, SolutionFile, REMOVED_MARKER};
use crate::store::CaseStore;
use crate::types::{DecompositionMethod, TurbulenceField, TurbulenceType};

/// 湍流属性字典
pub const TURBULENCE_PROPERTIES: &str = "constant/turbulenceProperties";
/// 控制字典
pub const CONTROL_DICT: &str = "system/controlDict";
/// 分解字典
pub const DECOMPOSE_PAR_DICT: &str = "system/decomposeParDict";
/// 默认入口边界名
pub const DEFAULT_INLET_PATCH: &str = "inlet";

/// 算例模型
pub struct CaseModel<S: CaseStore> {
    store: S,
    inlet_patch: String,
}

impl<S: CaseStore> CaseModel<S> {
    /// 基于存储后端创建模型
    pub fn new(store: S) -> Self {
        Self {
            store,
            inlet_patch: DEFAULT_INLET_PATCH.to_string(),
        }
    }

    /// 设置入口边界名
    pub fn with_inlet_patch(mut self, patch: impl Into<String>) -> Self {
        self.inlet_patch = patch.into();
        self
    }

    /// 入口边界名
    pub fn inlet_patch(&self) -> &str {
        &self.inlet_patch
    }

    /// 存储后端
    pub fn store(&self) -> &S {
        &self.store
    }

    fn editor(&self) -> DictionaryEditor<'_, S> {
        DictionaryEditor::new(&self.store)
    }

    /// 写入 `simulationType`、`RASModel` 和 `turbulence` 开关
    ///
    /// 层流时模型名照写，但求解器会忽略它。
    pub fn set_turbulence_mode(&self, kind: TurbulenceType, model: &str) -> CaseResult<()> {
        let file = Path::new(TURBULENCE_PROPERTIES);
        let editor = self.editor();
        editor.change_entry(file, "simulationType", kind.as_str())?;
        editor.change_entry(file, "RASModel", model)?;
        editor.change_entry(file, "turbulence", kind.switch())?;
        debug!("Turbulence mode: {} ({})", kind, model);
        Ok(())
    }

    /// 以字符串形式设置湍流模式，非 `laminar`/`RAS` 返回不支持错误
    pub fn set_turbulence_mode_named(&self, kind: &str, model: &str) -> CaseResult<()> {
        self.set_turbulence_mode(kind.parse()?, model)
    }

    /// 更新分解字典：子域数、方法以及方法的 `n` 系数
    pub fn set_decomposition(
        &self,
        n_proc: u32,
        method: DecompositionMethod,
        coeffs: [u32; 3],
    ) -> CaseResult<()> {
        if method.uses_coeffs() && coeffs.iter().product::<u32>() != n_proc {
            return Err(CaseError::InvalidDecomposition { n_proc, coeffs });
        }

        let file = Path::new(DECOMPOSE_PAR_DICT);
        let editor = self.editor();
        editor.change_entry(file, "numberOfSubdomains", &n_proc.to_string())?;
        editor.change_entry(file, "method", method.as_str())?;
        if let Some(block) = method.coeffs_block() {
            let tuple = format!("({} {} {})", coeffs[0], coeffs[1], coeffs[2]);
            editor.change_block_entry(file, block, "n", &tuple)?;
        }
        Ok(())
    }

    /// 将入口速度设为 `(0 value 0)`（入口沿 +Y）
    pub fn set_inlet_velocity(&self, value: f64) -> CaseResult<()> {
        let field = SolutionFile::new("U");
        field.replace_boundary(&self.store, &self.inlet_patch, &format_vector(0.0, value, 0.0))?;
        self.editor().delete_line(&field.path(), REMOVED_MARKER)?;
        Ok(())
    }

    /// 为湍流场的各边界设置标量值，并同步 `internalField`
    pub fn set_turbulence_boundary(
        &self,
        field: TurbulenceField,
        boundaries: &[&str],
        value: f64,
    ) -> CaseResult<()> {
        let file = SolutionFile::new(field.file_name());
        let text = format_scalar(value);

        for boundary in boundaries {
            file.replace_boundary(&self.store, boundary, &text)?;
        }

        let editor = self.editor();
        editor.delete_line(&file.path(), REMOVED_MARKER)?;
        editor.change_entry(&file.path(), "internalField", &format!("uniform {}", text))?;
        Ok(())
    }

    /// 更新力系数归一化用的 `magUInf`
    pub fn set_freestream_magnitude(&self, value: f64) -> CaseResult<()> {
        self.editor()
            .change_entry(Path::new(CONTROL_DICT), "magUInf", &format_scalar(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCase;
    use std::path::PathBuf;

    fn fixture_case() -> CaseModel<MemoryCase> {
        let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/case");
        CaseModel::new(MemoryCase::load_from(fixture).unwrap())
    }

    fn read(case: &CaseModel<MemoryCase>, rel: &str) -> String {
        case.store().get(rel).unwrap()
    }

    #[test]
    fn test_laminar_mode() {
        let case = fixture_case();
        case.set_turbulence_mode_named("laminar", "no").unwrap();

        let text = read(&case, TURBULENCE_PROPERTIES);
        assert!(text.contains("simulationType laminar;"));
        assert!(text.contains("RASModel no;"));
        assert!(text.contains("turbulence off;"));
        // printCoeffs 与文件头不受影响
        assert!(text.contains("    printCoeffs     on;"));
        assert!(text.contains("object      turbulenceProperties;"));
    }

    #[test]
    fn test_ras_mode() {
        let case = fixture_case();
        case.set_turbulence_mode(TurbulenceType::Laminar, "no").unwrap();
        case.set_turbulence_mode_named("RAS", "kEpsilon").unwrap();

        let text = read(&case, TURBULENCE_PROPERTIES);
        assert!(text.contains("simulationType RAS;"));
        assert!(text.contains("RASModel kEpsilon;"));
        assert!(text.contains("turbulence on;"));
    }

    #[test]
    fn test_unsupported_mode() {
        let case = fixture_case();
        let before = read(&case, TURBULENCE_PROPERTIES);
        let err = case.set_turbulence_mode_named("LES", "Smagorinsky").unwrap_err();
        assert!(matches!(err, CaseError::UnsupportedTurbulence { .. }));
        assert_eq!(read(&case, TURBULENCE_PROPERTIES), before);
    }

    #[test]
    fn test_decomposition() {
        let case = fixture_case();
        case.set_decomposition(4, DecompositionMethod::Hierarchical, [2, 2, 1])
            .unwrap();

        let text = read(&case, DECOMPOSE_PAR_DICT);
        assert!(text.contains("numberOfSubdomains 4;"));
        assert!(text.contains("method hierarchical;"));
        assert!(text.contains("hierarchicalCoeffs\n{\n    n (2 2 1);"));
        assert!(text.contains("simpleCoeffs\n{\n    n               (2 1 1);"));

        let err = case
            .set_decomposition(4, DecompositionMethod::Simple, [2, 2, 2])
            .unwrap_err();
        assert!(matches!(err, CaseError::InvalidDecomposition { .. }));

        // scotch 没有系数块，系数被忽略
        case.set_decomposition(8, DecompositionMethod::Scotch, [1, 1, 1]).unwrap();
        assert!(read(&case, DECOMPOSE_PAR_DICT).contains("method scotch;"));
    }

    #[test]
    fn test_inlet_velocity_idempotent() {
        let case = fixture_case();
        case.set_inlet_velocity(0.25).unwrap();
        let once = read(&case, "0/U");
        case.set_inlet_velocity(0.25).unwrap();
        let twice = read(&case, "0/U");

        assert_eq!(once, twice);
        assert!(once.contains("value uniform (0 0.25 0);"));
        assert!(!once.contains(REMOVED_MARKER));
        assert!(once.contains("internalField   uniform (0 0 0);"));
    }

    #[test]
    fn test_turbulence_boundary() {
        let case = fixture_case();
        case.set_turbulence_boundary(TurbulenceField::K, &["inlet", "monkey"], 2.5e-7)
            .unwrap();

        let text = read(&case, "0/k");
        assert!(text.contains("internalField uniform 2.5e-7;"));
        assert_eq!(text.matches("value uniform 2.5e-7;").count(), 2);
        assert!(!text.contains(REMOVED_MARKER));

        let err = case
            .set_turbulence_boundary(TurbulenceField::Omega, &["farfield"], 1.0)
            .unwrap_err();
        assert!(err.is_key_not_found());
    }

    #[test]
    fn test_freestream_magnitude() {
        let case = fixture_case();
        case.set_freestream_magnitude(0.5).unwrap();
        let text = read(&case, CONTROL_DICT);
        assert!(text.contains("        magUInf 0.5;\n"));
        assert!(text.contains("        lRef            0.8;"));
    }
}
