// crates/sw_case/src/solution.rs

//! 求解器算例文件抽象
//!
//! - [`SolutionDirectory`]: 时间目录的查询与清理
//! - [`SolutionFile`]: 初始场文件中单个边界条目的改写
//!
//! `replace_boundary` 会把旧的 `value` 行注释掉并带上 [`REMOVED_MARKER`]，
//! 调用方随后通过删除含该标记的行完成清理。

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dictionary::{find_block, indent_of, line_has_block_name, line_matches_key, BlockSpan};
use crate::error::{CaseError, CaseResult};
use crate::store::CaseStore;

/// 被替换的旧条目所带的临时标记
pub const REMOVED_MARKER: &str = "SweepRemoved";

/// 初始时间目录名
pub const INITIAL_TIME: &str = "0";

/// 格式化标量
///
/// 量级在 [1e-3, 1e6) 内用十进制，其余用指数形式，避免小量丢失精度。
pub fn format_scalar(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 || (1e-3..1e6).contains(&magnitude) {
        format!("{}", value)
    } else {
        format!("{:e}", value)
    }
}

/// 格式化向量 `(x y z)`
pub fn format_vector(x: f64, y: f64, z: f64) -> String {
    format!("({} {} {})", format_scalar(x), format_scalar(y), format_scalar(z))
}

/// 算例目录（时间目录视图）
#[derive(Debug, Clone)]
pub struct SolutionDirectory {
    root: PathBuf,
}

impl SolutionDirectory {
    /// 打开算例目录
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 算例根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 初始时间目录 `0/`
    pub fn initial_dir(&self) -> PathBuf {
        self.root.join(INITIAL_TIME)
    }

    /// 所有以数字命名的时间目录，按时间升序
    pub fn time_dirs(&self) -> CaseResult<Vec<(f64, PathBuf)>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| CaseError::io(&self.root, e))?;

        let mut dirs = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| CaseError::io(&self.root, e))?.path();
            if !path.is_dir() {
                continue;
            }
            let time = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.parse::<f64>().ok())
                .filter(|t| t.is_finite());
            if let Some(time) = time {
                dirs.push((time, path));
            }
        }

        dirs.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(dirs)
    }

    /// 最新时间目录名
    pub fn latest_time(&self) -> CaseResult<Option<String>> {
        Ok(self.time_dirs()?.last().and_then(|(_, path)| {
            path.file_name().map(|n| n.to_string_lossy().into_owned())
        }))
    }

    /// 删除初始时间目录以外的所有时间目录，返回删除数量
    pub fn clear_results(&self) -> CaseResult<usize> {
        let dirs = self.time_dirs()?;
        let mut removed = 0;
        for (_, path) in dirs.iter().skip(1) {
            std::fs::remove_dir_all(path).map_err(|e| CaseError::io(path, e))?;
            debug!("Removed time directory {}", path.display());
            removed += 1;
        }
        Ok(removed)
    }
}

/// 初始场文件 `0/<field>`
#[derive(Debug, Clone)]
pub struct SolutionFile {
    field: String,
}

impl SolutionFile {
    /// 指定场名
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// 场名
    pub fn field(&self) -> &str {
        &self.field
    }

    /// 相对算例根目录的路径
    pub fn path(&self) -> PathBuf {
        Path::new(INITIAL_TIME).join(&self.field)
    }

    /// 将边界 `boundary` 的值改为 `uniform <value_text>`
    ///
    /// 旧的 `value` 行被注释并带上 [`REMOVED_MARKER`]；边界不存在时返回键缺失错误。
    pub fn replace_boundary<S: CaseStore + ?Sized>(
        &self,
        store: &S,
        boundary: &str,
        value_text: &str,
    ) -> CaseResult<()> {
        let path = self.path();
        let text = store.read(&path)?;
        let edited = replace_boundary_in(&text, boundary, value_text).ok_or_else(|| {
            CaseError::key_not_found(store.locate(&path), format!("boundaryField.{}", boundary))
        })?;
        store.write(&path, &edited)
    }
}

/// 边界条目改写的纯文本实现
pub fn replace_boundary_in(text: &str, boundary: &str, value_text: &str) -> Option<String> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let field = find_block(&lines, 0, lines.len(), "boundaryField", 0)?;
    let patch = find_block(&lines, field.header + 1, field.close, boundary, 1)?;

    let new_value = |indent: &str| format!("{}value uniform {};\n", indent, value_text);

    // 单行块 `inlet { type fixedValue; value uniform 1; }` 就地改写
    if patch.header == patch.close {
        let edited = replace_inline_value(lines[patch.header], value_text)?;
        let mut out = String::with_capacity(text.len() + value_text.len());
        for (i, line) in lines.iter().enumerate() {
            out.push_str(if i == patch.header { edited.as_str() } else { *line });
        }
        return Some(out);
    }

    let mut out = String::with_capacity(text.len() + value_text.len() + 32);
    match value_line(&lines, patch) {
        Some(target) => {
            for (i, line) in lines.iter().enumerate() {
                if i == target {
                    let indent = indent_of(line);
                    out.push_str(&format!(
                        "{}//{}: {}\n",
                        indent,
                        REMOVED_MARKER,
                        line.trim()
                    ));
                    out.push_str(&new_value(indent));
                } else {
                    out.push_str(line);
                }
            }
        }
        None => {
            let indent = format!("{}    ", indent_of(lines[patch.header]));
            for (i, line) in lines.iter().enumerate() {
                if i == patch.close {
                    out.push_str(&new_value(&indent));
                }
                out.push_str(line);
            }
        }
    }
    Some(out)
}

/// 改写单行块中的 `value` 条目，没有则追加到右括号之前
fn replace_inline_value(line: &str, value_text: &str) -> Option<String> {
    let open = line.find('{')?;
    let close = line.rfind('}').filter(|&c| c > open)?;

    let value = format!("value uniform {}", value_text);
    let mut replaced = false;
    let mut entries: Vec<String> = line[open + 1..close]
        .split(';')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(|e| {
            if !replaced && line_has_block_name(e, "value") {
                replaced = true;
                value.clone()
            } else {
                e.to_string()
            }
        })
        .collect();
    if !replaced {
        entries.push(value);
    }

    let body: String = entries.iter().map(|e| format!(" {};", e)).collect();
    Some(format!("{}{{{} }}{}", &line[..open], body, &line[close + 1..]))
}

fn value_line(lines: &[&str], patch: BlockSpan) -> Option<usize> {
    (patch.header + 1..patch.close).find(|&i| line_matches_key(lines[i], "value"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCase;

    const U_FIELD: &str = "\
internalField   uniform (0 0 0);

boundaryField
{
    inlet
    {
        type            fixedValue;
        value           uniform (0 1 0);
    }

    outlet
    {
        type            zeroGradient;
    }
}
";

    #[test]
    fn test_format_scalar() {
        assert_eq!(format_scalar(0.0), "0");
        assert_eq!(format_scalar(0.5), "0.5");
        assert_eq!(format_scalar(1.5e-7), "1.5e-7");
        assert_eq!(format_vector(0.0, 2.0, 0.0), "(0 2 0)");
    }

    #[test]
    fn test_replace_boundary_marks_old_value() {
        let edited = replace_boundary_in(U_FIELD, "inlet", "(0 2 0)").unwrap();
        assert!(edited.contains("        //SweepRemoved: value           uniform (0 1 0);\n"));
        assert!(edited.contains("        value uniform (0 2 0);\n"));
        // internalField 不变
        assert!(edited.starts_with("internalField   uniform (0 0 0);"));
    }

    #[test]
    fn test_replace_boundary_inserts_missing_value() {
        let edited = replace_boundary_in(U_FIELD, "outlet", "(0 0 0)").unwrap();
        assert!(edited.contains(
            "        type            zeroGradient;\n        value uniform (0 0 0);\n    }"
        ));
        assert!(!edited.contains(REMOVED_MARKER));
    }

    #[test]
    fn test_replace_boundary_exact_patch_name() {
        let text = "\
boundaryField
{
    inlet_side
    {
        type            fixedValue;
        value           uniform 9;
    }
    inlet
    {
        type            fixedValue;
        value           uniform 1;
    }
}
";
        let edited = replace_boundary_in(text, "inlet", "2").unwrap();
        assert!(edited.contains(
            "    inlet_side\n    {\n        type            fixedValue;\n        value           uniform 9;\n    }"
        ));
        assert!(edited.contains("        //SweepRemoved: value           uniform 1;\n        value uniform 2;\n    }\n}"));
        assert_eq!(edited.matches(REMOVED_MARKER).count(), 1);

        assert!(replace_boundary_in(text, "inlet_s", "2").is_none());
    }

    #[test]
    fn test_replace_boundary_single_line_patch() {
        let text = "\
boundaryField
{
    inlet { type fixedValue; value uniform 1; }
    outlet { type zeroGradient; }
}
";
        let edited = replace_boundary_in(text, "inlet", "2").unwrap();
        assert_eq!(
            edited,
            "boundaryField\n{\n    inlet { type fixedValue; value uniform 2; }\n    outlet { type zeroGradient; }\n}\n"
        );
        assert_eq!(replace_boundary_in(&edited, "inlet", "2").unwrap(), edited);

        let edited = replace_boundary_in(text, "outlet", "0").unwrap();
        assert!(edited.contains("    outlet { type zeroGradient; value uniform 0; }\n"));
        assert!(edited.contains("    inlet { type fixedValue; value uniform 1; }\n"));
    }

    #[test]
    fn test_replace_boundary_unknown_patch() {
        assert!(replace_boundary_in(U_FIELD, "monkey", "(0 0 0)").is_none());

        let case = MemoryCase::new().with_file("0/U", U_FIELD);
        let err = SolutionFile::new("U")
            .replace_boundary(&case, "monkey", "(0 0 0)")
            .unwrap_err();
        assert!(err.is_key_not_found());
    }

    #[test]
    fn test_time_dirs_and_clear_results() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["0", "100", "2000", "50.5", "constant", "0.orig"] {
            std::fs::create_dir_all(dir.path().join(name)).unwrap();
        }

        let solution = SolutionDirectory::new(dir.path());
        let times: Vec<f64> = solution.time_dirs().unwrap().iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![0.0, 50.5, 100.0, 2000.0]);
        assert_eq!(solution.latest_time().unwrap().as_deref(), Some("2000"));

        assert_eq!(solution.clear_results().unwrap(), 3);
        assert!(solution.initial_dir().is_dir());
        assert!(dir.path().join("constant").is_dir());
        assert!(dir.path().join("0.orig").is_dir());
        assert_eq!(solution.latest_time().unwrap().as_deref(), Some("0"));
    }
}
