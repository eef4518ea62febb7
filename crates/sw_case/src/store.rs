// crates/sw_case/src/store.rs

//! 算例存储后端
//!
//! 算例模型的所有文本读写都经过 [`CaseStore`]，以便测试时用内存算例树替换磁盘。
//!
//! - [`FileCase`]: 以目录为根的磁盘算例，整文件原子重写
//! - [`MemoryCase`]: 内存算例树

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sw_foundation::fs::write_atomic;

use crate::error::{CaseError, CaseResult};

/// 算例存储后端trait
///
/// 所有路径都相对于算例根目录。
pub trait CaseStore: Send + Sync {
    /// 读取整个文件
    fn read(&self, rel: &Path) -> CaseResult<String>;

    /// 整文件重写
    fn write(&self, rel: &Path, contents: &str) -> CaseResult<()>;

    /// 文件是否存在
    fn exists(&self, rel: &Path) -> bool;

    /// 用于错误信息的显示路径
    fn locate(&self, rel: &Path) -> PathBuf {
        rel.to_path_buf()
    }
}

/// 磁盘算例
#[derive(Debug, Clone)]
pub struct FileCase {
    root: PathBuf,
}

impl FileCase {
    /// 以 `root` 为算例根目录
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 算例根目录
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CaseStore for FileCase {
    fn read(&self, rel: &Path) -> CaseResult<String> {
        let path = self.root.join(rel);
        std::fs::read_to_string(&path).map_err(|e| CaseError::io(&path, e))
    }

    fn write(&self, rel: &Path, contents: &str) -> CaseResult<()> {
        write_atomic(self.root.join(rel), contents)?;
        Ok(())
    }

    fn exists(&self, rel: &Path) -> bool {
        self.root.join(rel).is_file()
    }

    fn locate(&self, rel: &Path) -> PathBuf {
        self.root.join(rel)
    }
}

/// 内存算例
#[derive(Debug, Default)]
pub struct MemoryCase {
    files: RwLock<BTreeMap<PathBuf, String>>,
}

impl MemoryCase {
    /// 创建空算例
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加文件（构建器形式）
    pub fn with_file(self, rel: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(rel, contents);
        self
    }

    /// 插入或替换文件
    pub fn insert(&self, rel: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.write().insert(rel.into(), contents.into());
    }

    /// 获取文件内容
    pub fn get(&self, rel: impl AsRef<Path>) -> Option<String> {
        self.files.read().get(rel.as_ref()).cloned()
    }

    /// 文件数量
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    /// 从磁盘目录递归加载所有文本文件
    pub fn load_from(root: impl AsRef<Path>) -> CaseResult<Self> {
        let root = root.as_ref();
        let case = Self::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir).map_err(|e| CaseError::io(&dir, e))? {
                let path = entry.map_err(|e| CaseError::io(&dir, e))?.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                let text = std::fs::read_to_string(&path).map_err(|e| CaseError::io(&path, e))?;
                let rel = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                case.insert(rel, text);
            }
        }

        Ok(case)
    }
}

impl CaseStore for MemoryCase {
    fn read(&self, rel: &Path) -> CaseResult<String> {
        self.files.read().get(rel).cloned().ok_or_else(|| {
            CaseError::io(
                rel,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file in memory case"),
            )
        })
    }

    fn write(&self, rel: &Path, contents: &str) -> CaseResult<()> {
        self.files.write().insert(rel.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, rel: &Path) -> bool {
        self.files.read().contains_key(rel)
    }
}

impl<S: CaseStore + ?Sized> CaseStore for &S {
    fn read(&self, rel: &Path) -> CaseResult<String> {
        (**self).read(rel)
    }

    fn write(&self, rel: &Path, contents: &str) -> CaseResult<()> {
        (**self).write(rel, contents)
    }

    fn exists(&self, rel: &Path) -> bool {
        (**self).exists(rel)
    }

    fn locate(&self, rel: &Path) -> PathBuf {
        (**self).locate(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_case() {
        let case = MemoryCase::new().with_file("system/controlDict", "magUInf 1;\n");

        assert_eq!(case.len(), 1);
        assert!(case.exists(Path::new("system/controlDict")));
        assert!(!case.exists(Path::new("0/U")));

        case.write(Path::new("0/U"), "internalField uniform (0 0 0);\n").unwrap();
        assert_eq!(case.len(), 2);
        assert!(case.read(Path::new("0/U")).unwrap().contains("internalField"));

        let err = case.read(Path::new("0/k")).unwrap_err();
        assert!(matches!(err, CaseError::Io { .. }));
    }

    #[test]
    fn test_file_case_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("system")).unwrap();
        let case = FileCase::new(dir.path());

        case.write(Path::new("system/controlDict"), "endTime 10;\n").unwrap();
        assert!(case.exists(Path::new("system/controlDict")));
        assert_eq!(case.read(Path::new("system/controlDict")).unwrap(), "endTime 10;\n");
        assert_eq!(
            case.locate(Path::new("system/controlDict")),
            dir.path().join("system/controlDict")
        );
    }

    #[test]
    fn test_load_from_fixture() {
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/case");
        let case = MemoryCase::load_from(&fixture).unwrap();

        assert!(case.exists(Path::new("0/U")));
        assert!(case.exists(Path::new("constant/turbulenceProperties")));
        assert!(case.exists(Path::new("system/decomposeParDict")));
    }
}
