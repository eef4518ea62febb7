// crates/sw_case/src/lock.rs

//! 算例锁
//!
//! 在算例根目录创建 `.sweep.lock`（独占创建，内容为进程号），
//! 防止两个扫描同时改写同一算例。锁在 drop 时释放。

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{CaseError, CaseResult};

/// 锁文件名
pub const LOCK_FILE: &str = ".sweep.lock";

/// 算例锁守卫
#[derive(Debug)]
pub struct CaseLock {
    path: PathBuf,
}

impl CaseLock {
    /// 获取算例锁，已被持有时返回 [`CaseError::Locked`]
    pub fn acquire(case_root: impl AsRef<Path>) -> CaseResult<Self> {
        let path = case_root.as_ref().join(LOCK_FILE);

        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                let holder = std::fs::read_to_string(&path)
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "unknown".to_string());
                return Err(CaseError::Locked { path, holder });
            }
            Err(e) => return Err(CaseError::io(&path, e)),
        };

        writeln!(file, "{}", std::process::id()).map_err(|e| CaseError::io(&path, e))?;
        debug!("Acquired case lock {}", path.display());
        Ok(Self { path })
    }

    /// 锁文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CaseLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to release case lock {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_is_exclusive_and_released() {
        let dir = tempfile::tempdir().unwrap();

        let lock = CaseLock::acquire(dir.path()).unwrap();
        assert!(lock.path().exists());

        let err = CaseLock::acquire(dir.path()).unwrap_err();
        match err {
            CaseError::Locked { holder, .. } => {
                assert_eq!(holder, std::process::id().to_string());
            }
            other => panic!("unexpected error: {other}"),
        }

        drop(lock);
        assert!(!dir.path().join(LOCK_FILE).exists());
        let _again = CaseLock::acquire(dir.path()).unwrap();
    }
}
