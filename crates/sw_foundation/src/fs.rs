// crates/sw_foundation/src/fs.rs

//! 作用域文件系统原语
//!
//! 提供算例目录清理和结果归档所需的最小操作集合：
//!
//! - [`make_folder`]: 幂等创建目录
//! - [`rm_folder`] / [`rm_file`]: 按通配模式删除，无匹配不是错误
//! - [`copy_files`]: 单文件或多文件合并复制，逐文件剥离表头行
//! - [`write_atomic`]: 临时文件 + 重命名的整文件重写
//!
//! 通配展开结果按路径字典序排列，保证多文件合并的输出是确定的。

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{FsError, FsResult};

/// 将相对模式拼接到根目录下，根目录中的通配元字符会被转义
pub fn case_pattern(root: &Path, relative: &str) -> String {
    let escaped = glob::Pattern::escape(&root.to_string_lossy());
    if escaped.is_empty() {
        relative.to_string()
    } else if escaped.ends_with('/') {
        format!("{}{}", escaped, relative)
    } else {
        format!("{}/{}", escaped, relative)
    }
}

/// 展开通配模式，结果按字典序排序
///
/// 无法读取的条目会被记录并跳过。
pub fn expand(pattern: &str) -> FsResult<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|e| FsError::Pattern {
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })?;

    let mut matches = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => matches.push(path),
            Err(e) => warn!("Skipping unreadable path {}: {}", e.path().display(), e.error()),
        }
    }
    matches.sort();
    Ok(matches)
}

/// 创建目录（含父目录），已存在时直接成功
pub fn make_folder(path: impl AsRef<Path>) -> FsResult<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| FsError::io(path, e))
}

/// 递归删除所有匹配的目录，返回删除数量
///
/// 匹配到的普通文件会被忽略，由 [`rm_file`] 处理。
pub fn rm_folder(pattern: &str) -> FsResult<usize> {
    let mut removed = 0;
    for path in expand(pattern)? {
        if !path.is_dir() {
            debug!("rm_folder: skipping non-directory {}", path.display());
            continue;
        }
        fs::remove_dir_all(&path).map_err(|e| FsError::io(&path, e))?;
        debug!("Removed folder {}", path.display());
        removed += 1;
    }
    Ok(removed)
}

/// 删除所有匹配的文件，返回删除数量
///
/// 匹配到的目录会被忽略，由 [`rm_folder`] 处理。
pub fn rm_file(pattern: &str) -> FsResult<usize> {
    let mut removed = 0;
    for path in expand(pattern)? {
        if path.is_dir() {
            debug!("rm_file: skipping directory {}", path.display());
            continue;
        }
        fs::remove_file(&path).map_err(|e| FsError::io(&path, e))?;
        debug!("Removed file {}", path.display());
        removed += 1;
    }
    Ok(removed)
}

/// 去掉文本的前 `lines` 行
///
/// 行数不足时返回空串。
pub fn strip_header(text: &str, lines: usize) -> &str {
    let mut rest = text;
    for _ in 0..lines {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}

/// 复制匹配 `source_glob` 的文件到 `destination`
///
/// 每个源文件先剥离前 `header_lines` 行，再按字典序拼接为一个输出文件。
/// 已存在的目标会被覆盖；返回参与合并的源文件数量。
pub fn copy_files(
    source_glob: &str,
    destination: impl AsRef<Path>,
    header_lines: usize,
) -> FsResult<usize> {
    copy_impl(source_glob, destination.as_ref(), header_lines, false)
}

/// 与 [`copy_files`] 相同，但目标已存在时返回 [`FsError::AlreadyExists`] 且不改动目标
pub fn copy_files_exclusive(
    source_glob: &str,
    destination: impl AsRef<Path>,
    header_lines: usize,
) -> FsResult<usize> {
    copy_impl(source_glob, destination.as_ref(), header_lines, true)
}

fn copy_impl(
    source_glob: &str,
    destination: &Path,
    header_lines: usize,
    exclusive: bool,
) -> FsResult<usize> {
    let sources: Vec<PathBuf> = expand(source_glob)?
        .into_iter()
        .filter(|p| p.is_file())
        .collect();

    if sources.is_empty() {
        return Err(FsError::NoMatch {
            pattern: source_glob.to_string(),
        });
    }

    if exclusive && destination.exists() {
        return Err(FsError::AlreadyExists {
            path: destination.to_path_buf(),
        });
    }

    let mut merged = String::new();
    for (i, source) in sources.iter().enumerate() {
        let text = fs::read_to_string(source).map_err(|e| FsError::io(source, e))?;
        let body = strip_header(&text, header_lines);
        merged.push_str(body);
        // 相邻文件之间保证换行分隔
        if i + 1 < sources.len() && !body.is_empty() && !body.ends_with('\n') {
            merged.push('\n');
        }
    }

    if exclusive {
        write_new(destination, &merged)?;
    } else {
        write_atomic(destination, &merged)?;
    }

    debug!(
        "Copied {} file(s) matching {} -> {}",
        sources.len(),
        source_glob,
        destination.display()
    );
    Ok(sources.len())
}

/// 整文件原子重写：写入同目录临时文件后重命名覆盖
pub fn write_atomic(path: impl AsRef<Path>, contents: &str) -> FsResult<()> {
    let path = path.as_ref();
    let tmp = temp_sibling(path);

    fs::write(&tmp, contents).map_err(|e| FsError::io(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(FsError::io(path, e));
    }
    Ok(())
}

/// 独占创建并写入新文件，目标已存在时失败
pub fn write_new(path: impl AsRef<Path>, contents: &str) -> FsResult<()> {
    let path = path.as_ref();
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                FsError::AlreadyExists {
                    path: path.to_path_buf(),
                }
            } else {
                FsError::io(path, e)
            }
        })?;
    file.write_all(contents.as_bytes())
        .and_then(|_| file.sync_all())
        .map_err(|e| FsError::io(path, e))
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, text: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_make_folder_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Results/forces_x");

        make_folder(&target).unwrap();
        make_folder(&target).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_rm_folder_glob() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["processor0", "processor1", "processor2"] {
            write(&dir.path().join(name).join("boundary"), "x");
        }
        write(&dir.path().join("processorNotes"), "a file, not a folder");

        let removed = rm_folder(&case_pattern(dir.path(), "processor*")).unwrap();
        assert_eq!(removed, 3);
        assert!(!dir.path().join("processor0").exists());
        assert!(dir.path().join("processorNotes").exists());
    }

    #[test]
    fn test_rm_missing_is_not_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(rm_folder(&case_pattern(dir.path(), "postProcessing")).unwrap(), 0);
        assert_eq!(rm_file(&case_pattern(dir.path(), "log*")).unwrap(), 0);
    }

    #[test]
    fn test_rm_file_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("log.simpleFoam"), "x");
        write(&dir.path().join("log_decompose"), "x");
        fs::create_dir_all(dir.path().join("logs")).unwrap();

        let removed = rm_file(&case_pattern(dir.path(), "log*")).unwrap();
        assert_eq!(removed, 2);
        assert!(dir.path().join("logs").is_dir());
    }

    #[test]
    fn test_case_pattern_escapes_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("case[1]");
        write(&root.join("log_run"), "x");

        let removed = rm_file(&case_pattern(&root, "log*")).unwrap();
        assert_eq!(removed, 1);
    }

    #[test]
    fn test_strip_header() {
        assert_eq!(strip_header("a\nb\nc\n", 0), "a\nb\nc\n");
        assert_eq!(strip_header("a\nb\nc\n", 2), "c\n");
        assert_eq!(strip_header("a\nb\n", 5), "");
    }

    #[test]
    fn test_copy_single_strips_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut text = String::new();
        for i in 0..9 {
            text.push_str(&format!("# header {}\n", i));
        }
        text.push_str("1\t0.1\t0.5\n2\t0.1\t0.4\n");
        write(&dir.path().join("postProcessing/forces/0/forceCoeffs.dat"), &text);

        let dest = dir.path().join("out.dat");
        let n = copy_files(
            &case_pattern(dir.path(), "postProcessing/forces/**/*.dat"),
            &dest,
            9,
        )
        .unwrap();

        assert_eq!(n, 1);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "1\t0.1\t0.5\n2\t0.1\t0.4\n");
    }

    #[test]
    fn test_copy_merges_in_lexicographic_order() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("src/c.dat"), "H0\nC\n");
        write(&dir.path().join("src/a.dat"), "H0\nA\n");
        write(&dir.path().join("src/b.dat"), "H0\nB\n");

        let dest = dir.path().join("merged.dat");
        let n = copy_files(&case_pattern(dir.path(), "src/*.dat"), &dest, 1).unwrap();

        assert_eq!(n, 3);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "A\nB\nC\n");
    }

    #[test]
    fn test_copy_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_files(
            &case_pattern(dir.path(), "postProcessing/**/*.dat"),
            dir.path().join("out.dat"),
            2,
        )
        .unwrap_err();
        assert!(err.is_no_match());
    }

    #[test]
    fn test_copy_exclusive_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("src/a.dat"), "H\nnew\n");
        let dest = dir.path().join("Re_100.dat");
        write(&dest, "old\n");

        let err = copy_files_exclusive(&case_pattern(dir.path(), "src/*.dat"), &dest, 1)
            .unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old\n");
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("controlDict");
        write(&path, "old");

        write_atomic(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");

        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }
}
