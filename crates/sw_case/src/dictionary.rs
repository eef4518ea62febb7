// crates/sw_case/src/dictionary.rs

//! 字典行编辑器
//!
//! 求解器算例文件由嵌套块中的 `property  value;` 行组成。本模块按行操作，
//! 不解析整个字典：命中的行被整行替换，其余字节原样保留。
//!
//! # 匹配规则
//!
//! 一行匹配键 `key`，当且仅当去掉行首空白后以 `key` 开头，且其后紧跟
//! 非字母数字字符或行尾。因此 `turbulence` 不会命中 `turbulenceProperties`。
//!
//! # 示例
//!
//! ```
//! use sw_case::dictionary::change_entry_in;
//!
//! let text = "RAS\n{\n    RASModel        kOmegaSST;\n}\n";
//! let edited = change_entry_in(text, "RASModel", "kEpsilon").unwrap();
//! assert_eq!(edited, "RAS\n{\n    RASModel kEpsilon;\n}\n");
//! ```

use std::path::Path;

use tracing::trace;

use crate::error::{CaseError, CaseResult};
use crate::store::CaseStore;

/// 判断一行是否以键 `key` 开头
pub fn line_matches_key(line: &str, key: &str) -> bool {
    if key.is_empty() {
        return false;
    }
    match line.trim_start().strip_prefix(key) {
        Some(rest) => rest.chars().next().map_or(true, |c| !c.is_alphanumeric()),
        None => false,
    }
}

/// 判断一行是否是名为 `name` 的块标题
///
/// 与 [`line_matches_key`] 不同，块名必须是完整的记号：行首第一个以空白或 `{`
/// 分隔的记号等于 `name`。因此 `inlet` 不会命中 `inlet_side` 或 `inlet.1`。
pub fn line_has_block_name(line: &str, name: &str) -> bool {
    !name.is_empty()
        && line
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '{')
            .next()
            == Some(name)
}

/// 行首空白
pub fn indent_of(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}

/// 构造 `<indent><key> <value>;` 条目行
pub fn entry_line(indent: &str, key: &str, value: &str) -> String {
    format!("{}{} {};", indent, key, value)
}

/// 按行切分并保留行尾
fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// 去掉 `//` 注释后统计花括号净增量
fn brace_delta(line: &str) -> i32 {
    let code = match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    };
    code.chars().fold(0, |depth, c| match c {
        '{' => depth + 1,
        '}' => depth - 1,
        _ => depth,
    })
}

/// 块的位置：标题行与右括号行（行号，含）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// 块名所在行
    pub header: usize,
    /// 右花括号所在行
    pub close: usize,
}

/// 在 `[start, end)` 行内，于嵌套深度 `depth` 处查找名为 `name` 的子块
///
/// 深度从文件开头起算；`depth = 0` 为顶层。
pub fn find_block(
    lines: &[&str],
    start: usize,
    end: usize,
    name: &str,
    depth: i32,
) -> Option<BlockSpan> {
    let end = end.min(lines.len());
    let mut current: i32 = lines[..start.min(lines.len())]
        .iter()
        .map(|l| brace_delta(l))
        .sum();

    let mut header = None;
    let mut opened = false;

    for (i, line) in lines.iter().enumerate().take(end).skip(start) {
        let before = current;
        current += brace_delta(line);

        if let Some(h) = header {
            if !opened {
                if current > depth {
                    opened = true;
                } else if !line.trim().is_empty() {
                    // 块名后面不是 `{`，说明命中的是普通条目
                    header = None;
                }
            }
            if header.is_some() {
                if opened && current == depth {
                    return Some(BlockSpan { header: h, close: i });
                }
                continue;
            }
        }

        if before == depth && line_has_block_name(line, name) {
            header = Some(i);
            opened = current > depth;
            // 单行块 `name { ... }`
            if !opened && line.contains('{') {
                return Some(BlockSpan { header: i, close: i });
            }
        }
    }
    None
}

/// 替换第一条匹配 `key` 的行，未找到返回 `None`
pub fn change_line_in(text: &str, key: &str, replacement: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len() + replacement.len());
    let mut replaced = false;

    for line in text.split_inclusive('\n') {
        if !replaced && line_matches_key(line, key) {
            out.push_str(replacement.trim_end_matches('\n'));
            out.push('\n');
            replaced = true;
        } else {
            out.push_str(line);
        }
    }

    replaced.then_some(out)
}

/// 替换第一条 `key` 条目的值，保留原缩进
pub fn change_entry_in(text: &str, key: &str, value: &str) -> Option<String> {
    let line = text.split_inclusive('\n').find(|l| line_matches_key(l, key))?;
    let replacement = entry_line(indent_of(line), key, value);
    change_line_in(text, key, &replacement)
}

/// 删除所有包含 `needle` 的行，返回新文本和删除行数
pub fn delete_lines_in(text: &str, needle: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut removed = 0;
    for line in text.split_inclusive('\n') {
        if line.contains(needle) {
            removed += 1;
        } else {
            out.push_str(line);
        }
    }
    (out, removed)
}

/// 在顶层块 `block` 内替换第一条 `key` 条目，保留原缩进
pub fn change_block_entry_in(text: &str, block: &str, key: &str, value: &str) -> Option<String> {
    let lines = split_lines(text);
    let span = find_block(&lines, 0, lines.len(), block, 0)?;

    let target = (span.header + 1..span.close).find(|&i| line_matches_key(lines[i], key))?;

    let mut out = String::with_capacity(text.len());
    for (i, line) in lines.iter().enumerate() {
        if i == target {
            out.push_str(&entry_line(indent_of(line), key, value));
            out.push('\n');
        } else {
            out.push_str(line);
        }
    }
    Some(out)
}

/// 基于存储后端的字典编辑器
///
/// 内容未变化时不写回，避免无谓地改动文件。
pub struct DictionaryEditor<'a, S: CaseStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: CaseStore + ?Sized> DictionaryEditor<'a, S> {
    /// 创建编辑器
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn commit(&self, file: &Path, before: &str, after: String) -> CaseResult<()> {
        if before != after {
            self.store.write(file, &after)?;
        }
        Ok(())
    }

    /// 用 `replacement` 整行替换第一条匹配 `key` 的行
    pub fn change_line(&self, file: &Path, key: &str, replacement: &str) -> CaseResult<()> {
        let text = self.store.read(file)?;
        let edited = change_line_in(&text, key, replacement)
            .ok_or_else(|| CaseError::key_not_found(self.store.locate(file), key))?;
        trace!("change_line {} [{}]", file.display(), key);
        self.commit(file, &text, edited)
    }

    /// 设置条目值，保留原缩进
    pub fn change_entry(&self, file: &Path, key: &str, value: &str) -> CaseResult<()> {
        let text = self.store.read(file)?;
        let edited = change_entry_in(&text, key, value)
            .ok_or_else(|| CaseError::key_not_found(self.store.locate(file), key))?;
        trace!("change_entry {} [{} = {}]", file.display(), key, value);
        self.commit(file, &text, edited)
    }

    /// 删除所有包含 `needle` 的行，返回删除行数
    pub fn delete_line(&self, file: &Path, needle: &str) -> CaseResult<usize> {
        let text = self.store.read(file)?;
        let (edited, removed) = delete_lines_in(&text, needle);
        self.commit(file, &text, edited)?;
        Ok(removed)
    }

    /// 设置顶层块 `block` 内的条目值
    pub fn change_block_entry(
        &self,
        file: &Path,
        block: &str,
        key: &str,
        value: &str,
    ) -> CaseResult<()> {
        let text = self.store.read(file)?;
        let edited = change_block_entry_in(&text, block, key, value).ok_or_else(|| {
            CaseError::key_not_found(self.store.locate(file), format!("{}.{}", block, key))
        })?;
        trace!("change_block_entry {} [{}.{} = {}]", file.display(), block, key, value);
        self.commit(file, &text, edited)
    }
}
