//! 工作区路径规范化
//!
//! 服务端与编辑器标签页使用的路径形式各不相同（`file://` URI、绝对路径、
//! 带查询串的链接、git 转义路径），这里统一转换成相对工作区根目录的形式。

const FILE_SCHEME: &str = "file://";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathHelpers {
    root: String,
}

impl PathHelpers {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn set_root(&mut self, root: impl Into<String>) {
        self.root = root.into();
    }

    /// Workspace-relative form of `input`.
    pub fn normalize(&self, input: &str) -> String {
        let without_scheme = input.strip_prefix(FILE_SCHEME).unwrap_or(input);
        let unquoted = unquote_git_path(strip_query_and_hash(without_scheme));
        let mut path = unquoted.as_str();

        let root = self.root.trim_end_matches('/');
        if !root.is_empty() {
            if path == root {
                return String::new();
            }
            if let Some(rest) = path
                .strip_prefix(root)
                .and_then(|rest| rest.strip_prefix('/'))
            {
                path = rest;
            }
        }

        while let Some(rest) = path.strip_prefix("./") {
            path = rest;
        }
        path.trim_start_matches('/').to_string()
    }

    pub fn normalize_dir(&self, input: &str) -> String {
        self.normalize(input).trim_end_matches('/').to_string()
    }

    pub fn tab(&self, input: &str) -> String {
        format!("{FILE_SCHEME}{}", self.normalize(input))
    }

    pub fn path_from_tab(&self, tab: &str) -> Option<String> {
        if !tab.starts_with(FILE_SCHEME) {
            return None;
        }
        Some(self.normalize(tab))
    }
}

pub fn strip_query_and_hash(input: &str) -> &str {
    match input.find(|ch| ch == '?' || ch == '#') {
        Some(idx) => &input[..idx],
        None => input,
    }
}

/// Decodes a path quoted by git (`core.quotePath`), e.g. `"a/\303\251.txt"`.
///
/// Inputs that are not wrapped in double quotes are returned unchanged.
pub fn unquote_git_path(input: &str) -> String {
    let Some(inner) = input
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return input.to_string();
    };

    let bytes = inner.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        let byte = bytes[idx];
        if byte != b'\\' || idx + 1 >= bytes.len() {
            out.push(byte);
            idx += 1;
            continue;
        }

        let next = bytes[idx + 1];
        if is_octal(next) {
            let mut value: u32 = 0;
            let mut len = 0;
            while len < 3 && idx + 1 + len < bytes.len() && is_octal(bytes[idx + 1 + len]) {
                value = value * 8 + u32::from(bytes[idx + 1 + len] - b'0');
                len += 1;
            }
            out.push((value & 0xff) as u8);
            idx += 1 + len;
            continue;
        }

        let decoded = match next {
            b'n' => b'\n',
            b't' => b'\t',
            b'r' => b'\r',
            b'a' => 0x07,
            b'b' => 0x08,
            b'f' => 0x0c,
            b'v' => 0x0b,
            other => other,
        };
        out.push(decoded);
        idx += 2;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn is_octal(byte: u8) -> bool {
    (b'0'..=b'7').contains(&byte)
}

/// Parent directory of a workspace-relative path; `""` for top-level entries.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/path.rs"]
mod tests;
