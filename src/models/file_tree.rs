//! 文件树数据模型
//!
//! 按目录缓存服务端返回的列表。目录以工作区相对路径为 key，根目录为 `""`。
//! 远端请求由调用方发起，这里只维护状态和 in-flight 合并。

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ignored: bool,
}

impl FileNode {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirState {
    pub expanded: bool,
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub children: Vec<String>,
}

#[derive(Debug)]
pub struct FileTree {
    nodes: FxHashMap<String, FileNode>,
    dirs: FxHashMap<String, DirState>,
    inflight: FxHashSet<String>,
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTree {
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: FxHashMap::default(),
            dirs: FxHashMap::default(),
            inflight: FxHashSet::default(),
        };
        tree.reset();
        tree
    }

    pub fn reset(&mut self) {
        self.nodes.clear();
        self.dirs.clear();
        self.inflight.clear();
        self.dirs.insert(
            String::new(),
            DirState {
                expanded: true,
                ..DirState::default()
            },
        );
    }

    pub fn node(&self, path: &str) -> Option<&FileNode> {
        self.nodes.get(path)
    }

    pub fn dir_state(&self, dir: &str) -> Option<&DirState> {
        self.dirs.get(dir)
    }

    pub fn is_loaded(&self, dir: &str) -> bool {
        self.dirs.get(dir).is_some_and(|state| state.loaded)
    }

    pub fn is_inflight(&self, dir: &str) -> bool {
        self.inflight.contains(dir)
    }

    /// Cached children of `dir`, in listing order. Never fetches.
    pub fn children(&self, dir: &str) -> Vec<&FileNode> {
        let Some(state) = self.dirs.get(dir) else {
            return Vec::new();
        };
        state
            .children
            .iter()
            .filter_map(|path| self.nodes.get(path))
            .collect()
    }

    /// Marks `dir` as loading and reports whether a listing request must be sent.
    ///
    /// Returns `false` when the directory is already loaded (unless `force`) or
    /// when a request for it is already in flight.
    pub fn list_dir(&mut self, dir: &str, force: bool) -> bool {
        if !force && self.is_loaded(dir) {
            return false;
        }
        if self.inflight.contains(dir) {
            return false;
        }

        let state = self.dirs.entry(dir.to_string()).or_default();
        state.loading = true;
        state.error = None;
        self.inflight.insert(dir.to_string());
        true
    }

    pub fn apply_listing(&mut self, dir: &str, nodes: Vec<FileNode>) {
        self.inflight.remove(dir);

        let prev_children = self
            .dirs
            .get(dir)
            .map(|state| state.children.clone())
            .unwrap_or_default();
        let next_children: Vec<String> = nodes.iter().map(|node| node.path.clone()).collect();
        let next_set: FxHashSet<&str> = next_children.iter().map(String::as_str).collect();

        let mut removed_dirs = Vec::new();
        for child in &prev_children {
            if next_set.contains(child.as_str()) {
                continue;
            }
            if let Some(node) = self.nodes.remove(child) {
                if node.is_dir() {
                    removed_dirs.push(child.clone());
                }
            }
        }

        if !removed_dirs.is_empty() {
            let prefixes: Vec<String> = removed_dirs.iter().map(|dir| format!("{dir}/")).collect();
            let under_removed = |key: &str| prefixes.iter().any(|prefix| key.starts_with(prefix));
            self.nodes.retain(|key, _| !under_removed(key));
            self.dirs
                .retain(|key, _| !under_removed(key) && !removed_dirs.contains(key));
            self.inflight.retain(|key| !under_removed(key));
        }

        for node in nodes {
            self.nodes.insert(node.path.clone(), node);
        }

        let state = self.dirs.entry(dir.to_string()).or_default();
        state.loaded = true;
        state.loading = false;
        state.error = None;
        state.children = next_children;
        tracing::debug!(dir, children = state.children.len(), "directory listed");
    }

    /// Records a failed listing; previously cached children are kept.
    pub fn apply_list_error(&mut self, dir: &str, message: &str) {
        self.inflight.remove(dir);
        let state = self.dirs.entry(dir.to_string()).or_default();
        state.loading = false;
        state.error = Some(message.to_string());
    }

    /// Expands `dir`; returns whether a listing request must be sent.
    pub fn expand_dir(&mut self, dir: &str) -> bool {
        self.dirs.entry(dir.to_string()).or_default().expanded = true;
        self.list_dir(dir, false)
    }

    pub fn collapse_dir(&mut self, dir: &str) -> bool {
        match self.dirs.get_mut(dir) {
            Some(state) if state.expanded => {
                state.expanded = false;
                true
            }
            _ => false,
        }
    }

    /// Toggles expansion; returns whether a listing request must be sent.
    pub fn toggle_dir(&mut self, dir: &str) -> bool {
        if self.dirs.get(dir).is_some_and(|state| state.expanded) {
            self.collapse_dir(dir);
            return false;
        }
        self.expand_dir(dir)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/file_tree.rs"]
mod tests;
