//! 当前工作区的文件内容与目录树
//!
//! 远端读取以 `Effect` 发出，结果通过 `apply_*` 回到这里。每个结果都带着发起时的目录，
//! 目录已切换的结果直接丢弃。

use rustc_hash::{FxHashMap, FxHashSet};

use super::effect::Effect;
use super::event::{WatchEvent, WatchKind};
use crate::models::content_lru::approx_bytes;
use crate::models::path::{file_name, parent_dir};
use crate::models::{ContentLru, DirState, FileNode, FileTree, PathHelpers};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileState {
    pub path: String,
    pub name: String,
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug)]
pub struct FileContext {
    directory: String,
    paths: PathHelpers,
    files: FxHashMap<String, FileState>,
    inflight: FxHashSet<String>,
    lru: ContentLru,
    tree: FileTree,
}

impl FileContext {
    pub fn new(directory: impl Into<String>, max_entries: usize, max_bytes: usize) -> Self {
        let directory = directory.into();
        Self {
            paths: PathHelpers::new(directory.clone()),
            directory,
            files: FxHashMap::default(),
            inflight: FxHashSet::default(),
            lru: ContentLru::new(max_entries, max_bytes),
            tree: FileTree::new(),
        }
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Switches workspace; everything cached for the old one is dropped.
    pub fn set_directory(&mut self, directory: &str) -> bool {
        if self.directory == directory {
            return false;
        }
        tracing::debug!(from = %self.directory, to = directory, "file scope changed");
        self.directory = directory.to_string();
        self.paths.set_root(directory);
        self.files.clear();
        self.inflight.clear();
        self.lru.reset();
        self.tree.reset();
        true
    }

    pub fn paths(&self) -> &PathHelpers {
        &self.paths
    }

    pub fn normalize(&self, input: &str) -> String {
        self.paths.normalize(input)
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn lru(&self) -> &ContentLru {
        &self.lru
    }

    /// Cached state of a file without touching its LRU position.
    pub fn file(&self, input: &str) -> Option<&FileState> {
        self.files.get(&self.paths.normalize(input))
    }

    pub fn is_inflight(&self, input: &str) -> bool {
        self.inflight.contains(&self.paths.normalize(input))
    }

    /// Marks cached content as recently used.
    pub fn touch(&mut self, input: &str) -> bool {
        let path = self.paths.normalize(input);
        let Some(content) = self
            .files
            .get(&path)
            .and_then(|f| f.content.as_deref())
            .filter(|content| !content.is_empty())
        else {
            return false;
        };
        if self.lru.contains(&path) {
            self.lru.touch(&path, None);
        } else {
            self.lru.touch(&path, Some(approx_bytes(content)));
        }
        true
    }

    fn ensure(&mut self, path: &str) -> &mut FileState {
        self.files
            .entry(path.to_string())
            .or_insert_with(|| FileState {
                path: path.to_string(),
                name: file_name(path).to_string(),
                ..FileState::default()
            })
    }

    /// Starts a read unless the file is loaded (and not forced) or already in flight.
    pub fn load(&mut self, input: &str, force: bool) -> Option<Effect> {
        let path = self.paths.normalize(input);
        if path.is_empty() {
            return None;
        }

        let state = self.ensure(&path);
        if !force && state.loaded {
            return None;
        }
        if self.inflight.contains(&path) {
            return None;
        }

        let state = self.ensure(&path);
        state.loading = true;
        state.error = None;
        self.inflight.insert(path.clone());
        Some(Effect::ReadFile {
            directory: self.directory.clone(),
            path,
        })
    }

    pub fn apply_read(
        &mut self,
        directory: &str,
        path: &str,
        result: Result<String, String>,
    ) -> (bool, Vec<Effect>) {
        if directory != self.directory {
            tracing::debug!(directory, path, "dropping read for stale scope");
            return (false, Vec::new());
        }
        self.inflight.remove(path);

        match result {
            Ok(content) => {
                let bytes = approx_bytes(&content);
                let has_content = !content.is_empty();
                let state = self.ensure(path);
                state.loaded = true;
                state.loading = false;
                state.content = Some(content);

                if has_content {
                    self.lru.touch(path, Some(bytes));
                    let keep: FxHashSet<String> = std::iter::once(path.to_string()).collect();
                    self.evict(&keep);
                }
                (true, Vec::new())
            }
            Err(message) => {
                tracing::warn!(path, error = %message, "file read failed");
                let state = self.ensure(path);
                state.loading = false;
                state.error = Some(message.clone());
                (
                    true,
                    vec![Effect::Toast {
                        title: "Failed to load file".to_string(),
                        message,
                    }],
                )
            }
        }
    }

    fn evict(&mut self, keep: &FxHashSet<String>) {
        let files = &mut self.files;
        self.lru.evict(keep, |target| {
            if let Some(state) = files.get_mut(target) {
                state.content = None;
                state.loaded = false;
            }
        });
    }

    pub fn dir_state(&self, input: &str) -> Option<&DirState> {
        self.tree.dir_state(&self.paths.normalize_dir(input))
    }

    pub fn children(&self, input: &str) -> Vec<&FileNode> {
        self.tree.children(&self.paths.normalize_dir(input))
    }

    pub fn list_dir(&mut self, input: &str, force: bool) -> Option<Effect> {
        let dir = self.paths.normalize_dir(input);
        self.tree.list_dir(&dir, force).then(|| self.list_effect(dir))
    }

    fn list_effect(&self, path: String) -> Effect {
        Effect::ListDir {
            directory: self.directory.clone(),
            path,
        }
    }

    pub fn expand_dir(&mut self, input: &str) -> (bool, Option<Effect>) {
        let dir = self.paths.normalize_dir(input);
        let was_expanded = self.tree.dir_state(&dir).is_some_and(|s| s.expanded);
        let fetch = self.tree.expand_dir(&dir);
        (!was_expanded || fetch, fetch.then(|| self.list_effect(dir)))
    }

    pub fn collapse_dir(&mut self, input: &str) -> bool {
        let dir = self.paths.normalize_dir(input);
        self.tree.collapse_dir(&dir)
    }

    pub fn toggle_dir(&mut self, input: &str) -> (bool, Option<Effect>) {
        let dir = self.paths.normalize_dir(input);
        if self.tree.dir_state(&dir).is_some_and(|s| s.expanded) {
            return (self.tree.collapse_dir(&dir), None);
        }
        self.expand_dir(&dir)
    }

    pub fn apply_listing(
        &mut self,
        directory: &str,
        path: &str,
        result: Result<Vec<FileNode>, String>,
    ) -> (bool, Vec<Effect>) {
        if directory != self.directory {
            tracing::debug!(directory, path, "dropping listing for stale scope");
            return (false, Vec::new());
        }
        match result {
            Ok(nodes) => {
                let nodes = nodes
                    .into_iter()
                    .map(|mut node| {
                        node.path = self.paths.normalize(&node.path);
                        node
                    })
                    .collect();
                self.tree.apply_listing(path, nodes);
                (true, Vec::new())
            }
            Err(message) => {
                tracing::warn!(path, error = %message, "directory listing failed");
                self.tree.apply_list_error(path, &message);
                (
                    true,
                    vec![Effect::Toast {
                        title: "Failed to list directory".to_string(),
                        message,
                    }],
                )
            }
        }
    }

    /// Turns a watcher notification into reloads of whatever it invalidates.
    pub fn invalidate_from_watcher(&mut self, event: &WatchEvent) -> Vec<Effect> {
        let path = self.paths.normalize(&event.file);
        if path.is_empty() || path == ".git" || path.starts_with(".git/") {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if self.files.contains_key(&path) {
            effects.extend(self.load(&path, true));
        }

        let is_dir = self
            .tree
            .node(&path)
            .map(FileNode::is_dir)
            .unwrap_or_else(|| self.tree.dir_state(&path).is_some());

        match event.event {
            WatchKind::Change => {
                if is_dir && self.tree.is_loaded(&path) {
                    effects.extend(self.list_dir(&path, true));
                }
            }
            WatchKind::Add | WatchKind::Unlink => {
                let parent = parent_dir(&path).to_string();
                if self.tree.is_loaded(&parent) {
                    effects.extend(self.list_dir(&parent, true));
                }
            }
        }
        effects
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/file.rs"]
mod tests;
