//! 文件视图状态：滚动位置与选中行，按 (目录, 会话) 持久化

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::services::ports::{Persist, PersistBackend};
use super::state::Scope;
use crate::models::{ScopedCache, SelectedLineRange};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileViewState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_lines: Option<SelectedLineRange>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct ViewSnapshot {
    #[serde(default)]
    file: IndexMap<String, FileViewState>,
}

pub struct ViewSession {
    persist: Persist,
    view: ViewSnapshot,
    max_files: usize,
}

impl ViewSession {
    pub fn load(scope: &Scope, max_files: usize, backend: Arc<dyn PersistBackend>) -> Self {
        let dir = scope.directory.as_str();
        let legacy = match scope.session.as_deref() {
            Some(session) => format!("{dir}/file/{session}.v1"),
            None => format!("{dir}/file.v1"),
        };
        let persist = Persist::scoped(backend, dir, scope.session.as_deref(), "file-view")
            .with_legacy(vec![legacy]);

        let mut session = Self {
            view: persist.load().unwrap_or_default(),
            persist,
            max_files: max_files.max(1),
        };
        if session.prune(None) {
            session.save();
        }
        session
    }

    pub fn len(&self) -> usize {
        self.view.file.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.file.is_empty()
    }

    /// Paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.view.file.keys().map(String::as_str)
    }

    pub fn state(&self, path: &str) -> Option<&FileViewState> {
        self.view.file.get(path)
    }

    pub fn scroll_top(&self, path: &str) -> Option<f64> {
        self.state(path)?.scroll_top
    }

    pub fn scroll_left(&self, path: &str) -> Option<f64> {
        self.state(path)?.scroll_left
    }

    pub fn selected_lines(&self, path: &str) -> Option<&SelectedLineRange> {
        self.state(path)?.selected_lines.as_ref()
    }

    pub fn set_scroll_top(&mut self, path: &str, top: f64) -> bool {
        self.update(path, |state| {
            if state.scroll_top == Some(top) {
                return false;
            }
            state.scroll_top = Some(top);
            true
        })
    }

    pub fn set_scroll_left(&mut self, path: &str, left: f64) -> bool {
        self.update(path, |state| {
            if state.scroll_left == Some(left) {
                return false;
            }
            state.scroll_left = Some(left);
            true
        })
    }

    /// Stores the range with `start <= end`; `None` clears the selection.
    pub fn set_selected_lines(&mut self, path: &str, range: Option<SelectedLineRange>) -> bool {
        let next = range.map(SelectedLineRange::normalize);
        self.update(path, |state| {
            if state.selected_lines == next {
                return false;
            }
            state.selected_lines = next;
            true
        })
    }

    /// Untracked paths are only inserted when `apply` changed something.
    fn update(&mut self, path: &str, apply: impl FnOnce(&mut FileViewState) -> bool) -> bool {
        let changed = match self.view.file.get_mut(path) {
            Some(state) => apply(state),
            None => {
                let mut state = FileViewState::default();
                let changed = apply(&mut state);
                if changed {
                    self.view.file.insert(path.to_string(), state);
                }
                changed
            }
        };
        if !changed {
            return false;
        }
        self.prune(Some(path));
        self.save();
        true
    }

    /// Drops the oldest paths beyond `max_files`, never `keep`.
    fn prune(&mut self, keep: Option<&str>) -> bool {
        let len = self.view.file.len();
        if len <= self.max_files {
            return false;
        }
        let drop: Vec<String> = self
            .view
            .file
            .keys()
            .filter(|key| Some(key.as_str()) != keep)
            .take(len - self.max_files)
            .cloned()
            .collect();
        for key in &drop {
            self.view.file.shift_remove(key);
        }
        tracing::debug!(key = self.persist.key(), dropped = drop.len(), "view state pruned");
        !drop.is_empty()
    }

    fn save(&self) {
        if let Err(err) = self.persist.save(&self.view) {
            tracing::warn!(key = self.persist.key(), error = %err, "failed to persist view state");
        }
    }
}

pub struct FileViewCache {
    sessions: ScopedCache<ViewSession>,
    backend: Arc<dyn PersistBackend>,
    max_files: usize,
}

impl FileViewCache {
    pub fn new(max_sessions: usize, max_files: usize, backend: Arc<dyn PersistBackend>) -> Self {
        Self {
            sessions: ScopedCache::new(max_sessions),
            backend,
            max_files,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn load(&mut self, scope: &Scope) -> &mut ViewSession {
        let backend = Arc::clone(&self.backend);
        let max_files = self.max_files;
        self.sessions.get_or_insert_with(&scope.key(), |key| {
            ViewSession::load(&Scope::from_key(key), max_files, backend)
        })
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}

impl std::fmt::Debug for FileViewCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileViewCache")
            .field("sessions", &self.sessions)
            .field("max_files", &self.max_files)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/view_cache.rs"]
mod tests;
