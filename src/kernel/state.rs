use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::file::FileContext;
use super::services::ports::{PersistBackend, SyncConfig};
use super::terminal::TerminalCache;
use super::types::{
    FileDiff, Message, Part, PermissionRequest, Project, QuestionRequest, Session, SessionStatus,
    Todo, VcsInfo,
};
use super::view_cache::FileViewCache;

pub const WORKSPACE_KEY: &str = "__workspace__";

/// The (directory, session) pair every per-scope cache is keyed by.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Scope {
    pub directory: String,
    pub session: Option<String>,
}

impl Scope {
    pub fn new(directory: impl Into<String>, session: Option<String>) -> Self {
        Self {
            directory: directory.into(),
            session,
        }
    }

    /// `"{directory}\n{session | __workspace__}"`
    pub fn key(&self) -> String {
        format!(
            "{}\n{}",
            self.directory,
            self.session.as_deref().unwrap_or(WORKSPACE_KEY)
        )
    }

    pub fn from_key(key: &str) -> Self {
        match key.rsplit_once('\n') {
            Some((directory, WORKSPACE_KEY)) => Self::new(directory, None),
            Some((directory, session)) => Self::new(directory, Some(session.to_string())),
            None => Self::new(key, None),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GlobalState {
    /// Sorted by id.
    pub projects: Vec<Project>,
}

/// Everything the server has told us about one workspace directory.
#[derive(Clone, Debug, Default)]
pub struct DirectoryState {
    /// Sorted by id.
    pub session: Vec<Session>,
    pub session_total: usize,
    /// Session id -> messages sorted by id.
    pub message: FxHashMap<String, Vec<Message>>,
    /// Message id -> parts sorted by id.
    pub part: FxHashMap<String, Vec<Part>>,
    pub session_status: FxHashMap<String, SessionStatus>,
    pub session_diff: FxHashMap<String, Vec<FileDiff>>,
    pub todo: FxHashMap<String, Vec<Todo>>,
    pub permission: FxHashMap<String, Vec<PermissionRequest>>,
    pub question: FxHashMap<String, Vec<QuestionRequest>>,
    pub vcs: Option<VcsInfo>,
}

impl DirectoryState {
    pub fn session(&self, id: &str) -> Option<&Session> {
        self.session
            .binary_search_by(|s| s.id.as_str().cmp(id))
            .ok()
            .map(|idx| &self.session[idx])
    }

    /// True when no side table still references `session_id`.
    pub fn is_session_clean(&self, session_id: &str) -> bool {
        !self.message.contains_key(session_id)
            && !self.session_status.contains_key(session_id)
            && !self.session_diff.contains_key(session_id)
            && !self.todo.contains_key(session_id)
            && !self.permission.contains_key(session_id)
            && !self.question.contains_key(session_id)
            && !self
                .part
                .values()
                .flatten()
                .any(|part| part.session_id == session_id)
    }
}

/// Root of everything the kernel store owns.
#[derive(Debug)]
pub struct SyncState {
    /// Workspace and session the UI is looking at.
    pub scope: Scope,
    pub global: GlobalState,
    pub directories: FxHashMap<String, DirectoryState>,
    /// Content and tree of `scope.directory` only.
    pub files: FileContext,
    pub terminals: TerminalCache,
    pub views: FileViewCache,
}

impl SyncState {
    pub fn new(config: &SyncConfig, backend: Arc<dyn PersistBackend>) -> Self {
        Self {
            scope: Scope::default(),
            global: GlobalState::default(),
            directories: FxHashMap::default(),
            files: FileContext::new("", config.max_content_entries, config.max_content_bytes),
            terminals: TerminalCache::new(config.max_terminal_sessions, Arc::clone(&backend)),
            views: FileViewCache::new(config.max_view_sessions, config.max_view_files, backend),
        }
    }

    pub fn directory(&self, directory: &str) -> Option<&DirectoryState> {
        self.directories.get(directory)
    }
}
