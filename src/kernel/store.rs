use std::sync::Arc;

use super::services::ports::{PersistBackend, SyncConfig};
use super::state::{Scope, SyncState};
use super::terminal::TerminalSession;
use super::view_cache::ViewSession;
use super::{Action, Effect};

mod events;
mod files;
mod terminals;
mod views;

#[derive(Debug, Default, PartialEq)]
pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn changed(state_changed: bool) -> Self {
        Self {
            effects: Vec::new(),
            state_changed,
        }
    }

    pub fn effects(effects: Vec<Effect>) -> Self {
        Self {
            effects,
            state_changed: false,
        }
    }

    fn from_pair((state_changed, effects): (bool, Vec<Effect>)) -> Self {
        Self {
            effects,
            state_changed,
        }
    }

    fn from_option((state_changed, effect): (bool, Option<Effect>)) -> Self {
        Self {
            effects: effect.into_iter().collect(),
            state_changed,
        }
    }
}

pub struct Store {
    state: SyncState,
    version: u64,
}

impl Store {
    pub fn new(state: SyncState) -> Self {
        Self { state, version: 0 }
    }

    pub fn with_config(config: &SyncConfig, backend: Arc<dyn PersistBackend>) -> Self {
        Self::new(SyncState::new(config, backend))
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Bumped on every dispatch that changed observable state.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn scope(&self) -> &Scope {
        &self.state.scope
    }

    /// Terminal session of the current scope, loaded on first use.
    pub fn terminal(&mut self) -> &mut TerminalSession {
        self.state.terminals.session(&self.state.scope)
    }

    /// View state of the current scope, loaded on first use.
    pub fn view(&mut self) -> &mut ViewSession {
        self.state.views.load(&self.state.scope)
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        let result = match action {
            Action::SetScope { directory, session } => self.set_scope(Scope::new(directory, session)),
            Action::ServerEvent { directory, event } => self.reduce_server_event(&directory, event),
            Action::File(action) => self.reduce_file_action(action),
            Action::Terminal(action) => self.reduce_terminal_action(action),
            Action::View(action) => self.reduce_view_action(action),
            Action::DirListed {
                directory,
                path,
                result,
            } => DispatchResult::from_pair(self.state.files.apply_listing(&directory, &path, result)),
            Action::FileRead {
                directory,
                path,
                result,
            } => DispatchResult::from_pair(self.state.files.apply_read(&directory, &path, result)),
            Action::PtyCreated {
                scope,
                purpose,
                result,
            } => self.reduce_pty_created(scope, purpose, result),
        };

        if result.state_changed {
            self.version = self.version.wrapping_add(1);
        }
        result
    }

    fn set_scope(&mut self, scope: Scope) -> DispatchResult {
        if self.state.scope == scope {
            return DispatchResult::none();
        }
        tracing::info!(directory = %scope.directory, session = ?scope.session, "scope changed");

        let directory_changed = self.state.files.set_directory(&scope.directory);
        self.state.scope = scope;
        // 预热当前 scope 的终端与视图缓存
        self.state.terminals.session(&self.state.scope);
        self.state.views.load(&self.state.scope);

        let mut effects = Vec::new();
        if directory_changed && !self.state.scope.directory.is_empty() {
            effects.extend(self.state.files.list_dir("", false));
        }
        DispatchResult {
            effects,
            state_changed: true,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
