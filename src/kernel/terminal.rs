//! 终端会话：pty 列表、tab 与分屏树
//!
//! 每个 (目录, 会话) 一份，存于 `TerminalCache`。本地状态先行修改并持久化，
//! 远端 pty 的创建/更新/删除以 `Effect` 发出，失败只记日志，不回滚。

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::action::PtyPatch;
use super::effect::{Effect, PtyPurpose};
use super::services::ports::{Persist, PersistBackend, PtyInfo, PtySize};
use super::state::Scope;
use crate::models::pane_tree::{MAX_SPLIT_PERCENT, MIN_SPLIT_PERCENT};
use crate::models::{compute_layout, CloseOutcome, Pane, PaneError, Rect, ScopedCache, SplitDirection};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalPty {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub title_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cols: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_y: Option<f64>,
}

impl LocalPty {
    fn new(id: String, title: String, title_number: u32, tab_id: String) -> Self {
        Self {
            id,
            title,
            title_number,
            tab_id: Some(tab_id),
            rows: None,
            cols: None,
            buffer: None,
            scroll_y: None,
        }
    }

    /// Records written before tabs existed have no `tabId`; they are their own tab.
    pub fn tab_id(&self) -> &str {
        self.tab_id.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TerminalSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
    #[serde(default)]
    pub all: Vec<LocalPty>,
    #[serde(default)]
    pub panes: FxHashMap<String, Pane>,
}

static TITLE_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn parse_title_number(title: &str) -> Option<u32> {
    let re = TITLE_PATTERN
        .get_or_init(|| Regex::new(r"^Terminal (\d+)$").ok())
        .as_ref()?;
    let value: u32 = re.captures(title)?.get(1)?.as_str().parse().ok()?;
    (value > 0).then_some(value)
}

pub struct TerminalSession {
    scope: Scope,
    persist: Persist,
    state: TerminalSnapshot,
}

impl TerminalSession {
    pub fn load(scope: Scope, backend: Arc<dyn PersistBackend>) -> Self {
        let dir = scope.directory.as_str();
        let legacy = match scope.session.as_deref() {
            Some(session) => vec![
                format!("{dir}/terminal/{session}.v1"),
                format!("{dir}/terminal.v1"),
            ],
            None => vec![format!("{dir}/terminal.v1")],
        };
        let persist = Persist::scoped(backend, dir, scope.session.as_deref(), "terminal")
            .with_legacy(legacy);

        let mut state: TerminalSnapshot = persist.load().unwrap_or_default();
        for pty in &mut state.all {
            if pty.tab_id.is_none() {
                pty.tab_id = Some(pty.id.clone());
            }
        }
        tracing::debug!(key = persist.key(), ptys = state.all.len(), "terminal session loaded");

        Self {
            scope,
            persist,
            state,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn snapshot(&self) -> &TerminalSnapshot {
        &self.state
    }

    pub fn all(&self) -> &[LocalPty] {
        &self.state.all
    }

    pub fn active(&self) -> Option<&str> {
        self.state.active.as_deref()
    }

    pub fn pty(&self, id: &str) -> Option<&LocalPty> {
        self.state.all.iter().find(|pty| pty.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.state.all.iter().position(|pty| pty.id == id)
    }

    /// Distinct tab ids in list order.
    pub fn tabs(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        self.state
            .all
            .iter()
            .map(LocalPty::tab_id)
            .filter(|tab| seen.insert(*tab))
            .collect()
    }

    pub fn tab_ptys(&self, tab_id: &str) -> Vec<&LocalPty> {
        self.state
            .all
            .iter()
            .filter(|pty| pty.tab_id() == tab_id)
            .collect()
    }

    pub fn pane(&self, tab_id: &str) -> Option<&Pane> {
        self.state.panes.get(tab_id)
    }

    /// Bounds of every pty shown in `tab_id`, in percent.
    pub fn layout(&self, tab_id: &str) -> IndexMap<String, Rect> {
        if let Some(pane) = self.state.panes.get(tab_id) {
            return compute_layout(pane, Rect::FULL);
        }
        let mut out = IndexMap::new();
        if let Some(lone) = self.tab_ptys(tab_id).first() {
            out.insert(lone.id.clone(), Rect::FULL);
        }
        out
    }

    /// Smallest positive N not used by any `Terminal N`.
    pub fn next_title_number(&self) -> u32 {
        let used: FxHashSet<u32> = self
            .state
            .all
            .iter()
            .filter_map(|pty| {
                if pty.title_number > 0 {
                    Some(pty.title_number)
                } else {
                    parse_title_number(&pty.title)
                }
            })
            .collect();
        (1..).find(|n| !used.contains(n)).unwrap_or(1)
    }

    fn save(&self) {
        if let Err(err) = self.persist.save(&self.state) {
            tracing::warn!(key = self.persist.key(), error = %err, "failed to persist terminals");
        }
    }

    fn remove_effect(&self, id: String) -> Effect {
        Effect::PtyRemove {
            directory: self.scope.directory.clone(),
            id,
        }
    }

    pub fn create_new(&self) -> Effect {
        let title_number = self.next_title_number();
        Effect::PtyCreate {
            scope: self.scope.clone(),
            title: format!("Terminal {title_number}"),
            purpose: PtyPurpose::New { title_number },
        }
    }

    /// Requests a replacement for a pty whose connection failed.
    pub fn clone_pty(&self, id: &str) -> Option<Effect> {
        let pty = self.pty(id)?;
        Some(Effect::PtyCreate {
            scope: self.scope.clone(),
            title: pty.title.clone(),
            purpose: PtyPurpose::Clone { id: id.to_string() },
        })
    }

    /// Requests the pty for a new split of `tab_id`; the tree changes on arrival.
    pub fn split(&self, tab_id: &str, direction: SplitDirection) -> Option<Effect> {
        if self.tab_ptys(tab_id).is_empty() {
            return None;
        }
        let title_number = self.next_title_number();
        Some(Effect::PtyCreate {
            scope: self.scope.clone(),
            title: format!("Terminal {title_number}"),
            purpose: PtyPurpose::Split {
                tab_id: tab_id.to_string(),
                direction,
            },
        })
    }

    pub fn apply_created(
        &mut self,
        purpose: PtyPurpose,
        result: Result<PtyInfo, String>,
    ) -> (bool, Vec<Effect>) {
        let info = match result {
            Ok(info) => info,
            Err(message) => {
                tracing::warn!(?purpose, error = %message, "failed to create terminal");
                return (false, Vec::new());
            }
        };

        let effects = match purpose {
            PtyPurpose::New { title_number } => {
                let title = info.title.unwrap_or_else(|| "Terminal".to_string());
                self.state.all.push(LocalPty::new(
                    info.id.clone(),
                    title,
                    title_number,
                    info.id.clone(),
                ));
                self.state.active = Some(info.id);
                Vec::new()
            }
            PtyPurpose::Clone { id } => {
                let Some(index) = self.position(&id) else {
                    return (false, vec![self.remove_effect(info.id)]);
                };
                self.replace_pty(index, info);
                Vec::new()
            }
            PtyPurpose::Split { tab_id, direction } => {
                let lone = match self.tab_ptys(&tab_id).first() {
                    Some(pty) => pty.id.clone(),
                    None => return (false, vec![self.remove_effect(info.id)]),
                };
                if let Err(err) = self.attach_split(&tab_id, &lone, &info.id, direction) {
                    tracing::warn!(tab = %tab_id, error = %err, "split failed");
                    return (false, vec![self.remove_effect(info.id)]);
                }
                let title = info.title.unwrap_or_else(|| "Terminal".to_string());
                let title_number = parse_title_number(&title).unwrap_or_else(|| self.next_title_number());
                self.state
                    .all
                    .push(LocalPty::new(info.id, title, title_number, tab_id.clone()));
                self.state.active = Some(tab_id);
                Vec::new()
            }
        };

        self.save();
        (true, effects)
    }

    fn attach_split(
        &mut self,
        tab_id: &str,
        lone: &str,
        new_pty: &str,
        direction: SplitDirection,
    ) -> Result<(), PaneError> {
        match self.state.panes.get_mut(tab_id) {
            Some(pane) => pane.split_focused(new_pty, direction).map(|_| ()),
            None => {
                let pane = Pane::from_split(tab_id, lone, new_pty, direction);
                self.state.panes.insert(tab_id.to_string(), pane);
                Ok(())
            }
        }
    }

    /// Swaps the pty at `index` for a freshly created one, keeping its place.
    fn replace_pty(&mut self, index: usize, info: PtyInfo) {
        let old_id = self.state.all[index].id.clone();
        let new_id = info.id;
        {
            let pty = &mut self.state.all[index];
            pty.id = new_id.clone();
            if let Some(title) = info.title {
                pty.title = title;
            }
        }

        for pane in self.state.panes.values_mut() {
            for panel in pane.panels.values_mut() {
                if panel.pty_id.as_deref() == Some(old_id.as_str()) {
                    panel.pty_id = Some(new_id.clone());
                }
            }
        }

        let is_tab = self.state.all.iter().any(|pty| pty.tab_id() == old_id);
        if !is_tab {
            return;
        }
        for pty in &mut self.state.all {
            if pty.tab_id() == old_id {
                pty.tab_id = Some(new_id.clone());
            }
        }
        if let Some(mut pane) = self.state.panes.remove(&old_id) {
            pane.tab_id = new_id.clone();
            self.state.panes.insert(new_id.clone(), pane);
        }
        if self.state.active.as_deref() == Some(old_id.as_str()) {
            self.state.active = Some(new_id);
        }
    }

    pub fn update(&mut self, patch: PtyPatch) -> (bool, Vec<Effect>) {
        let Some(index) = self.position(&patch.id) else {
            return (false, Vec::new());
        };

        let pty = &mut self.state.all[index];
        let before = pty.clone();
        if let Some(title) = &patch.title {
            pty.title = title.clone();
        }
        if patch.rows.is_some() {
            pty.rows = patch.rows;
        }
        if patch.cols.is_some() {
            pty.cols = patch.cols;
        }
        if patch.buffer.is_some() {
            pty.buffer = patch.buffer.clone();
        }
        if patch.scroll_y.is_some() {
            pty.scroll_y = patch.scroll_y;
        }
        let changed = *pty != before;

        let size = match (patch.rows, patch.cols) {
            (Some(rows), Some(cols)) => Some(PtySize { rows, cols }),
            _ => None,
        };
        let mut effects = Vec::new();
        if patch.title.is_some() || size.is_some() {
            effects.push(Effect::PtyUpdate {
                directory: self.scope.directory.clone(),
                id: patch.id,
                title: patch.title,
                size,
            });
        }

        if changed {
            self.save();
        }
        (changed, effects)
    }

    pub fn open(&mut self, id: &str) -> bool {
        let Some(tab) = self.pty(id).map(|pty| pty.tab_id().to_string()) else {
            return false;
        };
        if self.state.active.as_deref() == Some(tab.as_str()) {
            return false;
        }
        self.state.active = Some(tab);
        self.save();
        true
    }

    pub fn move_pty(&mut self, id: &str, to: usize) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let to = to.min(self.state.all.len() - 1);
        if index == to {
            return false;
        }
        let pty = self.state.all.remove(index);
        self.state.all.insert(to, pty);
        self.save();
        true
    }

    /// Closes one pty: its panel when split, otherwise its whole tab.
    pub fn close(&mut self, id: &str) -> (bool, Vec<Effect>) {
        let Some(tab) = self.pty(id).map(|pty| pty.tab_id().to_string()) else {
            return (false, Vec::new());
        };
        if let Some(panel) = self
            .pane(&tab)
            .and_then(|pane| pane.panel_for_pty(id))
            .map(str::to_string)
        {
            return self.close_split(&tab, &panel);
        }
        if self.tab_ptys(&tab).len() <= 1 {
            return self.close_tab(&tab);
        }
        let effects = self.remove_ptys(&[id.to_string()]);
        self.save();
        (true, effects)
    }

    pub fn close_tab(&mut self, tab_id: &str) -> (bool, Vec<Effect>) {
        let mut ids: Vec<String> = self
            .tab_ptys(tab_id)
            .into_iter()
            .map(|pty| pty.id.clone())
            .collect();
        if let Some(pane) = self.state.panes.remove(tab_id) {
            for pty in pane.pty_ids() {
                if !ids.contains(&pty) {
                    ids.push(pty);
                }
            }
        }
        if ids.is_empty() {
            return (false, Vec::new());
        }
        let effects = self.remove_ptys(&ids);
        self.save();
        (true, effects)
    }

    pub fn close_split(&mut self, tab_id: &str, panel_id: &str) -> (bool, Vec<Effect>) {
        let Some(pane) = self.state.panes.get_mut(tab_id) else {
            tracing::warn!(tab = tab_id, panel = panel_id, "close split on tab without pane");
            return (false, Vec::new());
        };
        let outcome = match pane.close(panel_id) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(tab = tab_id, error = %err, "close split failed");
                return (false, Vec::new());
            }
        };

        let effects = match outcome {
            CloseOutcome::CloseTab => return self.close_tab(tab_id),
            CloseOutcome::Closed { removed } => self.remove_ptys(&removed),
            CloseOutcome::Collapsed { removed, remaining } => {
                self.state.panes.remove(tab_id);
                tracing::debug!(tab = tab_id, remaining = %remaining, "pane collapsed");
                self.remove_ptys(&removed)
            }
        };
        self.save();
        (true, effects)
    }

    pub fn resize_split(&mut self, tab_id: &str, panel_id: &str, sizes: [f64; 2]) -> bool {
        let Some(pane) = self.state.panes.get_mut(tab_id) else {
            return false;
        };
        let first = sizes[0].clamp(MIN_SPLIT_PERCENT, MAX_SPLIT_PERCENT);
        match pane.resize(panel_id, [first, 100.0 - first]) {
            Ok(true) => {
                self.save();
                true
            }
            Ok(false) => false,
            Err(err) => {
                tracing::warn!(tab = tab_id, error = %err, "resize split failed");
                false
            }
        }
    }

    pub fn focus(&mut self, tab_id: &str, panel_id: &str) -> bool {
        let Some(pane) = self.state.panes.get_mut(tab_id) else {
            return false;
        };
        match pane.focus(panel_id) {
            Ok(true) => {
                self.save();
                true
            }
            Ok(false) => false,
            Err(err) => {
                tracing::warn!(tab = tab_id, error = %err, "focus failed");
                false
            }
        }
    }

    /// Drops ptys locally and returns their remote removals.
    ///
    /// When the active tab loses its last pty, the tab before it (or else the
    /// first remaining tab) becomes active.
    fn remove_ptys(&mut self, ids: &[String]) -> Vec<Effect> {
        let tabs_before: Vec<String> = self.tabs().into_iter().map(str::to_string).collect();
        self.state.all.retain(|pty| !ids.contains(&pty.id));
        let tabs_after: FxHashSet<String> =
            self.tabs().into_iter().map(str::to_string).collect();

        if let Some(active) = self.state.active.clone() {
            if !tabs_after.contains(&active) {
                let index = tabs_before
                    .iter()
                    .position(|tab| *tab == active)
                    .unwrap_or(0);
                let fallback = tabs_before[..index]
                    .iter()
                    .rev()
                    .chain(tabs_before[index..].iter())
                    .find(|tab| tabs_after.contains(*tab))
                    .cloned();
                self.state.active = fallback;
            }
        }

        ids.iter()
            .map(|id| self.remove_effect(id.clone()))
            .collect()
    }
}

/// Terminal sessions per scope, least recently used evicted first.
pub struct TerminalCache {
    sessions: ScopedCache<TerminalSession>,
    backend: Arc<dyn PersistBackend>,
}

impl TerminalCache {
    pub fn new(max_sessions: usize, backend: Arc<dyn PersistBackend>) -> Self {
        Self {
            sessions: ScopedCache::with_disposer(max_sessions, |key, _session| {
                tracing::debug!(key = %key.replace('\n', " "), "terminal session evicted");
            }),
            backend,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn is_resident(&self, scope: &Scope) -> bool {
        self.sessions.contains(&scope.key())
    }

    /// Session for `scope`, loading it from persistence on a miss.
    pub fn session(&mut self, scope: &Scope) -> &mut TerminalSession {
        let backend = Arc::clone(&self.backend);
        self.sessions
            .get_or_insert_with(&scope.key(), |key| {
                TerminalSession::load(Scope::from_key(key), backend)
            })
    }

    /// Resident session for `scope` without loading or touching it.
    pub fn resident(&mut self, scope: &Scope) -> Option<&mut TerminalSession> {
        self.sessions.peek_mut(&scope.key())
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}

impl std::fmt::Debug for TerminalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalCache")
            .field("sessions", &self.sessions)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/terminal.rs"]
mod tests;
