//! 事件归约：把服务端事件应用到全局/目录状态
//!
//! 纯函数，副作用以 `Effect` 返回。事件按到达顺序逐条应用，这里不做重排。

use super::effect::Effect;
use super::event::ServerEvent;
use super::state::{DirectoryState, GlobalState};
use super::store::DispatchResult;
use super::types::HasId;

/// Position of `id` in an id-sorted slice, or where it would be inserted.
pub fn search_by_id<T: HasId>(items: &[T], id: &str) -> Result<usize, usize> {
    items.binary_search_by(|item| item.id().cmp(id))
}

/// Replaces the item with the same id, or inserts it at its sorted position.
///
/// Returns `true` when the item was new.
pub fn upsert_sorted<T: HasId>(items: &mut Vec<T>, item: T) -> bool {
    match search_by_id(items, item.id()) {
        Ok(idx) => {
            items[idx] = item;
            false
        }
        Err(idx) => {
            items.insert(idx, item);
            true
        }
    }
}

pub fn remove_sorted<T: HasId>(items: &mut Vec<T>, id: &str) -> Option<T> {
    search_by_id(items, id).ok().map(|idx| items.remove(idx))
}

pub fn apply_global_event(event: &ServerEvent, global: &mut GlobalState) -> DispatchResult {
    match event {
        ServerEvent::ProjectUpdated(project) => {
            upsert_sorted(&mut global.projects, project.clone());
            DispatchResult::changed(true)
        }
        ServerEvent::GlobalDisposed => DispatchResult::effects(vec![Effect::RefreshGlobal]),
        _ => DispatchResult::none(),
    }
}

pub fn apply_directory_event(
    event: &ServerEvent,
    directory: &str,
    store: &mut DirectoryState,
) -> DispatchResult {
    match event {
        ServerEvent::SessionCreated(info) => {
            let inserted = upsert_sorted(&mut store.session, info.clone());
            if inserted && info.is_root() {
                store.session_total += 1;
            }
            DispatchResult::changed(true)
        }
        ServerEvent::SessionUpdated(info) if info.is_archived() => {
            drop_session(store, &info.id, info.is_root());
            DispatchResult::changed(true)
        }
        ServerEvent::SessionUpdated(info) => {
            upsert_sorted(&mut store.session, info.clone());
            DispatchResult::changed(true)
        }
        ServerEvent::SessionDeleted(info) => {
            drop_session(store, &info.id, info.is_root());
            DispatchResult::changed(true)
        }
        ServerEvent::SessionDiff { session_id, diff } => {
            store.session_diff.insert(session_id.clone(), diff.clone());
            DispatchResult::changed(true)
        }
        ServerEvent::SessionStatus { session_id, status } => {
            store
                .session_status
                .insert(session_id.clone(), status.clone());
            DispatchResult::changed(true)
        }
        ServerEvent::TodoUpdated { session_id, todos } => {
            store.todo.insert(session_id.clone(), todos.clone());
            DispatchResult::changed(true)
        }
        ServerEvent::MessageUpdated(info) => {
            let messages = store.message.entry(info.session_id.clone()).or_default();
            upsert_sorted(messages, info.clone());
            DispatchResult::changed(true)
        }
        ServerEvent::MessageRemoved {
            session_id,
            message_id,
        } => {
            let mut changed = store.part.remove(message_id).is_some();
            if let Some(messages) = store.message.get_mut(session_id) {
                changed |= remove_sorted(messages, message_id).is_some();
            }
            DispatchResult::changed(changed)
        }
        ServerEvent::PartUpdated(part) => {
            let parts = store.part.entry(part.message_id.clone()).or_default();
            upsert_sorted(parts, part.clone());
            DispatchResult::changed(true)
        }
        ServerEvent::PartRemoved {
            message_id,
            part_id,
        } => {
            let Some(parts) = store.part.get_mut(message_id) else {
                return DispatchResult::none();
            };
            let changed = remove_sorted(parts, part_id).is_some();
            if parts.is_empty() {
                store.part.remove(message_id);
            }
            DispatchResult::changed(changed)
        }
        ServerEvent::PermissionAsked(request) => {
            let pending = store.permission.entry(request.session_id.clone()).or_default();
            upsert_sorted(pending, request.clone());
            DispatchResult::changed(true)
        }
        ServerEvent::PermissionReplied {
            session_id,
            request_id,
        } => DispatchResult::changed(remove_request(&mut store.permission, session_id, request_id)),
        ServerEvent::QuestionAsked(request) => {
            let pending = store.question.entry(request.session_id.clone()).or_default();
            upsert_sorted(pending, request.clone());
            DispatchResult::changed(true)
        }
        ServerEvent::QuestionReplied {
            session_id,
            request_id,
        }
        | ServerEvent::QuestionRejected {
            session_id,
            request_id,
        } => DispatchResult::changed(remove_request(&mut store.question, session_id, request_id)),
        ServerEvent::VcsBranchUpdated { branch } => {
            let vcs = store.vcs.get_or_insert_with(Default::default);
            let changed = vcs.branch != *branch;
            vcs.branch = branch.clone();
            DispatchResult::changed(changed)
        }
        ServerEvent::ServerInstanceDisposed => DispatchResult::effects(vec![Effect::Bootstrap {
            directory: directory.to_string(),
        }]),
        ServerEvent::LspUpdated => DispatchResult::effects(vec![Effect::LoadLsp {
            directory: directory.to_string(),
        }]),
        ServerEvent::Unknown(kind) => {
            tracing::trace!(kind = %kind, directory, "ignoring unknown event");
            DispatchResult::none()
        }
        ServerEvent::ProjectUpdated(_)
        | ServerEvent::GlobalDisposed
        | ServerEvent::FileWatcherUpdated(_) => DispatchResult::none(),
    }
}

fn remove_request<T: HasId>(
    table: &mut rustc_hash::FxHashMap<String, Vec<T>>,
    session_id: &str,
    request_id: &str,
) -> bool {
    let Some(pending) = table.get_mut(session_id) else {
        return false;
    };
    let removed = remove_sorted(pending, request_id).is_some();
    if pending.is_empty() {
        table.remove(session_id);
    }
    removed
}

/// Removes a session and every side-table entry that references it.
fn drop_session(store: &mut DirectoryState, session_id: &str, is_root: bool) {
    remove_sorted(&mut store.session, session_id);
    if is_root {
        store.session_total = store.session_total.saturating_sub(1);
    }

    if let Some(messages) = store.message.remove(session_id) {
        for message in messages {
            store.part.remove(&message.id);
        }
    }
    // parts whose message never reached the message table
    store.part.retain(|_, parts| {
        parts.retain(|part| part.session_id != session_id);
        !parts.is_empty()
    });

    store.session_diff.remove(session_id);
    store.todo.remove(session_id);
    store.permission.remove(session_id);
    store.question.remove(session_id);
    store.session_status.remove(session_id);
    tracing::debug!(session = session_id, "session dropped from directory state");
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/reducer.rs"]
mod tests;
