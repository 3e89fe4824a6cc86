use super::*;
use crate::kernel::types::{
    FileDiff, Message, Part, PermissionRequest, Project, QuestionRequest, Session, SessionStatus,
    SessionTime, Todo,
};
use serde_json::Map;

fn session(id: &str, parent: Option<&str>, archived: Option<i64>) -> Session {
    Session {
        id: id.to_string(),
        parent_id: parent.map(str::to_string),
        title: None,
        time: SessionTime {
            created: 1,
            updated: 1,
            archived,
        },
        extra: Map::new(),
    }
}

fn project(id: &str) -> Project {
    Project {
        id: id.to_string(),
        worktree: None,
        extra: Map::new(),
    }
}

fn message(id: &str, session_id: &str) -> Message {
    Message {
        id: id.to_string(),
        session_id: session_id.to_string(),
        extra: Map::new(),
    }
}

fn part(id: &str, session_id: &str, message_id: &str) -> Part {
    Part {
        id: id.to_string(),
        session_id: session_id.to_string(),
        message_id: message_id.to_string(),
        extra: Map::new(),
    }
}

fn ids<T: HasId>(items: &[T]) -> Vec<&str> {
    items.iter().map(HasId::id).collect()
}

#[test]
fn test_project_updated_upserts_in_sorted_position() {
    let mut global = GlobalState {
        projects: vec![project("a"), project("c")],
    };
    let result = apply_global_event(&ServerEvent::ProjectUpdated(project("b")), &mut global);
    assert!(result.state_changed);
    assert!(result.effects.is_empty());
    assert_eq!(ids(&global.projects), vec!["a", "b", "c"]);
}

#[test]
fn test_project_updates_stay_sorted_and_unique() {
    let mut global = GlobalState::default();
    for id in ["m", "c", "x", "c", "a", "m", "z", "b"] {
        apply_global_event(&ServerEvent::ProjectUpdated(project(id)), &mut global);
        let current = ids(&global.projects);
        let mut sorted = current.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(current, sorted);
    }
    assert_eq!(ids(&global.projects), vec!["a", "b", "c", "m", "x", "z"]);
}

#[test]
fn test_global_disposed_requests_refresh() {
    let mut global = GlobalState::default();
    let result = apply_global_event(&ServerEvent::GlobalDisposed, &mut global);
    assert_eq!(result.effects, vec![Effect::RefreshGlobal]);
    assert!(!result.state_changed);
}

#[test]
fn test_root_sessions_insert_sorted_and_count() {
    let mut store = DirectoryState {
        session: vec![session("b", None, None)],
        session_total: 1,
        ..DirectoryState::default()
    };

    apply_directory_event(&ServerEvent::SessionCreated(session("a", None, None)), "/tmp", &mut store);
    assert_eq!(ids(&store.session), vec!["a", "b"]);
    assert_eq!(store.session_total, 2);

    apply_directory_event(
        &ServerEvent::SessionCreated(session("c", Some("a"), None)),
        "/tmp",
        &mut store,
    );
    assert_eq!(store.session_total, 2);

    apply_directory_event(&ServerEvent::SessionUpdated(session("a", None, None)), "/tmp", &mut store);
    apply_directory_event(&ServerEvent::SessionUpdated(session("d", None, None)), "/tmp", &mut store);
    assert_eq!(store.session_total, 2);
}

#[test]
fn test_archiving_cleans_every_side_table() {
    let mut store = DirectoryState {
        session: vec![session("ses_1", None, None), session("ses_2", None, None)],
        session_total: 2,
        ..DirectoryState::default()
    };
    store
        .message
        .insert("ses_1".to_string(), vec![message("msg_1", "ses_1")]);
    store
        .part
        .insert("msg_1".to_string(), vec![part("prt_1", "ses_1", "msg_1")]);
    store.part.insert(
        "msg_orphan".to_string(),
        vec![part("prt_2", "ses_1", "msg_orphan")],
    );
    store.session_diff.insert(
        "ses_1".to_string(),
        vec![FileDiff {
            file: "a.rs".to_string(),
            additions: 1,
            deletions: 0,
            extra: Map::new(),
        }],
    );
    store.todo.insert("ses_1".to_string(), Vec::<Todo>::new());
    store.permission.insert(
        "ses_1".to_string(),
        vec![PermissionRequest {
            id: "per_1".to_string(),
            session_id: "ses_1".to_string(),
            extra: Map::new(),
        }],
    );
    store
        .question
        .insert("ses_1".to_string(), Vec::<QuestionRequest>::new());
    store.session_status.insert(
        "ses_1".to_string(),
        SessionStatus {
            kind: "busy".to_string(),
            extra: Map::new(),
        },
    );
    store
        .message
        .insert("ses_2".to_string(), vec![message("msg_2", "ses_2")]);

    let result = apply_directory_event(
        &ServerEvent::SessionUpdated(session("ses_1", None, Some(10))),
        "/tmp",
        &mut store,
    );

    assert!(result.state_changed);
    assert_eq!(ids(&store.session), vec!["ses_2"]);
    assert_eq!(store.session_total, 1);
    assert!(store.is_session_clean("ses_1"));
    assert!(!store.part.contains_key("msg_1"));
    assert!(!store.part.contains_key("msg_orphan"));
    assert!(store.message.contains_key("ses_2"));
}

#[test]
fn test_archiving_child_session_keeps_total() {
    let mut store = DirectoryState {
        session: vec![session("a", None, None), session("b", Some("a"), None)],
        session_total: 1,
        ..DirectoryState::default()
    };
    apply_directory_event(
        &ServerEvent::SessionUpdated(session("b", Some("a"), Some(5))),
        "/tmp",
        &mut store,
    );
    assert_eq!(ids(&store.session), vec!["a"]);
    assert_eq!(store.session_total, 1);
}

#[test]
fn test_session_total_never_underflows() {
    let mut store = DirectoryState::default();
    apply_directory_event(
        &ServerEvent::SessionDeleted(session("gone", None, None)),
        "/tmp",
        &mut store,
    );
    assert_eq!(store.session_total, 0);
}

#[test]
fn test_disposal_and_lsp_become_effects() {
    let mut store = DirectoryState::default();
    let result = apply_directory_event(&ServerEvent::ServerInstanceDisposed, "/tmp", &mut store);
    assert_eq!(
        result.effects,
        vec![Effect::Bootstrap {
            directory: "/tmp".to_string()
        }]
    );
    assert!(!result.state_changed);

    let result = apply_directory_event(&ServerEvent::LspUpdated, "/tmp", &mut store);
    assert_eq!(
        result.effects,
        vec![Effect::LoadLsp {
            directory: "/tmp".to_string()
        }]
    );
}

#[test]
fn test_unknown_event_is_a_no_op() {
    let mut store = DirectoryState::default();
    let result = apply_directory_event(
        &ServerEvent::Unknown("future.thing".to_string()),
        "/tmp",
        &mut store,
    );
    assert!(!result.state_changed);
    assert!(result.effects.is_empty());
}

#[test]
fn test_message_and_part_pass_through() {
    let mut store = DirectoryState::default();
    for id in ["msg_3", "msg_1", "msg_2"] {
        apply_directory_event(&ServerEvent::MessageUpdated(message(id, "s")), "/tmp", &mut store);
    }
    assert_eq!(ids(&store.message["s"]), vec!["msg_1", "msg_2", "msg_3"]);

    apply_directory_event(&ServerEvent::PartUpdated(part("p2", "s", "msg_1")), "/tmp", &mut store);
    apply_directory_event(&ServerEvent::PartUpdated(part("p1", "s", "msg_1")), "/tmp", &mut store);
    assert_eq!(ids(&store.part["msg_1"]), vec!["p1", "p2"]);

    apply_directory_event(
        &ServerEvent::PartRemoved {
            message_id: "msg_1".to_string(),
            part_id: "p1".to_string(),
        },
        "/tmp",
        &mut store,
    );
    assert_eq!(ids(&store.part["msg_1"]), vec!["p2"]);

    apply_directory_event(
        &ServerEvent::MessageRemoved {
            session_id: "s".to_string(),
            message_id: "msg_1".to_string(),
        },
        "/tmp",
        &mut store,
    );
    assert_eq!(ids(&store.message["s"]), vec!["msg_2", "msg_3"]);
    assert!(!store.part.contains_key("msg_1"));
}

#[test]
fn test_permission_reply_drops_empty_list() {
    let mut store = DirectoryState::default();
    apply_directory_event(
        &ServerEvent::PermissionAsked(PermissionRequest {
            id: "per_1".to_string(),
            session_id: "s".to_string(),
            extra: Map::new(),
        }),
        "/tmp",
        &mut store,
    );
    assert_eq!(store.permission["s"].len(), 1);

    let result = apply_directory_event(
        &ServerEvent::PermissionReplied {
            session_id: "s".to_string(),
            request_id: "per_1".to_string(),
        },
        "/tmp",
        &mut store,
    );
    assert!(result.state_changed);
    assert!(!store.permission.contains_key("s"));
}

#[test]
fn test_vcs_branch_updated() {
    let mut store = DirectoryState::default();
    let event = ServerEvent::VcsBranchUpdated {
        branch: Some("main".to_string()),
    };
    assert!(apply_directory_event(&event, "/tmp", &mut store).state_changed);
    assert!(!apply_directory_event(&event, "/tmp", &mut store).state_changed);
    assert_eq!(store.vcs.unwrap().branch.as_deref(), Some("main"));
}
