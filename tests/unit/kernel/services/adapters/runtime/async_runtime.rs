use super::*;
use crate::kernel::effect::PtyPurpose;
use crate::kernel::services::bus::{kernel_bus, KernelMessage};
use crate::kernel::services::ports::{ClientError, ClientResult, PtyInfo, PtySize};
use crate::kernel::state::Scope;
use crate::models::{FileNode, NodeKind};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct FakeClient {
    calls: Mutex<Vec<String>>,
}

impl FakeClient {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl WorkspaceClient for FakeClient {
    fn list(&self, directory: &str, path: &str) -> BoxFuture<ClientResult<Vec<FileNode>>> {
        self.record(format!("list {directory} {path}"));
        Box::pin(async {
            Ok(vec![FileNode {
                name: "src".to_string(),
                path: "src".to_string(),
                kind: NodeKind::Directory,
                ignored: false,
            }])
        })
    }

    fn read(&self, directory: &str, path: &str) -> BoxFuture<ClientResult<String>> {
        self.record(format!("read {directory} {path}"));
        Box::pin(async {
            Err(ClientError::Status {
                status: 404,
                message: "not found".to_string(),
            })
        })
    }

    fn pty_create(&self, directory: &str, title: &str) -> BoxFuture<ClientResult<PtyInfo>> {
        self.record(format!("pty_create {directory} {title}"));
        let title = title.to_string();
        Box::pin(async move {
            Ok(PtyInfo {
                id: "pty_1".to_string(),
                title: Some(title),
            })
        })
    }

    fn pty_update(
        &self,
        directory: &str,
        id: &str,
        _title: Option<String>,
        size: Option<PtySize>,
    ) -> BoxFuture<ClientResult<()>> {
        self.record(format!("pty_update {directory} {id} {size:?}"));
        Box::pin(async { Err(ClientError::Transport("reset".to_string())) })
    }

    fn pty_remove(&self, directory: &str, id: &str) -> BoxFuture<ClientResult<()>> {
        self.record(format!("pty_remove {directory} {id}"));
        Box::pin(async { Ok(()) })
    }
}

fn recv_action(rx: &mut crate::kernel::services::bus::KernelBusReceiver) -> Action {
    match rx.recv_timeout(Duration::from_secs(5)).expect("completion") {
        KernelMessage::Action(action) => action,
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn list_and_read_complete_over_the_bus() {
    let (tx, mut rx) = kernel_bus();
    let client = Arc::new(FakeClient::default());
    let runtime = AsyncRuntime::new(tx, client.clone()).expect("runtime");

    assert!(runtime
        .run_effect(Effect::ListDir {
            directory: "/w".to_string(),
            path: String::new(),
        })
        .is_none());
    match recv_action(&mut rx) {
        Action::DirListed {
            directory, result, ..
        } => {
            assert_eq!(directory, "/w");
            assert_eq!(result.unwrap().len(), 1);
        }
        other => panic!("unexpected action: {other:?}"),
    }

    runtime.run_effect(Effect::ReadFile {
        directory: "/w".to_string(),
        path: "a.rs".to_string(),
    });
    match recv_action(&mut rx) {
        Action::FileRead { path, result, .. } => {
            assert_eq!(path, "a.rs");
            assert_eq!(result, Err("server returned 404: not found".to_string()));
        }
        other => panic!("unexpected action: {other:?}"),
    }
}

#[test]
fn pty_create_carries_scope_and_purpose() {
    let (tx, mut rx) = kernel_bus();
    let runtime = AsyncRuntime::new(tx, Arc::new(FakeClient::default())).expect("runtime");
    let scope = Scope::new("/w", Some("ses".to_string()));

    runtime.run_effect(Effect::PtyCreate {
        scope: scope.clone(),
        title: "Terminal 1".to_string(),
        purpose: PtyPurpose::New { title_number: 1 },
    });
    assert_eq!(
        recv_action(&mut rx),
        Action::PtyCreated {
            scope,
            purpose: PtyPurpose::New { title_number: 1 },
            result: Ok(PtyInfo {
                id: "pty_1".to_string(),
                title: Some("Terminal 1".to_string()),
            }),
        }
    );
}

#[test]
fn host_effects_are_handed_back() {
    let (tx, mut rx) = kernel_bus();
    let client = Arc::new(FakeClient::default());
    let runtime = AsyncRuntime::new(tx, client.clone()).expect("runtime");

    let toast = Effect::Toast {
        title: "t".to_string(),
        message: "m".to_string(),
    };
    assert_eq!(runtime.run(toast.clone()), Some(toast));
    assert_eq!(runtime.run(Effect::RefreshGlobal), Some(Effect::RefreshGlobal));

    // fire-and-forget calls never report back
    runtime.run_effect(Effect::PtyUpdate {
        directory: "/w".to_string(),
        id: "pty_1".to_string(),
        title: None,
        size: Some(PtySize { rows: 24, cols: 80 }),
    });
    runtime.run_effect(Effect::PtyRemove {
        directory: "/w".to_string(),
        id: "pty_1".to_string(),
    });
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    assert_eq!(client.calls.lock().unwrap().len(), 2);
}
