//! 服务端事件解码
//!
//! 事件流中每条记录形如 `{type, properties}`，外层由 `GlobalEnvelope` 标注所属目录。
//! 未知 `type` 解码为 `ServerEvent::Unknown`，不会报错。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::types::{
    FileDiff, Message, Part, PermissionRequest, Project, QuestionRequest, Session, SessionStatus,
    Todo,
};

pub const GLOBAL_DIRECTORY: &str = "global";

#[derive(Debug, Error)]
#[error("malformed `{kind}` event: {source}")]
pub struct EventDecodeError {
    pub kind: String,
    #[source]
    pub source: serde_json::Error,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchKind {
    Add,
    Change,
    Unlink,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEvent {
    pub file: String,
    pub event: WatchKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ServerEvent {
    ProjectUpdated(Project),
    GlobalDisposed,

    SessionCreated(Session),
    SessionUpdated(Session),
    SessionDeleted(Session),
    SessionDiff {
        session_id: String,
        diff: Vec<FileDiff>,
    },
    SessionStatus {
        session_id: String,
        status: SessionStatus,
    },
    TodoUpdated {
        session_id: String,
        todos: Vec<Todo>,
    },
    MessageUpdated(Message),
    MessageRemoved {
        session_id: String,
        message_id: String,
    },
    PartUpdated(Part),
    PartRemoved {
        message_id: String,
        part_id: String,
    },
    PermissionAsked(PermissionRequest),
    PermissionReplied {
        session_id: String,
        request_id: String,
    },
    QuestionAsked(QuestionRequest),
    QuestionReplied {
        session_id: String,
        request_id: String,
    },
    QuestionRejected {
        session_id: String,
        request_id: String,
    },
    VcsBranchUpdated {
        branch: Option<String>,
    },
    ServerInstanceDisposed,
    LspUpdated,
    FileWatcherUpdated(WatchEvent),
    Unknown(String),
}

#[derive(Deserialize)]
struct Info<T> {
    info: T,
}

#[derive(Deserialize)]
struct PartPayload {
    part: Part,
}

#[derive(Deserialize)]
struct DiffPayload {
    #[serde(rename = "sessionID")]
    session_id: String,
    #[serde(default)]
    diff: Vec<FileDiff>,
}

#[derive(Deserialize)]
struct StatusPayload {
    #[serde(rename = "sessionID")]
    session_id: String,
    status: SessionStatus,
}

#[derive(Deserialize)]
struct TodoPayload {
    #[serde(rename = "sessionID")]
    session_id: String,
    #[serde(default)]
    todos: Vec<Todo>,
}

#[derive(Deserialize)]
struct MessageRef {
    #[serde(rename = "sessionID")]
    session_id: String,
    #[serde(rename = "messageID")]
    message_id: String,
}

#[derive(Deserialize)]
struct PartRef {
    #[serde(rename = "messageID")]
    message_id: String,
    #[serde(rename = "partID")]
    part_id: String,
}

#[derive(Deserialize)]
struct RequestRef {
    #[serde(rename = "sessionID")]
    session_id: String,
    #[serde(rename = "requestID")]
    request_id: String,
}

#[derive(Deserialize)]
struct BranchPayload {
    #[serde(default)]
    branch: Option<String>,
}

fn parse<T: DeserializeOwned>(kind: &str, properties: Value) -> Result<T, EventDecodeError> {
    serde_json::from_value(properties).map_err(|source| EventDecodeError {
        kind: kind.to_string(),
        source,
    })
}

impl ServerEvent {
    pub fn decode(kind: &str, properties: Value) -> Result<Self, EventDecodeError> {
        let event = match kind {
            "project.updated" => Self::ProjectUpdated(parse(kind, properties)?),
            "global.disposed" => Self::GlobalDisposed,
            "session.created" => Self::SessionCreated(parse::<Info<_>>(kind, properties)?.info),
            "session.updated" => Self::SessionUpdated(parse::<Info<_>>(kind, properties)?.info),
            "session.deleted" => Self::SessionDeleted(parse::<Info<_>>(kind, properties)?.info),
            "session.diff" => {
                let p: DiffPayload = parse(kind, properties)?;
                Self::SessionDiff {
                    session_id: p.session_id,
                    diff: p.diff,
                }
            }
            "session.status" => {
                let p: StatusPayload = parse(kind, properties)?;
                Self::SessionStatus {
                    session_id: p.session_id,
                    status: p.status,
                }
            }
            "todo.updated" => {
                let p: TodoPayload = parse(kind, properties)?;
                Self::TodoUpdated {
                    session_id: p.session_id,
                    todos: p.todos,
                }
            }
            "message.updated" => Self::MessageUpdated(parse::<Info<_>>(kind, properties)?.info),
            "message.removed" => {
                let p: MessageRef = parse(kind, properties)?;
                Self::MessageRemoved {
                    session_id: p.session_id,
                    message_id: p.message_id,
                }
            }
            "message.part.updated" => Self::PartUpdated(parse::<PartPayload>(kind, properties)?.part),
            "message.part.removed" => {
                let p: PartRef = parse(kind, properties)?;
                Self::PartRemoved {
                    message_id: p.message_id,
                    part_id: p.part_id,
                }
            }
            "permission.asked" => Self::PermissionAsked(parse(kind, properties)?),
            "permission.replied" => {
                let p: RequestRef = parse(kind, properties)?;
                Self::PermissionReplied {
                    session_id: p.session_id,
                    request_id: p.request_id,
                }
            }
            "question.asked" => Self::QuestionAsked(parse(kind, properties)?),
            "question.replied" | "question.rejected" => {
                let p: RequestRef = parse(kind, properties)?;
                if kind == "question.replied" {
                    Self::QuestionReplied {
                        session_id: p.session_id,
                        request_id: p.request_id,
                    }
                } else {
                    Self::QuestionRejected {
                        session_id: p.session_id,
                        request_id: p.request_id,
                    }
                }
            }
            "vcs.branch.updated" => Self::VcsBranchUpdated {
                branch: parse::<BranchPayload>(kind, properties)?.branch,
            },
            "server.instance.disposed" => Self::ServerInstanceDisposed,
            "lsp.updated" => Self::LspUpdated,
            "file.watcher.updated" => Self::FileWatcherUpdated(parse(kind, properties)?),
            other => Self::Unknown(other.to_string()),
        };
        Ok(event)
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::ProjectUpdated(_) | Self::GlobalDisposed)
    }
}

/// Raw `{type, properties}` record as sent by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: Value,
}

impl RawEvent {
    pub fn decode(self) -> Result<ServerEvent, EventDecodeError> {
        ServerEvent::decode(&self.kind, self.properties)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalEnvelope {
    #[serde(default)]
    pub directory: Option<String>,
    pub payload: RawEvent,
}

impl GlobalEnvelope {
    pub fn is_global(&self) -> bool {
        self.directory
            .as_deref()
            .map_or(true, |dir| dir == GLOBAL_DIRECTORY)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/event.rs"]
mod tests;
