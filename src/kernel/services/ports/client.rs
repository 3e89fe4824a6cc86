//! Remote workspace server contract.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::runtime::BoxFuture;
use crate::models::FileNode;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtyInfo {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtySize {
    pub rows: u16,
    pub cols: u16,
}

/// Calls made against the server on behalf of one workspace directory.
///
/// Implementations must be cheap to share; every call is spawned onto the
/// runtime and its result is fed back to the store as an action.
pub trait WorkspaceClient: Send + Sync {
    fn list(&self, directory: &str, path: &str) -> BoxFuture<ClientResult<Vec<FileNode>>>;

    fn read(&self, directory: &str, path: &str) -> BoxFuture<ClientResult<String>>;

    fn pty_create(&self, directory: &str, title: &str) -> BoxFuture<ClientResult<PtyInfo>>;

    fn pty_update(
        &self,
        directory: &str,
        id: &str,
        title: Option<String>,
        size: Option<PtySize>,
    ) -> BoxFuture<ClientResult<()>>;

    fn pty_remove(&self, directory: &str, id: &str) -> BoxFuture<ClientResult<()>>;
}
