//! Service ports: traits + data contracts.

pub mod client;
pub mod config;
pub mod persist;
pub mod runtime;

pub use client::{ClientError, ClientResult, PtyInfo, PtySize, WorkspaceClient};
pub use config::SyncConfig;
pub use persist::{Persist, PersistBackend, PersistError};
pub use runtime::{AsyncExecutor, BoxFuture, EffectRunner};
