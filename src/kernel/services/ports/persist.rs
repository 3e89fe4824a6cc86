//! 本地持久化：按 key 存取不透明的 JSON 字符串

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("persist io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persist json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait PersistBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

/// A persisted slot: one canonical key plus legacy keys tried on read.
#[derive(Clone)]
pub struct Persist {
    backend: Arc<dyn PersistBackend>,
    key: String,
    legacy: Vec<String>,
}

impl std::fmt::Debug for Persist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persist")
            .field("key", &self.key)
            .field("legacy", &self.legacy)
            .finish()
    }
}

impl Persist {
    /// `"{dir}/{name}"`
    pub fn workspace(backend: Arc<dyn PersistBackend>, dir: &str, name: &str) -> Self {
        Self {
            backend,
            key: format!("{dir}/{name}"),
            legacy: Vec::new(),
        }
    }

    /// `"{dir}/{session}/{name}"`, or the workspace key without a session.
    pub fn scoped(
        backend: Arc<dyn PersistBackend>,
        dir: &str,
        session: Option<&str>,
        name: &str,
    ) -> Self {
        match session {
            Some(session) => Self {
                backend,
                key: format!("{dir}/{session}/{name}"),
                legacy: Vec::new(),
            },
            None => Self::workspace(backend, dir, name),
        }
    }

    pub fn with_legacy(mut self, legacy: Vec<String>) -> Self {
        self.legacy = legacy;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn legacy(&self) -> &[String] {
        &self.legacy
    }

    /// Reads the canonical key, then each legacy key in order.
    ///
    /// Unreadable or unparsable slots are logged and skipped.
    pub fn load<T: DeserializeOwned>(&self) -> Option<T> {
        for key in std::iter::once(&self.key).chain(self.legacy.iter()) {
            let raw = match self.backend.get(key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "persist read failed");
                    continue;
                }
            };
            match serde_json::from_str(&raw) {
                Ok(value) => {
                    if key != &self.key {
                        tracing::info!(from = %key, to = %self.key, "migrating legacy persisted state");
                    }
                    return Some(value);
                }
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "persisted state is not valid json");
                }
            }
        }
        None
    }

    pub fn save<T: Serialize>(&self, value: &T) -> Result<(), PersistError> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(&self.key, &raw)
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/persist.rs"]
mod tests;
