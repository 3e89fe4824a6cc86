use serde::{Deserialize, Serialize};

use crate::models::content_lru::{DEFAULT_MAX_CONTENT_BYTES, DEFAULT_MAX_CONTENT_ENTRIES};

/// Cache limits. These are tuning values, not correctness bounds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    pub max_terminal_sessions: usize,
    pub max_view_sessions: usize,
    pub max_view_files: usize,
    pub max_content_entries: usize,
    pub max_content_bytes: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_terminal_sessions: 20,
            max_view_sessions: 20,
            max_view_files: 500,
            max_content_entries: DEFAULT_MAX_CONTENT_ENTRIES,
            max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
        }
    }
}
