use crate::kernel::services::ports::PtySize;
use crate::kernel::state::Scope;
use crate::models::SplitDirection;

/// Why a pty is being created; decides what happens once its id arrives.
#[derive(Debug, Clone, PartialEq)]
pub enum PtyPurpose {
    New { title_number: u32 },
    Clone { id: String },
    Split { tab_id: String, direction: SplitDirection },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ListDir {
        directory: String,
        path: String,
    },
    ReadFile {
        directory: String,
        path: String,
    },
    PtyCreate {
        scope: Scope,
        title: String,
        purpose: PtyPurpose,
    },
    PtyUpdate {
        directory: String,
        id: String,
        title: Option<String>,
        size: Option<PtySize>,
    },
    PtyRemove {
        directory: String,
        id: String,
    },
    /// Re-subscribe and refetch one workspace.
    Bootstrap {
        directory: String,
    },
    LoadLsp {
        directory: String,
    },
    RefreshGlobal,
    Toast {
        title: String,
        message: String,
    },
}
