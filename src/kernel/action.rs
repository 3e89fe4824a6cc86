use crate::kernel::effect::PtyPurpose;
use crate::kernel::event::ServerEvent;
use crate::kernel::services::ports::PtyInfo;
use crate::kernel::state::Scope;
use crate::models::{FileNode, SelectedLineRange, SplitDirection};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetScope {
        directory: String,
        session: Option<String>,
    },
    /// One decoded server event; `directory` is `"global"` for global events.
    ServerEvent {
        directory: String,
        event: ServerEvent,
    },
    File(FileAction),
    Terminal(TerminalAction),
    View(ViewAction),

    DirListed {
        directory: String,
        path: String,
        result: Result<Vec<FileNode>, String>,
    },
    FileRead {
        directory: String,
        path: String,
        result: Result<String, String>,
    },
    PtyCreated {
        scope: Scope,
        purpose: PtyPurpose,
        result: Result<PtyInfo, String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileAction {
    Load { path: String, force: bool },
    /// Marks cached content as recently used.
    Touch { path: String },
    ListDir { path: String, force: bool },
    Expand { path: String },
    Collapse { path: String },
    Toggle { path: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PtyPatch {
    pub id: String,
    pub title: Option<String>,
    pub rows: Option<u16>,
    pub cols: Option<u16>,
    pub buffer: Option<String>,
    pub scroll_y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TerminalAction {
    New,
    Update(PtyPatch),
    Clone {
        id: String,
    },
    Open {
        id: String,
    },
    Close {
        id: String,
    },
    Move {
        id: String,
        to: usize,
    },
    Split {
        tab_id: String,
        direction: SplitDirection,
    },
    CloseSplit {
        tab_id: String,
        panel_id: String,
    },
    ResizeSplit {
        tab_id: String,
        panel_id: String,
        sizes: [f64; 2],
    },
    Focus {
        tab_id: String,
        panel_id: String,
    },
    CloseTab {
        tab_id: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    SetScrollTop {
        path: String,
        top: f64,
    },
    SetScrollLeft {
        path: String,
        left: f64,
    },
    SetSelectedLines {
        path: String,
        range: Option<SelectedLineRange>,
    },
}
