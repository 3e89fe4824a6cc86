//! 数据模型层

pub mod content_lru;
pub mod file_tree;
pub mod pane_tree;
pub mod path;
pub mod scoped_cache;
pub mod selection;

pub use content_lru::{approx_bytes, ContentLru};
pub use file_tree::{DirState, FileNode, FileTree, NodeKind};
pub use pane_tree::{
    compute_layout, compute_panel_bounds, split_handle, split_percent_from_pointer, CloseOutcome,
    Pane, PaneError, Panel, Rect, SplitDirection, SplitHandle,
};
pub use path::PathHelpers;
pub use scoped_cache::ScopedCache;
pub use selection::{DiffSide, SelectedLineRange};
