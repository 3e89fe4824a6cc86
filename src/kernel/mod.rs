//! Headless sync core (state/action/effect).

pub mod action;
pub mod effect;
pub mod event;
pub mod file;
pub mod reducer;
pub mod services;
pub mod state;
pub mod store;
pub mod terminal;
pub mod types;
pub mod view_cache;

pub use action::{Action, FileAction, PtyPatch, TerminalAction, ViewAction};
pub use effect::{Effect, PtyPurpose};
pub use event::{GlobalEnvelope, RawEvent, ServerEvent, WatchEvent, WatchKind};
pub use file::{FileContext, FileState};
pub use state::{DirectoryState, GlobalState, Scope, SyncState};
pub use store::{DispatchResult, Store};
pub use terminal::{LocalPty, TerminalCache, TerminalSession, TerminalSnapshot};
pub use view_cache::{FileViewCache, FileViewState, ViewSession};
