//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod event_stream;
pub mod file_watcher;
pub mod paths;
pub mod persist;
pub mod runtime;
pub mod settings;

pub use event_stream::SseDecoder;
pub use file_watcher::LocalWatcher;
pub use paths::{ensure_log_dir, ensure_state_dir, get_app_data_dir, get_log_dir, get_state_dir};
pub use persist::{JsonFilePersist, MemoryPersist};
pub use runtime::AsyncRuntime;
pub use settings::{ensure_settings_file, get_settings_path, load_settings, load_settings_from};
