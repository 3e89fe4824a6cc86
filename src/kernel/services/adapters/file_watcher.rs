//! 本地文件监听：把 notify 事件折叠成 `file.watcher.updated` 形状的事件
//!
//! 远端服务器不推送监听事件时（本地工作区），由它补上同样的通知。

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use crate::kernel::event::{ServerEvent, WatchEvent, WatchKind};
use crate::kernel::Action;

const WATCHER_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct LocalWatcher {
    watcher: RecommendedWatcher,
    raw_event_rx: mpsc::Receiver<notify::Event>,
    directory: String,
    root: PathBuf,
}

impl LocalWatcher {
    pub fn new(directory: &str) -> Result<Self, notify::Error> {
        let root = PathBuf::from(directory);
        let root = root.canonicalize().unwrap_or(root);
        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    let _ = tx.send(event);
                }
                Err(err) => tracing::warn!(error = %err, "file watcher error"),
            },
            Config::default().with_poll_interval(WATCHER_POLL_INTERVAL),
        )?;
        watcher.watch(&root, RecursiveMode::Recursive)?;
        tracing::debug!(root = %root.display(), "file watcher started");
        Ok(Self {
            watcher,
            raw_event_rx: rx,
            directory: directory.to_string(),
            root,
        })
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Pending notifications, deduplicated, in arrival order.
    pub fn drain_events(&mut self) -> Vec<WatchEvent> {
        let _watcher_guard = &self.watcher;

        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        while let Ok(event) = self.raw_event_rx.try_recv() {
            for (path, kind) in normalize_notify_event(event) {
                let Some(file) = self.to_workspace_path(&path) else {
                    continue;
                };
                if seen.insert((file.clone(), kind)) {
                    out.push(WatchEvent { file, event: kind });
                }
            }
        }
        out
    }

    /// Drained events as store actions for this watcher's directory.
    pub fn drain_actions(&mut self) -> Vec<Action> {
        self.drain_events()
            .into_iter()
            .map(|event| Action::ServerEvent {
                directory: self.directory.clone(),
                event: ServerEvent::FileWatcherUpdated(event),
            })
            .collect()
    }

    fn to_workspace_path(&self, path: &Path) -> Option<String> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let relative = path.strip_prefix(&self.root).ok()?;
        if relative.as_os_str().is_empty() {
            return None;
        }
        Some(Path::new(&self.directory).join(relative).to_string_lossy().into_owned())
    }
}

fn normalize_notify_event(event: notify::Event) -> Vec<(PathBuf, WatchKind)> {
    let kind = match event.kind {
        EventKind::Create(_) => WatchKind::Add,
        EventKind::Remove(_) => WatchKind::Unlink,
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() >= 2 => {
            let mut paths = event.paths.into_iter();
            return paths
                .next()
                .map(|from| (from, WatchKind::Unlink))
                .into_iter()
                .chain(paths.next().map(|to| (to, WatchKind::Add)))
                .collect();
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => WatchKind::Unlink,
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => WatchKind::Add,
        EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
        EventKind::Modify(_) => WatchKind::Change,
        _ => return Vec::new(),
    };
    event.paths.into_iter().map(|path| (path, kind)).collect()
}
