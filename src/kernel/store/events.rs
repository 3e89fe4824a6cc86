use crate::kernel::event::{ServerEvent, GLOBAL_DIRECTORY};
use crate::kernel::reducer::{apply_directory_event, apply_global_event};

impl super::Store {
    pub(super) fn reduce_server_event(
        &mut self,
        directory: &str,
        event: ServerEvent,
    ) -> super::DispatchResult {
        if directory == GLOBAL_DIRECTORY || event.is_global() {
            return apply_global_event(&event, &mut self.state.global);
        }

        let mut result = {
            let store = self
                .state
                .directories
                .entry(directory.to_string())
                .or_default();
            apply_directory_event(&event, directory, store)
        };

        // 文件监听事件同时交给当前工作区的文件上下文
        if let ServerEvent::FileWatcherUpdated(watch) = &event {
            if directory == self.state.files.directory() {
                let effects = self.state.files.invalidate_from_watcher(watch);
                result.state_changed |= !effects.is_empty();
                result.effects.extend(effects);
            }
        }
        result
    }
}
