use crate::kernel::action::FileAction;

impl super::Store {
    pub(super) fn reduce_file_action(&mut self, action: FileAction) -> super::DispatchResult {
        let files = &mut self.state.files;
        match action {
            FileAction::Load { path, force } => {
                let effect = files.load(&path, force);
                super::DispatchResult::from_option((effect.is_some(), effect))
            }
            FileAction::Touch { path } => {
                files.touch(&path);
                super::DispatchResult::none()
            }
            FileAction::ListDir { path, force } => {
                let effect = files.list_dir(&path, force);
                super::DispatchResult::from_option((effect.is_some(), effect))
            }
            FileAction::Expand { path } => {
                super::DispatchResult::from_option(files.expand_dir(&path))
            }
            FileAction::Collapse { path } => super::DispatchResult::changed(files.collapse_dir(&path)),
            FileAction::Toggle { path } => {
                super::DispatchResult::from_option(files.toggle_dir(&path))
            }
        }
    }
}
