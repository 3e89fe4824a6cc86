use crate::kernel::action::ViewAction;

impl super::Store {
    pub(super) fn reduce_view_action(&mut self, action: ViewAction) -> super::DispatchResult {
        let view = self.state.views.load(&self.state.scope);
        let changed = match action {
            ViewAction::SetScrollTop { path, top } => view.set_scroll_top(&path, top),
            ViewAction::SetScrollLeft { path, left } => view.set_scroll_left(&path, left),
            ViewAction::SetSelectedLines { path, range } => view.set_selected_lines(&path, range),
        };
        super::DispatchResult::changed(changed)
    }
}
