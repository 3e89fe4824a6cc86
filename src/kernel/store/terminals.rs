use crate::kernel::action::TerminalAction;
use crate::kernel::effect::PtyPurpose;
use crate::kernel::services::ports::PtyInfo;
use crate::kernel::state::Scope;
use crate::kernel::Effect;

impl super::Store {
    pub(super) fn reduce_terminal_action(&mut self, action: TerminalAction) -> super::DispatchResult {
        let session = self.state.terminals.session(&self.state.scope);
        match action {
            TerminalAction::New => super::DispatchResult::effects(vec![session.create_new()]),
            TerminalAction::Update(patch) => super::DispatchResult::from_pair(session.update(patch)),
            TerminalAction::Clone { id } => {
                super::DispatchResult::effects(session.clone_pty(&id).into_iter().collect())
            }
            TerminalAction::Open { id } => super::DispatchResult::changed(session.open(&id)),
            TerminalAction::Close { id } => super::DispatchResult::from_pair(session.close(&id)),
            TerminalAction::Move { id, to } => {
                super::DispatchResult::changed(session.move_pty(&id, to))
            }
            TerminalAction::Split { tab_id, direction } => super::DispatchResult::effects(
                session.split(&tab_id, direction).into_iter().collect(),
            ),
            TerminalAction::CloseSplit { tab_id, panel_id } => {
                super::DispatchResult::from_pair(session.close_split(&tab_id, &panel_id))
            }
            TerminalAction::ResizeSplit {
                tab_id,
                panel_id,
                sizes,
            } => super::DispatchResult::changed(session.resize_split(&tab_id, &panel_id, sizes)),
            TerminalAction::Focus { tab_id, panel_id } => {
                super::DispatchResult::changed(session.focus(&tab_id, &panel_id))
            }
            TerminalAction::CloseTab { tab_id } => {
                super::DispatchResult::from_pair(session.close_tab(&tab_id))
            }
        }
    }

    /// Applies a pty creation to the session that asked for it.
    ///
    /// The session may have been evicted meanwhile; the pty is then orphaned
    /// and removed remotely.
    pub(super) fn reduce_pty_created(
        &mut self,
        scope: Scope,
        purpose: PtyPurpose,
        result: Result<PtyInfo, String>,
    ) -> super::DispatchResult {
        if let Some(session) = self.state.terminals.resident(&scope) {
            return super::DispatchResult::from_pair(session.apply_created(purpose, result));
        }
        match result {
            Ok(info) => {
                tracing::debug!(
                    directory = %scope.directory,
                    id = %info.id,
                    "terminal session gone, removing created pty"
                );
                super::DispatchResult::effects(vec![Effect::PtyRemove {
                    directory: scope.directory,
                    id: info.id,
                }])
            }
            Err(_) => super::DispatchResult::none(),
        }
    }
}
