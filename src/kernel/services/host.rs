use std::sync::Arc;

use super::bus::{KernelBusReceiver, KernelMessage};
use super::ports::EffectRunner;
use crate::kernel::event::{GlobalEnvelope, GLOBAL_DIRECTORY};
use crate::kernel::{Action, Effect, Store};

/// Owns the store on its thread and connects it to the effect runner.
///
/// Client effects go to the runner; effects only the embedder can act on
/// (bootstrap, lsp reload, global refresh, toasts) are returned from
/// [`SyncHost::dispatch`] and [`SyncHost::pump`].
pub struct SyncHost {
    store: Store,
    runner: Arc<dyn EffectRunner>,
    rx: KernelBusReceiver,
}

impl SyncHost {
    pub fn new(store: Store, runner: Arc<dyn EffectRunner>, rx: KernelBusReceiver) -> Self {
        Self { store, runner, rx }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let result = self.store.dispatch(action);
        result
            .effects
            .into_iter()
            .filter_map(|effect| self.runner.run(effect))
            .collect()
    }

    /// Applies everything background work has sent so far.
    pub fn pump(&mut self) -> Vec<Effect> {
        let mut out = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            let action = match message {
                KernelMessage::Action(action) => action,
                KernelMessage::Envelope(envelope) => match envelope_action(envelope) {
                    Some(action) => action,
                    None => continue,
                },
            };
            out.extend(self.dispatch(action));
        }
        out
    }
}

/// Decodes one stream envelope; malformed payloads are logged and dropped.
pub fn envelope_action(envelope: GlobalEnvelope) -> Option<Action> {
    let directory = if envelope.is_global() {
        GLOBAL_DIRECTORY.to_string()
    } else {
        envelope.directory.unwrap_or_default()
    };
    match envelope.payload.decode() {
        Ok(event) => Some(Action::ServerEvent { directory, event }),
        Err(err) => {
            tracing::warn!(directory = %directory, error = %err, "dropping undecodable event");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/services/host.rs"]
mod tests;
