use std::io;
use std::sync::Arc;

use crate::kernel::services::bus::KernelBusSender;
use crate::kernel::services::ports::{AsyncExecutor, BoxFuture, EffectRunner, WorkspaceClient};
use crate::kernel::{Action, Effect};

pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
    bus: KernelBusSender,
    client: Arc<dyn WorkspaceClient>,
}

impl AsyncRuntime {
    pub fn new(bus: KernelBusSender, client: Arc<dyn WorkspaceClient>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self {
            runtime,
            bus,
            client,
        })
    }

    pub fn tokio_handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    fn reply(bus: &KernelBusSender, action: Action) {
        if bus.send_action(action).is_err() {
            tracing::debug!("kernel bus closed, dropping completion");
        }
    }

    pub fn list_dir(&self, directory: String, path: String) {
        let bus = self.bus.clone();
        let task = self.client.list(&directory, &path);
        self.runtime.spawn(async move {
            let result = task.await.map_err(|e| e.to_string());
            Self::reply(
                &bus,
                Action::DirListed {
                    directory,
                    path,
                    result,
                },
            );
        });
    }

    pub fn read_file(&self, directory: String, path: String) {
        let bus = self.bus.clone();
        let task = self.client.read(&directory, &path);
        self.runtime.spawn(async move {
            let result = task.await.map_err(|e| e.to_string());
            Self::reply(
                &bus,
                Action::FileRead {
                    directory,
                    path,
                    result,
                },
            );
        });
    }

    pub fn run_effect(&self, effect: Effect) -> Option<Effect> {
        match effect {
            Effect::ListDir { directory, path } => self.list_dir(directory, path),
            Effect::ReadFile { directory, path } => self.read_file(directory, path),
            Effect::PtyCreate {
                scope,
                title,
                purpose,
            } => {
                let bus = self.bus.clone();
                let task = self.client.pty_create(&scope.directory, &title);
                self.runtime.spawn(async move {
                    let result = task.await.map_err(|e| e.to_string());
                    Self::reply(
                        &bus,
                        Action::PtyCreated {
                            scope,
                            purpose,
                            result,
                        },
                    );
                });
            }
            Effect::PtyUpdate {
                directory,
                id,
                title,
                size,
            } => {
                let task = self.client.pty_update(&directory, &id, title, size);
                self.runtime.spawn(async move {
                    if let Err(err) = task.await {
                        tracing::warn!(directory = %directory, id = %id, error = %err, "pty update failed");
                    }
                });
            }
            Effect::PtyRemove { directory, id } => {
                let task = self.client.pty_remove(&directory, &id);
                self.runtime.spawn(async move {
                    if let Err(err) = task.await {
                        tracing::warn!(directory = %directory, id = %id, error = %err, "pty remove failed");
                    }
                });
            }
            other => return Some(other),
        }
        None
    }
}

impl EffectRunner for AsyncRuntime {
    fn run(&self, effect: Effect) -> Option<Effect> {
        self.run_effect(effect)
    }
}

impl AsyncExecutor for AsyncRuntime {
    fn spawn(&self, task: BoxFuture) {
        self.runtime.spawn(task);
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/runtime/async_runtime.rs"]
mod tests;
