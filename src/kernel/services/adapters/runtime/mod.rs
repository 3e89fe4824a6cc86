//! Async runtime adapter: runs client effects and sends completions back over the kernel bus.

mod async_runtime;

pub use async_runtime::AsyncRuntime;
