//! Services layer (ports + adapters).
//!
//! - `ports`: contracts the kernel depends on (client, persistence, runtime).
//! - `adapters`: OS/runtime specific implementations (IO/async).

pub mod adapters;
pub mod bus;
pub mod host;
pub mod ports;

pub use bus::{kernel_bus, KernelBusReceiver, KernelBusSender, KernelMessage};
pub use host::{envelope_action, SyncHost};
