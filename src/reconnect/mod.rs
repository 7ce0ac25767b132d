//! Automatic rejoin after an unexpected signaling disconnect.
pub mod reconnect_supervisor;

pub use reconnect_supervisor::{DEFAULT_RECONNECT_DELAY, ReconnectSupervisor};
