//! Persistent WebSocket connection to the signaling server.
pub mod channel;
pub mod close_code;
pub mod endpoint;
pub mod signaling_client_c;
pub mod signaling_client_error;
pub mod signaling_command;
pub mod signaling_event;

pub use channel::{SignalingChannel, SignalingConnector, SignalingLink, WsConnector};
pub use endpoint::build_endpoint;
pub use signaling_client_c::SignalingClient;
pub use signaling_client_error::SignalingClientError;
pub use signaling_event::SignalingEvent;
