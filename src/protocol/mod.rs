//! Signaling wire protocol: one JSON object per WebSocket text frame,
//! discriminated by a snake_case `type` field.
pub mod client_message;
pub mod codec;
pub mod protocol_error;
pub mod server_message;
pub mod types;

pub use client_message::ClientMessage;
pub use codec::{Decoded, decode, encode};
pub use protocol_error::ProtocolError;
pub use server_message::ServerMessage;
