//! RustyRoom is the client core of a live-streaming room: it joins an
//! SFU-backed room through a WebSocket signaling server, negotiates send and
//! receive transports, produces local camera/microphone/screen tracks,
//! consumes remote ones and keeps the room, roster and presenter state in
//! sync with the server.
//!
//! The platform media stack is reached through traits
//! ([`media_devices::MediaBackend`], [`transport::NegotiationDevice`],
//! [`transport::MediaTransport`]); the application drives everything through
//! [`client::RoomClient`] and its `poll()` loop.

/// Public session façade.
pub mod client;
/// Handles configuration loading and management.
pub mod config;
/// Logging utilities for the client.
pub mod log;
/// Local capture devices and streams.
pub mod media_devices;
/// Reconnection after unexpected signaling loss.
pub mod reconnect;
/// Room membership state machine and outbound command builders.
pub mod room;
/// Signaling client for communicating with the signaling server.
pub mod signaling_client;
/// Signaling wire protocol (JSON frames).
pub mod protocol;
/// TLS (Transport Layer Security) utility functions.
pub mod tls_utils;
/// Send/receive transports, producers and consumers.
pub mod transport;
