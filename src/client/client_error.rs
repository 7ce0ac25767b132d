use std::fmt;

use crate::{
    media_devices::MediaError, signaling_client::SignalingClientError,
    transport::NegotiationError,
};

/// Failures surfaced by [`RoomClient`](crate::client::RoomClient).
///
/// The façade never returns these for expected failures: it records the
/// rendered message as the session error and emits `RoomEvent::Error`.
#[derive(Debug)]
pub enum ClientError {
    /// Camera/microphone/display denied or unavailable.
    MediaAccess(MediaError),
    /// The device could not load the router's capabilities.
    MediaCapability(NegotiationError),
    /// Signaling could not be opened or was lost.
    SignalingTransport(SignalingClientError),
    /// One produce/consume/connect step failed.
    Negotiation(NegotiationError),
    /// The server sent an `error` frame.
    ServerReported(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MediaAccess(e) => write!(f, "Failed to access camera/microphone: {e}"),
            Self::MediaCapability(e) => write!(f, "Media capabilities not supported: {e}"),
            Self::SignalingTransport(e) => write!(f, "Signaling connection failed: {e}"),
            Self::Negotiation(e) => write!(f, "Media negotiation failed: {e}"),
            Self::ServerReported(msg) => write!(f, "Server error: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MediaAccess(e) => Some(e),
            Self::MediaCapability(e) | Self::Negotiation(e) => Some(e),
            Self::SignalingTransport(e) => Some(e),
            Self::ServerReported(_) => None,
        }
    }
}

impl From<MediaError> for ClientError {
    fn from(e: MediaError) -> Self {
        Self::MediaAccess(e)
    }
}

impl From<SignalingClientError> for ClientError {
    fn from(e: SignalingClientError) -> Self {
        Self::SignalingTransport(e)
    }
}
