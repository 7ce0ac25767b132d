use std::{fmt, io};

use crate::protocol::ProtocolError;

/// Errors of the signaling connection.
///
/// After the handshake, the only thing `send()` can report is that the
/// network thread has exited and dropped its command receiver.
#[derive(Debug)]
pub enum SignalingClientError {
    InvalidEndpoint(String),
    Io(io::Error),
    Handshake(String),
    Ws(tungstenite::Error),
    Protocol(ProtocolError),
    /// The connection ended without an intentional close.
    Closed { code: u16, reason: String },
    Disconnected,
}

impl fmt::Display for SignalingClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEndpoint(e) => write!(f, "invalid signaling endpoint: {e}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Handshake(e) => write!(f, "WebSocket handshake failed: {e}"),
            Self::Ws(e) => write!(f, "WebSocket error: {e}"),
            Self::Protocol(e) => write!(f, "protocol error: {e}"),
            Self::Closed { code, reason } if reason.is_empty() => {
                write!(f, "signaling connection lost (code {code})")
            }
            Self::Closed { code, reason } => {
                write!(f, "signaling connection lost (code {code}): {reason}")
            }
            Self::Disconnected => write!(f, "signaling client disconnected"),
        }
    }
}

impl std::error::Error for SignalingClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Ws(e) => Some(e),
            Self::Protocol(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SignalingClientError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<tungstenite::Error> for SignalingClientError {
    fn from(e: tungstenite::Error) -> Self {
        Self::Ws(e)
    }
}

impl From<ProtocolError> for SignalingClientError {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}
