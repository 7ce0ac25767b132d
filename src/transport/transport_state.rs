use std::fmt;

/// Lifecycle of one WebRTC transport.
///
/// `Created` once the server's options were applied locally, `Connecting`
/// after our DTLS parameters went out, `Connected` only when the server
/// confirms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Uncreated,
    Created,
    Connecting,
    Connected,
    Closed,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uncreated => "uncreated",
            Self::Created => "created",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}
