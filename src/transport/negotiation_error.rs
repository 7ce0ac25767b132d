use std::fmt;

use crate::{
    protocol::types::{MediaKind, TransportDirection},
    transport::produce_options::ProducerSlot,
};

/// Failure of one negotiation step. Scoped to that step; the session
/// carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationError {
    /// The device rejected the router's RTP capabilities.
    DeviceLoad(String),
    DeviceNotLoaded,
    CannotProduce(MediaKind),
    TransportExists(TransportDirection),
    NoTransport(TransportDirection),
    AlreadyProducing(ProducerSlot),
    /// `producer_created` without a matching outstanding `produce`.
    UnexpectedProducer(ProducerSlot),
    /// Platform transport refused an operation.
    Transport(String),
}

impl fmt::Display for NegotiationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceLoad(e) => write!(f, "device failed to load RTP capabilities: {e}"),
            Self::DeviceNotLoaded => write!(f, "device not loaded"),
            Self::CannotProduce(kind) => write!(f, "device cannot produce {kind}"),
            Self::TransportExists(dir) => write!(f, "{dir} transport already exists"),
            Self::NoTransport(dir) => write!(f, "no {dir} transport"),
            Self::AlreadyProducing(slot) => write!(f, "{slot} producer already exists or is pending"),
            Self::UnexpectedProducer(slot) => write!(f, "unexpected {slot} producer reply"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl std::error::Error for NegotiationError {}
