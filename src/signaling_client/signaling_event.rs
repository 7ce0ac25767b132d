use crate::protocol::ServerMessage;

/// What the network thread reports back, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalingEvent {
    Message(ServerMessage),
    /// A well-formed frame whose `type` this client does not know.
    Unrecognized(String),
    /// The socket is gone. Always the last event of a connection.
    Closed { code: u16, reason: String },
}
