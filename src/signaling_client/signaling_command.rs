use crate::protocol::ClientMessage;

/// Commands issued by the room client into the signaling network thread.
#[derive(Debug)]
pub enum SignalingCommand {
    Send(ClientMessage),
    Close { code: u16 },
}
