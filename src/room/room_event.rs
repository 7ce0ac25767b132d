use std::time::Duration;

use crate::{
    protocol::types::{PeerId, ProducerId},
    room::session_state::ConnectionPhase,
};

/// What changed during one `RoomClient::poll` or façade call, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    PhaseChanged(ConnectionPhase),
    Joined { peer_id: PeerId },
    Left,
    RoomUpdated,
    PeerJoined(PeerId),
    PeerLeft(PeerId),
    PeerUpdated(PeerId),
    PresenterQueued { position: u32 },
    PresenterAdded(PeerId),
    PresenterRemoved(PeerId),
    ScreenShareChanged { active: bool },
    RemoteStreamAdded { producer_id: ProducerId, peer_id: PeerId },
    RemoteStreamRemoved { producer_id: ProducerId },
    ReconnectScheduled { delay: Duration },
    Reconnecting,
    Error(String),
}
