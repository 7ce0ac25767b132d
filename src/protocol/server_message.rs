use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::types::{
    ConnectionQuality, ConsumerId, MediaKind, PeerId, PeerInfo, ProducerId, RoomInfo,
    TransportDirection, TransportOptions,
};

/// Frames received from the signaling server.
///
/// Top-level payload fields are snake_case; nested records (`RoomInfo`,
/// `PeerInfo`, `TransportOptions`) are camelCase. Unknown `type` values
/// decode to [`ServerMessage::Unrecognized`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    // Membership
    RoomJoined {
        room_info: RoomInfo,
        #[serde(default)]
        peers: Vec<PeerInfo>,
        /// Peer id assigned by the server, when it overrides the one we sent.
        #[serde(default)]
        peer_id: Option<PeerId>,
    },
    RoomUpdated {
        room_info: RoomInfo,
    },
    PeerJoined {
        peer: PeerInfo,
    },
    PeerLeft {
        peer_id: PeerId,
    },
    PeerUpdated {
        peer_id: PeerId,
        #[serde(default)]
        audio_enabled: Option<bool>,
        #[serde(default)]
        video_enabled: Option<bool>,
        #[serde(default)]
        connection_quality: Option<ConnectionQuality>,
    },

    // Transport negotiation
    RouterRtpCapabilities {
        rtp_capabilities: Value,
    },
    WebrtcTransportCreated {
        direction: TransportDirection,
        transport_options: TransportOptions,
    },
    WebrtcTransportConnected {
        direction: TransportDirection,
    },
    ProducerCreated {
        #[serde(alias = "id")]
        producer_id: ProducerId,
        kind: MediaKind,
        #[serde(default)]
        app_data: Option<Value>,
    },
    ConsumerCreated {
        #[serde(alias = "id")]
        consumer_id: ConsumerId,
        producer_id: ProducerId,
        kind: MediaKind,
        #[serde(default)]
        rtp_parameters: Value,
        #[serde(default)]
        producer_paused: bool,
        #[serde(default)]
        peer_id: Option<PeerId>,
    },
    NewProducer {
        producer_id: ProducerId,
        peer_id: PeerId,
        kind: MediaKind,
        #[serde(default)]
        app_data: Option<Value>,
    },

    // Presenter / screen share
    PresenterAdded {
        peer_id: PeerId,
    },
    PresenterRemoved {
        peer_id: PeerId,
    },
    PresenterQueued {
        position: u32,
        #[serde(default)]
        peer_id: Option<PeerId>,
    },
    ScreenShareStarted {
        peer_id: PeerId,
    },
    ScreenShareStopped {
        peer_id: PeerId,
    },

    // Room controls
    RoomMutedAll {
        #[serde(default)]
        muted_all: Option<bool>,
    },
    RoomUnmutedAll {
        #[serde(default)]
        muted_all: Option<bool>,
    },
    RoomLocked {
        #[serde(default)]
        is_locked: Option<bool>,
    },
    RoomUnlocked {
        #[serde(default)]
        is_locked: Option<bool>,
    },
    RecordingStarted {
        #[serde(default)]
        is_recording: Option<bool>,
    },
    RecordingStopped {
        #[serde(default)]
        is_recording: Option<bool>,
    },

    Error {
        message: String,
        #[serde(default)]
        code: Option<String>,
    },

    #[serde(other)]
    Unrecognized,
}

impl ServerMessage {
    /// Wire name of the frame, for logging.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        use ServerMessage::*;
        match self {
            RoomJoined { .. } => "room_joined",
            RoomUpdated { .. } => "room_updated",
            PeerJoined { .. } => "peer_joined",
            PeerLeft { .. } => "peer_left",
            PeerUpdated { .. } => "peer_updated",
            RouterRtpCapabilities { .. } => "router_rtp_capabilities",
            WebrtcTransportCreated { .. } => "webrtc_transport_created",
            WebrtcTransportConnected { .. } => "webrtc_transport_connected",
            ProducerCreated { .. } => "producer_created",
            ConsumerCreated { .. } => "consumer_created",
            NewProducer { .. } => "new_producer",
            PresenterAdded { .. } => "presenter_added",
            PresenterRemoved { .. } => "presenter_removed",
            PresenterQueued { .. } => "presenter_queued",
            ScreenShareStarted { .. } => "screen_share_started",
            ScreenShareStopped { .. } => "screen_share_stopped",
            RoomMutedAll { .. } => "room_muted_all",
            RoomUnmutedAll { .. } => "room_unmuted_all",
            RoomLocked { .. } => "room_locked",
            RoomUnlocked { .. } => "room_unlocked",
            RecordingStarted { .. } => "recording_started",
            RecordingStopped { .. } => "recording_stopped",
            Error { .. } => "error",
            Unrecognized => "unrecognized",
        }
    }
}
