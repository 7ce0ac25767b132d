use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::types::{
    ConsumerId, MediaKind, PeerId, PeerRole, ProducerId, RoomId, ScreenShareAction,
    TransportDirection,
};

/// Frames sent from the client to the signaling server.
///
/// The `type` discriminator is snake_case, payload fields are camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    // Membership
    JoinRoom {
        room_id: RoomId,
        peer_id: PeerId,
        user_id: String,
        display_name: String,
        role: PeerRole,
    },
    LeaveRoom {
        room_id: RoomId,
        peer_id: PeerId,
    },

    // Transport negotiation
    GetRouterRtpCapabilities {
        room_id: RoomId,
    },
    CreateWebrtcTransport {
        direction: TransportDirection,
    },
    ConnectWebrtcTransport {
        direction: TransportDirection,
        dtls_parameters: Value,
    },
    Produce {
        kind: MediaKind,
        rtp_parameters: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        app_data: Option<Value>,
    },
    Consume {
        producer_id: ProducerId,
        rtp_capabilities: Value,
    },
    ResumeConsumer {
        consumer_id: ConsumerId,
    },

    // Presenter / screen share
    RequestPresenterRole {
        room_id: RoomId,
        peer_id: PeerId,
    },
    StopPresenting {
        room_id: RoomId,
        peer_id: PeerId,
    },
    ScreenShare {
        action: ScreenShareAction,
        room_id: RoomId,
        peer_id: PeerId,
    },

    // Room admin
    MuteAll {
        room_id: RoomId,
        peer_id: PeerId,
    },
    UnmuteAll {
        room_id: RoomId,
        peer_id: PeerId,
    },
    MutePeer {
        room_id: RoomId,
        peer_id: PeerId,
        target_peer_id: PeerId,
    },
    UnmutePeer {
        room_id: RoomId,
        peer_id: PeerId,
        target_peer_id: PeerId,
    },
    LockRoom {
        room_id: RoomId,
        peer_id: PeerId,
    },
    UnlockRoom {
        room_id: RoomId,
        peer_id: PeerId,
    },
    StartRecording {
        room_id: RoomId,
        peer_id: PeerId,
    },
    StopRecording {
        room_id: RoomId,
        peer_id: PeerId,
    },
    ApprovePresenter {
        room_id: RoomId,
        peer_id: PeerId,
        target_peer_id: PeerId,
    },
    DenyPresenter {
        room_id: RoomId,
        peer_id: PeerId,
        target_peer_id: PeerId,
    },

    // Breakout rooms
    AssignBreakoutRoom {
        room_id: RoomId,
        peer_id: PeerId,
        target_peer_id: PeerId,
        breakout_room_id: RoomId,
    },
    JoinBreakoutRoom {
        room_id: RoomId,
        peer_id: PeerId,
        breakout_room_id: RoomId,
    },
    LeaveBreakoutRoom {
        room_id: RoomId,
        peer_id: PeerId,
        breakout_room_id: RoomId,
    },
}

impl ClientMessage {
    /// Wire name of the frame, for logging. Payloads are never logged here.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        use ClientMessage::*;
        match self {
            JoinRoom { .. } => "join_room",
            LeaveRoom { .. } => "leave_room",
            GetRouterRtpCapabilities { .. } => "get_router_rtp_capabilities",
            CreateWebrtcTransport { .. } => "create_webrtc_transport",
            ConnectWebrtcTransport { .. } => "connect_webrtc_transport",
            Produce { .. } => "produce",
            Consume { .. } => "consume",
            ResumeConsumer { .. } => "resume_consumer",
            RequestPresenterRole { .. } => "request_presenter_role",
            StopPresenting { .. } => "stop_presenting",
            ScreenShare { .. } => "screen_share",
            MuteAll { .. } => "mute_all",
            UnmuteAll { .. } => "unmute_all",
            MutePeer { .. } => "mute_peer",
            UnmutePeer { .. } => "unmute_peer",
            LockRoom { .. } => "lock_room",
            UnlockRoom { .. } => "unlock_room",
            StartRecording { .. } => "start_recording",
            StopRecording { .. } => "stop_recording",
            ApprovePresenter { .. } => "approve_presenter",
            DenyPresenter { .. } => "deny_presenter",
            AssignBreakoutRoom { .. } => "assign_breakout_room",
            JoinBreakoutRoom { .. } => "join_breakout_room",
            LeaveBreakoutRoom { .. } => "leave_breakout_room",
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn join_room_uses_snake_type_and_camel_fields() {
        let msg = ClientMessage::JoinRoom {
            room_id: "R1".into(),
            peer_id: "peer-1".into(),
            user_id: "u-7".into(),
            display_name: "Ada".into(),
            role: PeerRole::Attendee,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "join_room",
                "roomId": "R1",
                "peerId": "peer-1",
                "userId": "u-7",
                "displayName": "Ada",
                "role": "attendee"
            })
        );
    }

    #[test]
    fn produce_omits_app_data_unless_screen() {
        let camera = ClientMessage::Produce {
            kind: MediaKind::Video,
            rtp_parameters: json!({"codecs": []}),
            app_data: None,
        };
        let v = serde_json::to_value(&camera).unwrap();
        assert_eq!(v["type"], "produce");
        assert!(v.get("appData").is_none());

        let screen = ClientMessage::Produce {
            kind: MediaKind::Video,
            rtp_parameters: json!({}),
            app_data: Some(json!({"source": "screen"})),
        };
        assert_eq!(
            serde_json::to_value(&screen).unwrap()["appData"]["source"],
            "screen"
        );
    }

    #[test]
    fn type_name_matches_serialized_tag() {
        let msgs = [
            ClientMessage::CreateWebrtcTransport {
                direction: TransportDirection::Send,
            },
            ClientMessage::ScreenShare {
                action: ScreenShareAction::Stop,
                room_id: "R".into(),
                peer_id: "p".into(),
            },
            ClientMessage::AssignBreakoutRoom {
                room_id: "R".into(),
                peer_id: "p".into(),
                target_peer_id: "q".into(),
                breakout_room_id: "B1".into(),
            },
        ];
        for msg in msgs {
            let v = serde_json::to_value(&msg).unwrap();
            assert_eq!(v["type"], msg.type_name());
        }
    }
}
