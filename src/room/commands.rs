use crate::protocol::{
    ClientMessage,
    types::{ConsumerId, MediaKind, PeerId, PeerRole, ProducerId, RoomId, ScreenShareAction, TransportDirection},
};
use serde_json::Value;

/// Builds outbound frames for one membership. Stateless: every call yields
/// a complete envelope and nothing waits for a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuilder {
    room_id: RoomId,
    peer_id: PeerId,
}

impl CommandBuilder {
    pub fn new(room_id: impl Into<RoomId>, peer_id: impl Into<PeerId>) -> Self {
        Self {
            room_id: room_id.into(),
            peer_id: peer_id.into(),
        }
    }

    #[must_use]
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    #[must_use]
    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    #[must_use]
    pub fn join_room(&self, user_id: &str, display_name: &str, role: PeerRole) -> ClientMessage {
        ClientMessage::JoinRoom {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            role,
        }
    }

    #[must_use]
    pub fn leave_room(&self) -> ClientMessage {
        ClientMessage::LeaveRoom {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
        }
    }

    #[must_use]
    pub fn get_router_rtp_capabilities(&self) -> ClientMessage {
        ClientMessage::GetRouterRtpCapabilities {
            room_id: self.room_id.clone(),
        }
    }

    #[must_use]
    pub fn create_webrtc_transport(direction: TransportDirection) -> ClientMessage {
        ClientMessage::CreateWebrtcTransport { direction }
    }

    #[must_use]
    pub fn connect_webrtc_transport(direction: TransportDirection, dtls_parameters: Value) -> ClientMessage {
        ClientMessage::ConnectWebrtcTransport {
            direction,
            dtls_parameters,
        }
    }

    #[must_use]
    pub fn produce(kind: MediaKind, rtp_parameters: Value, app_data: Option<Value>) -> ClientMessage {
        ClientMessage::Produce {
            kind,
            rtp_parameters,
            app_data,
        }
    }

    #[must_use]
    pub fn consume(producer_id: ProducerId, rtp_capabilities: Value) -> ClientMessage {
        ClientMessage::Consume {
            producer_id,
            rtp_capabilities,
        }
    }

    #[must_use]
    pub fn resume_consumer(consumer_id: ConsumerId) -> ClientMessage {
        ClientMessage::ResumeConsumer { consumer_id }
    }

    #[must_use]
    pub fn request_presenter_role(&self) -> ClientMessage {
        ClientMessage::RequestPresenterRole {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
        }
    }

    #[must_use]
    pub fn stop_presenting(&self) -> ClientMessage {
        ClientMessage::StopPresenting {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
        }
    }

    #[must_use]
    pub fn screen_share(&self, action: ScreenShareAction) -> ClientMessage {
        ClientMessage::ScreenShare {
            action,
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
        }
    }

    #[must_use]
    pub fn mute_all(&self) -> ClientMessage {
        ClientMessage::MuteAll {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
        }
    }

    #[must_use]
    pub fn unmute_all(&self) -> ClientMessage {
        ClientMessage::UnmuteAll {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
        }
    }

    #[must_use]
    pub fn mute_peer(&self, target: &str) -> ClientMessage {
        ClientMessage::MutePeer {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
            target_peer_id: target.to_string(),
        }
    }

    #[must_use]
    pub fn unmute_peer(&self, target: &str) -> ClientMessage {
        ClientMessage::UnmutePeer {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
            target_peer_id: target.to_string(),
        }
    }

    #[must_use]
    pub fn lock_room(&self) -> ClientMessage {
        ClientMessage::LockRoom {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
        }
    }

    #[must_use]
    pub fn unlock_room(&self) -> ClientMessage {
        ClientMessage::UnlockRoom {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
        }
    }

    #[must_use]
    pub fn start_recording(&self) -> ClientMessage {
        ClientMessage::StartRecording {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
        }
    }

    #[must_use]
    pub fn stop_recording(&self) -> ClientMessage {
        ClientMessage::StopRecording {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
        }
    }

    #[must_use]
    pub fn approve_presenter(&self, target: &str) -> ClientMessage {
        ClientMessage::ApprovePresenter {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
            target_peer_id: target.to_string(),
        }
    }

    #[must_use]
    pub fn deny_presenter(&self, target: &str) -> ClientMessage {
        ClientMessage::DenyPresenter {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
            target_peer_id: target.to_string(),
        }
    }

    #[must_use]
    pub fn assign_breakout_room(&self, target: &str, breakout_room_id: &str) -> ClientMessage {
        ClientMessage::AssignBreakoutRoom {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
            target_peer_id: target.to_string(),
            breakout_room_id: breakout_room_id.to_string(),
        }
    }

    #[must_use]
    pub fn join_breakout_room(&self, breakout_room_id: &str) -> ClientMessage {
        ClientMessage::JoinBreakoutRoom {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
            breakout_room_id: breakout_room_id.to_string(),
        }
    }

    #[must_use]
    pub fn leave_breakout_room(&self, breakout_room_id: &str) -> ClientMessage {
        ClientMessage::LeaveBreakoutRoom {
            room_id: self.room_id.clone(),
            peer_id: self.peer_id.clone(),
            breakout_room_id: breakout_room_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn admin_frames_carry_room_peer_and_target() {
        let cmd = CommandBuilder::new("R1", "me");
        assert_eq!(
            serde_json::to_value(cmd.mute_peer("p2")).unwrap(),
            json!({"type": "mute_peer", "roomId": "R1", "peerId": "me", "targetPeerId": "p2"})
        );
        assert_eq!(
            serde_json::to_value(cmd.assign_breakout_room("p2", "B1")).unwrap(),
            json!({
                "type": "assign_breakout_room",
                "roomId": "R1",
                "peerId": "me",
                "targetPeerId": "p2",
                "breakoutRoomId": "B1"
            })
        );
    }

    #[test]
    fn screen_share_frame_names_action() {
        let cmd = CommandBuilder::new("R1", "me");
        let v = serde_json::to_value(cmd.screen_share(ScreenShareAction::Start)).unwrap();
        assert_eq!(v["type"], "screen_share");
        assert_eq!(v["action"], "start");
    }

    #[test]
    fn capabilities_request_only_names_room() {
        let cmd = CommandBuilder::new("R1", "me");
        assert_eq!(
            serde_json::to_value(cmd.get_router_rtp_capabilities()).unwrap(),
            json!({"type": "get_router_rtp_capabilities", "roomId": "R1"})
        );
    }
}
