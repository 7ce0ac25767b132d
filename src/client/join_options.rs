use crate::{
    client::room_client_config::RoomClientConfig,
    protocol::types::{PeerRole, RoomId},
};

/// What `RoomClient` joins with. Kept for the lifetime of the client so
/// reconnects rejoin with the same identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOptions {
    pub room_id: RoomId,
    pub user_id: String,
    pub display_name: String,
    pub role: PeerRole,
    pub audio: bool,
    pub video: bool,
    pub auto_join: bool,
    /// Signaling token; falls back to the configured one, then to `user_id`.
    pub token: Option<String>,
}

impl JoinOptions {
    pub fn new(
        room_id: impl Into<RoomId>,
        user_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            user_id: user_id.into(),
            display_name: display_name.into(),
            role: PeerRole::Attendee,
            audio: true,
            video: true,
            auto_join: false,
            token: None,
        }
    }

    /// Media defaults taken from `[Media] audio` / `video`.
    pub fn from_config(
        room_id: impl Into<RoomId>,
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        config: &RoomClientConfig,
    ) -> Self {
        Self {
            audio: config.audio,
            video: config.video,
            ..Self::new(room_id, user_id, display_name)
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: PeerRole) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn with_media(mut self, audio: bool, video: bool) -> Self {
        self.audio = audio;
        self.video = video;
        self
    }

    #[must_use]
    pub fn with_auto_join(mut self, auto_join: bool) -> Self {
        self.auto_join = auto_join;
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
