use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ---- Basic types ----------------------------------------------------------

pub type PeerId = String;
pub type RoomId = String;
pub type ProducerId = String;
pub type ConsumerId = String;
pub type TransportId = String;

/// Role a participant holds in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerRole {
    Presenter,
    Moderator,
    #[default]
    Attendee,
    Admin,
}

impl PeerRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Presenter => "presenter",
            Self::Moderator => "moderator",
            Self::Attendee => "attendee",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for PeerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionQuality {
    Excellent,
    #[default]
    Good,
    Poor,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    #[default]
    Main,
    Breakout,
}

/// Direction of a media transport, as seen from this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportDirection {
    Send,
    Recv,
}

impl TransportDirection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Recv => "recv",
        }
    }
}

impl fmt::Display for TransportDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire media kind. Screen capture travels as `video` tagged through `appData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => f.write_str("audio"),
            Self::Video => f.write_str("video"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenShareAction {
    Start,
    Stop,
}

// ---- Records --------------------------------------------------------------

/// Room capabilities, fixed for the lifetime of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomFeatures {
    pub max_presenters: u32,
    pub max_participants: u32,
    pub allow_screen_share: bool,
    pub enable_chat: bool,
    pub enable_recording: bool,
}

impl Default for RoomFeatures {
    fn default() -> Self {
        Self {
            max_presenters: 1,
            max_participants: 100,
            allow_screen_share: true,
            enable_chat: true,
            enable_recording: false,
        }
    }
}

/// Shared metadata of the joined room (`room_info` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub event_id: String,
    pub room_type: RoomType,
    pub name: String,
    pub peer_count: u32,
    pub presenter_count: u32,
    pub presenter_queue_length: u32,
    pub is_recording: bool,
    pub is_locked: bool,
    pub muted_all: bool,
    pub features: RoomFeatures,
}

/// One participant as announced by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeerInfo {
    pub id: PeerId,
    pub user_id: String,
    pub display_name: String,
    pub role: PeerRole,
    pub is_presenting: bool,
    pub is_screen_sharing: bool,
    pub audio_enabled: bool,
    pub video_enabled: bool,
    pub connection_quality: ConnectionQuality,
}

impl Default for PeerInfo {
    fn default() -> Self {
        Self {
            id: String::new(),
            user_id: String::new(),
            display_name: String::new(),
            role: PeerRole::Attendee,
            is_presenting: false,
            is_screen_sharing: false,
            audio_enabled: true,
            video_enabled: true,
            connection_quality: ConnectionQuality::Good,
        }
    }
}

/// Server-side parameters of a freshly created WebRTC transport.
///
/// ICE/DTLS/SCTP blobs are opaque to this crate and handed to the media
/// library untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOptions {
    pub id: TransportId,
    pub ice_parameters: Value,
    pub ice_candidates: Value,
    pub dtls_parameters: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sctp_parameters: Option<Value>,
}
