use std::{collections::HashMap, fmt};

use crate::{
    media_devices::MediaStream,
    protocol::types::{ConsumerId, PeerId, PeerInfo, ProducerId, RoomInfo},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
        }
    }
}

/// A consumed remote track and who sends it.
#[derive(Debug, Clone)]
pub struct RemoteStream {
    pub peer_id: PeerId,
    pub consumer_id: ConsumerId,
    pub stream: MediaStream,
}

/// Server-confirmed presenter status of the local peer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenterState {
    pub is_presenting: bool,
    pub is_in_presenter_queue: bool,
    /// 1-based; 0 when not queued.
    pub presenter_queue_position: u32,
}

impl PresenterState {
    pub fn enter_queue(&mut self, position: u32) {
        self.is_in_presenter_queue = true;
        self.presenter_queue_position = position;
    }

    pub fn start_presenting(&mut self) {
        self.is_presenting = true;
        self.is_in_presenter_queue = false;
        self.presenter_queue_position = 0;
    }
}

/// Everything the UI observes about the current membership.
///
/// The roster holds the other participants only; the local participant is
/// `local_peer`.
#[derive(Debug, Clone, Default)]
pub struct LocalSessionState {
    pub phase: ConnectionPhase,
    /// Last failure, cleared when a join starts.
    pub error: Option<String>,
    pub local_peer: Option<PeerInfo>,
    pub room: Option<RoomInfo>,
    pub peers: Vec<PeerInfo>,
    pub remote_streams: HashMap<ProducerId, RemoteStream>,
    pub presenter: PresenterState,
    /// Set optimistically as soon as local capture starts, before the
    /// server echoes `screen_share_started`.
    pub is_screen_sharing: bool,
    pub screen_stream: Option<MediaStream>,
}

impl LocalSessionState {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.phase == ConnectionPhase::Connected
    }

    #[must_use]
    pub fn can_request_presenter(&self) -> bool {
        let seats_left = self
            .room
            .as_ref()
            .is_some_and(|r| r.presenter_count < r.features.max_presenters);
        self.is_connected()
            && !self.presenter.is_presenting
            && !self.presenter.is_in_presenter_queue
            && seats_left
    }

    #[must_use]
    pub fn can_screen_share(&self) -> bool {
        self.is_connected()
            && self
                .room
                .as_ref()
                .is_some_and(|r| r.features.allow_screen_share)
    }

    #[must_use]
    pub fn local_peer_id(&self) -> Option<&str> {
        self.local_peer.as_ref().map(|p| p.id.as_str())
    }

    #[must_use]
    pub fn is_self(&self, peer_id: &str) -> bool {
        self.local_peer_id() == Some(peer_id)
    }

    #[must_use]
    pub fn peer(&self, peer_id: &str) -> Option<&PeerInfo> {
        self.peers.iter().find(|p| p.id == peer_id)
    }

    pub fn peer_mut(&mut self, peer_id: &str) -> Option<&mut PeerInfo> {
        self.peers.iter_mut().find(|p| p.id == peer_id)
    }

    /// Inserts or replaces by id; the roster never holds two entries with
    /// the same id.
    pub fn upsert_peer(&mut self, peer: PeerInfo) {
        match self.peer_mut(&peer.id) {
            Some(existing) => *existing = peer,
            None => self.peers.push(peer),
        }
    }

    pub fn remove_peer(&mut self, peer_id: &str) -> Option<PeerInfo> {
        let idx = self.peers.iter().position(|p| p.id == peer_id)?;
        Some(self.peers.remove(idx))
    }

    /// Removes and returns the producer ids of every stream `peer_id` owns.
    pub fn remove_streams_of(&mut self, peer_id: &str) -> Vec<ProducerId> {
        let owned: Vec<ProducerId> = self
            .remote_streams
            .iter()
            .filter(|(_, s)| s.peer_id == peer_id)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &owned {
            self.remote_streams.remove(id);
        }
        owned
    }

    /// Back to a fresh, disconnected state. The last error is kept.
    pub fn reset(&mut self) {
        let error = self.error.take();
        *self = Self {
            error,
            ..Self::default()
        };
    }
}
