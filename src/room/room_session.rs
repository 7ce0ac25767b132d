use std::sync::Arc;

use serde_json::Value;

use crate::{
    log::log_sink::LogSink,
    protocol::{
        ClientMessage, ServerMessage,
        types::{
            MediaKind, PeerId, PeerInfo, PeerRole, ProducerId, RoomId, RoomInfo, TransportDirection,
            TransportOptions,
        },
    },
    room::{
        commands::CommandBuilder,
        room_event::RoomEvent,
        session_state::{ConnectionPhase, LocalSessionState, RemoteStream},
    },
    sink_debug, sink_info, sink_warn,
    transport::{ConsumerParams, RemoteStreamEntry},
};

/// Who we are in the room being joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    pub peer_id: PeerId,
    pub user_id: String,
    pub display_name: String,
    pub role: PeerRole,
    pub audio_enabled: bool,
    pub video_enabled: bool,
}

/// Follow-up work a transition asks of the caller, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send(ClientMessage),
    /// Local tracks may be produced now.
    StartProducing,
    RouterCapabilities(Value),
    TransportCreated {
        direction: TransportDirection,
        options: TransportOptions,
    },
    TransportConnected(TransportDirection),
    ProducerCreated {
        producer_id: ProducerId,
        kind: MediaKind,
        app_data: Option<Value>,
    },
    ConsumerCreated {
        params: ConsumerParams,
        producer_paused: bool,
    },
    Consume {
        producer_id: ProducerId,
        peer_id: PeerId,
    },
    /// Drop every consumer (pending or live) of a departed peer.
    ReleasePeer(PeerId),
    /// The server ended our screen share: stop the capture and its producer.
    ReleaseScreenCapture,
    ServerError(String),
    Emit(RoomEvent),
}

/// Applies inbound frames to the observable session state.
///
/// Nothing here touches the network or the media stack: each transition
/// mutates [`LocalSessionState`] and returns the [`Effect`]s for the caller.
pub struct RoomSession {
    state: LocalSessionState,
    room_id: RoomId,
    identity: Option<LocalIdentity>,
    logger: Arc<dyn LogSink>,
}

impl RoomSession {
    pub fn new(logger: Arc<dyn LogSink>) -> Self {
        Self {
            state: LocalSessionState::default(),
            room_id: RoomId::new(),
            identity: None,
            logger,
        }
    }

    #[must_use]
    pub fn state(&self) -> &LocalSessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut LocalSessionState {
        &mut self.state
    }

    #[must_use]
    pub fn identity(&self) -> Option<&LocalIdentity> {
        self.identity.as_ref()
    }

    /// Phase `Connecting`, error cleared.
    pub fn begin_join(&mut self, room_id: impl Into<RoomId>, identity: LocalIdentity) {
        self.room_id = room_id.into();
        self.identity = Some(identity);
        self.state.phase = ConnectionPhase::Connecting;
        self.state.error = None;
    }

    /// Phase `Disconnected` with `error` recorded.
    pub fn fail(&mut self, error: String) {
        self.state.phase = ConnectionPhase::Disconnected;
        self.state.error = Some(error);
    }

    /// Frame builder for the current membership, `None` before any join.
    #[must_use]
    pub fn commands(&self) -> Option<CommandBuilder> {
        self.identity
            .as_ref()
            .map(|id| CommandBuilder::new(self.room_id.clone(), id.peer_id.clone()))
    }

    /// Clears roster, room, streams and presenter state. The identity is
    /// kept so a later rejoin reuses it.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn add_remote_stream(&mut self, entry: RemoteStreamEntry) -> RoomEvent {
        let event = RoomEvent::RemoteStreamAdded {
            producer_id: entry.producer_id.clone(),
            peer_id: entry.peer_id.clone(),
        };
        self.state.remote_streams.insert(
            entry.producer_id,
            RemoteStream {
                peer_id: entry.peer_id,
                consumer_id: entry.consumer_id,
                stream: entry.stream,
            },
        );
        event
    }

    /// Applies one inbound frame.
    pub fn apply(&mut self, msg: ServerMessage) -> Vec<Effect> {
        use ServerMessage as M;
        sink_debug!(self.logger, "[Room] apply {}", msg.type_name());

        match msg {
            M::RoomJoined {
                room_info,
                peers,
                peer_id,
            } => self.on_room_joined(room_info, peers, peer_id),
            M::RoomUpdated { room_info } => {
                self.state.room = Some(room_info);
                vec![Effect::Emit(RoomEvent::RoomUpdated)]
            }
            M::PeerJoined { peer } => self.on_peer_joined(peer),
            M::PeerLeft { peer_id } => self.on_peer_left(peer_id),
            M::PeerUpdated {
                peer_id,
                audio_enabled,
                video_enabled,
                connection_quality,
            } => {
                let Some(peer) = self.state.peer_mut(&peer_id) else {
                    return Vec::new();
                };
                if let Some(v) = audio_enabled {
                    peer.audio_enabled = v;
                }
                if let Some(v) = video_enabled {
                    peer.video_enabled = v;
                }
                if let Some(q) = connection_quality {
                    peer.connection_quality = q;
                }
                vec![Effect::Emit(RoomEvent::PeerUpdated(peer_id))]
            }

            M::RouterRtpCapabilities { rtp_capabilities } => {
                vec![Effect::RouterCapabilities(rtp_capabilities)]
            }
            M::WebrtcTransportCreated {
                direction,
                transport_options,
            } => vec![Effect::TransportCreated {
                direction,
                options: transport_options,
            }],
            M::WebrtcTransportConnected { direction } => {
                vec![Effect::TransportConnected(direction)]
            }
            M::ProducerCreated {
                producer_id,
                kind,
                app_data,
            } => vec![Effect::ProducerCreated {
                producer_id,
                kind,
                app_data,
            }],
            M::ConsumerCreated {
                consumer_id,
                producer_id,
                kind,
                rtp_parameters,
                producer_paused,
                peer_id: _,
            } => vec![Effect::ConsumerCreated {
                params: ConsumerParams {
                    consumer_id,
                    producer_id,
                    kind,
                    rtp_parameters,
                },
                producer_paused,
            }],
            M::NewProducer {
                producer_id,
                peer_id,
                ..
            } => {
                if self.state.is_self(&peer_id) {
                    return Vec::new();
                }
                vec![Effect::Consume {
                    producer_id,
                    peer_id,
                }]
            }

            M::PresenterQueued { position, peer_id } => {
                if peer_id.as_deref().is_some_and(|p| !self.state.is_self(p)) {
                    return Vec::new();
                }
                self.state.presenter.enter_queue(position);
                vec![Effect::Emit(RoomEvent::PresenterQueued { position })]
            }
            M::PresenterAdded { peer_id } => self.on_presenter_changed(peer_id, true),
            M::PresenterRemoved { peer_id } => self.on_presenter_changed(peer_id, false),
            M::ScreenShareStarted { peer_id } => self.on_screen_share_changed(&peer_id, true),
            M::ScreenShareStopped { peer_id } => self.on_screen_share_changed(&peer_id, false),

            M::RoomMutedAll { muted_all } => {
                self.patch_room(|r| r.muted_all = muted_all.unwrap_or(true))
            }
            M::RoomUnmutedAll { muted_all } => {
                self.patch_room(|r| r.muted_all = muted_all.unwrap_or(false))
            }
            M::RoomLocked { is_locked } => self.patch_room(|r| r.is_locked = is_locked.unwrap_or(true)),
            M::RoomUnlocked { is_locked } => {
                self.patch_room(|r| r.is_locked = is_locked.unwrap_or(false))
            }
            M::RecordingStarted { is_recording } => {
                self.patch_room(|r| r.is_recording = is_recording.unwrap_or(true))
            }
            M::RecordingStopped { is_recording } => {
                self.patch_room(|r| r.is_recording = is_recording.unwrap_or(false))
            }

            M::Error { message, code } => {
                sink_warn!(
                    self.logger,
                    "[Room] server error {}: {}",
                    code.as_deref().unwrap_or("-"),
                    message
                );
                vec![Effect::ServerError(message)]
            }
            M::Unrecognized => {
                sink_debug!(self.logger, "[Room] ignoring unrecognized frame");
                Vec::new()
            }
        }
    }

    fn on_room_joined(
        &mut self,
        room_info: RoomInfo,
        peers: Vec<PeerInfo>,
        assigned_peer_id: Option<PeerId>,
    ) -> Vec<Effect> {
        let Some(identity) = self.identity.as_mut() else {
            sink_warn!(self.logger, "[Room] room_joined without a pending join");
            return Vec::new();
        };
        if let Some(id) = assigned_peer_id {
            identity.peer_id = id;
        }
        let local = PeerInfo {
            id: identity.peer_id.clone(),
            user_id: identity.user_id.clone(),
            display_name: identity.display_name.clone(),
            role: identity.role,
            audio_enabled: identity.audio_enabled,
            video_enabled: identity.video_enabled,
            ..PeerInfo::default()
        };

        // Build the roster aside, then swap it in.
        let mut roster = LocalSessionState::default();
        for peer in peers.into_iter().filter(|p| p.id != local.id) {
            roster.upsert_peer(peer);
        }

        sink_info!(
            self.logger,
            "[Room] joined {} as {} with {} other peer(s)",
            room_info.room_id,
            local.id,
            roster.peers.len()
        );
        let peer_id = local.id.clone();
        self.state.room = Some(room_info);
        self.state.peers = roster.peers;
        self.state.local_peer = Some(local);
        self.state.phase = ConnectionPhase::Connected;

        let mut effects = vec![
            Effect::Emit(RoomEvent::PhaseChanged(ConnectionPhase::Connected)),
            Effect::Emit(RoomEvent::Joined { peer_id }),
        ];
        if let Some(cmd) = self.commands() {
            effects.push(Effect::Send(cmd.get_router_rtp_capabilities()));
        }
        effects.push(Effect::StartProducing);
        effects
    }

    fn on_peer_joined(&mut self, peer: PeerInfo) -> Vec<Effect> {
        if self.state.is_self(&peer.id) {
            return Vec::new();
        }
        let id = peer.id.clone();
        self.state.upsert_peer(peer);
        vec![Effect::Emit(RoomEvent::PeerJoined(id))]
    }

    fn on_peer_left(&mut self, peer_id: PeerId) -> Vec<Effect> {
        let removed = self.state.remove_peer(&peer_id).is_some();
        let streams = self.state.remove_streams_of(&peer_id);

        let mut effects = vec![Effect::ReleasePeer(peer_id.clone())];
        effects.extend(
            streams
                .into_iter()
                .map(|producer_id| Effect::Emit(RoomEvent::RemoteStreamRemoved { producer_id })),
        );
        if removed {
            effects.push(Effect::Emit(RoomEvent::PeerLeft(peer_id)));
        }
        effects
    }

    /// `room.presenter_count` is the server's to maintain; it is not touched.
    fn on_presenter_changed(&mut self, peer_id: PeerId, presenting: bool) -> Vec<Effect> {
        if self.state.is_self(&peer_id) {
            if presenting {
                self.state.presenter.start_presenting();
            } else {
                self.state.presenter.is_presenting = false;
            }
            if let Some(local) = self.state.local_peer.as_mut() {
                local.is_presenting = presenting;
            }
        }
        if let Some(peer) = self.state.peer_mut(&peer_id) {
            peer.is_presenting = presenting;
        }
        let event = if presenting {
            RoomEvent::PresenterAdded(peer_id)
        } else {
            RoomEvent::PresenterRemoved(peer_id)
        };
        vec![Effect::Emit(event)]
    }

    fn on_screen_share_changed(&mut self, peer_id: &str, active: bool) -> Vec<Effect> {
        if !self.state.is_self(peer_id) {
            return Vec::new();
        }
        self.state.is_screen_sharing = active;
        if let Some(local) = self.state.local_peer.as_mut() {
            local.is_screen_sharing = active;
        }
        let mut effects = vec![Effect::Emit(RoomEvent::ScreenShareChanged { active })];
        if !active {
            effects.push(Effect::ReleaseScreenCapture);
        }
        effects
    }

    fn patch_room(&mut self, patch: impl FnOnce(&mut RoomInfo)) -> Vec<Effect> {
        match self.state.room.as_mut() {
            Some(room) => {
                patch(room);
                vec![Effect::Emit(RoomEvent::RoomUpdated)]
            }
            None => Vec::new(),
        }
    }
}
