use std::{
    collections::HashMap,
    sync::{
        Arc,
        mpsc::{Receiver, TryRecvError},
    },
    time::Instant,
};

use rand::{RngCore, rngs::OsRng};

use crate::{
    client::{client_error::ClientError, join_options::JoinOptions, room_client_config::RoomClientConfig},
    log::log_sink::LogSink,
    media_devices::{DeviceInfo, DeviceNegotiator, DeviceSelection, MediaBackend, MediaStream},
    protocol::{
        ClientMessage,
        types::{PeerId, PeerInfo, ProducerId, RoomInfo, ScreenShareAction},
    },
    reconnect::ReconnectSupervisor,
    room::{
        CommandBuilder, ConnectionPhase, Effect, LocalIdentity, LocalSessionState, RemoteStream,
        RoomEvent, RoomSession,
    },
    signaling_client::{
        SignalingChannel, SignalingClientError, SignalingConnector, SignalingEvent, build_endpoint,
        close_code::{self, ABNORMAL_CLOSURE, NORMAL_CLOSURE},
    },
    sink_debug, sink_info, sink_warn,
    transport::{NegotiationDevice, NegotiationError, ProducerSlot, SessionStats, TransportNegotiator},
};

/// Single entry point for one room membership.
///
/// Owns the capture devices, the negotiation device and its transports,
/// the signaling connection and the observable session state. Everything
/// happens on the owner's thread: call [`Self::poll`] regularly to apply
/// inbound frames, fire the reconnect timer and notice ended tracks.
///
/// Expected failures never come back as `Err`; they land in
/// [`LocalSessionState::error`] and as [`RoomEvent::Error`].
pub struct RoomClient {
    options: JoinOptions,
    config: RoomClientConfig,
    local_peer_id: PeerId,

    devices: DeviceNegotiator,
    negotiator: TransportNegotiator,
    session: RoomSession,
    reconnect: ReconnectSupervisor,

    connector: Box<dyn SignalingConnector>,
    channel: Option<Box<dyn SignalingChannel>>,
    events: Option<Receiver<SignalingEvent>>,

    pending_events: Vec<RoomEvent>,
    logger: Arc<dyn LogSink>,
}

impl RoomClient {
    /// Lists devices once and, with `auto_join`, joins immediately.
    pub fn new(
        options: JoinOptions,
        config: RoomClientConfig,
        backend: Box<dyn MediaBackend>,
        device: Box<dyn NegotiationDevice>,
        connector: Box<dyn SignalingConnector>,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        let local_peer_id = format!("peer-{:016x}", OsRng.next_u64());
        let mut client = Self {
            reconnect: ReconnectSupervisor::new(config.reconnect_delay),
            options,
            config,
            local_peer_id,
            devices: DeviceNegotiator::new(backend, logger.clone()),
            negotiator: TransportNegotiator::new(device, logger.clone()),
            session: RoomSession::new(logger.clone()),
            connector,
            channel: None,
            events: None,
            pending_events: Vec::new(),
            logger,
        };

        if let Err(e) = client.devices.enumerate_devices() {
            sink_warn!(client.logger, "[RoomClient] {}", e);
        }
        if client.options.auto_join {
            client.join_room();
        }
        client
    }

    // ---- Connection lifecycle -----------------------------------------------

    /// Acquires local media, opens signaling and sends `join_room`.
    /// No-op while connecting or connected. Never retries on its own.
    ///
    /// Whatever a lost connection left behind (transports, producers,
    /// roster, a scheduled reconnect) is released first.
    pub fn join_room(&mut self) {
        if self.session.state().phase != ConnectionPhase::Disconnected {
            sink_debug!(self.logger, "[RoomClient] join ignored: already {}", self.session.state().phase);
            return;
        }
        self.reconnect.cancel();
        self.close_channel(NORMAL_CLOSURE);
        self.release_membership();

        let identity = LocalIdentity {
            peer_id: self.local_peer_id.clone(),
            user_id: self.options.user_id.clone(),
            display_name: self.options.display_name.clone(),
            role: self.options.role,
            audio_enabled: self.options.audio,
            video_enabled: self.options.video,
        };
        sink_info!(
            self.logger,
            "[RoomClient] joining {} as {} ({})",
            self.options.room_id,
            identity.peer_id,
            identity.role
        );
        self.session.begin_join(self.options.room_id.clone(), identity);
        self.emit(RoomEvent::PhaseChanged(ConnectionPhase::Connecting));

        if let Err(e) = self.try_join() {
            self.abort_join(e);
        }
    }

    fn try_join(&mut self) -> Result<(), ClientError> {
        self.devices
            .initialize_local_stream(self.options.audio, self.options.video)?;

        let token = self
            .options
            .token
            .as_deref()
            .or(self.config.token.as_deref())
            .unwrap_or(&self.options.user_id);
        let endpoint = build_endpoint(
            &self.config.signaling_url,
            &self.options.room_id,
            token,
            self.options.role,
        )?;

        let link = self.connector.open(&endpoint)?;
        self.channel = Some(link.channel);
        self.events = Some(link.events);

        let cmd = self.commands()?;
        self.send(cmd.join_room(&self.options.user_id, &self.options.display_name, self.options.role))
    }

    /// Releases whatever the failed attempt acquired and records `error`.
    fn abort_join(&mut self, error: ClientError) {
        sink_warn!(self.logger, "[RoomClient] join failed: {}", error);
        self.close_channel(NORMAL_CLOSURE);
        self.release_membership();
        self.session.fail(error.to_string());
        self.emit(RoomEvent::Error(error.to_string()));
        self.emit(RoomEvent::PhaseChanged(ConnectionPhase::Disconnected));
    }

    /// Best-effort `leave_room`, closes signaling with 1000, releases every
    /// transport, producer, consumer and local track, and resets the session.
    /// Disarms any pending reconnect. Idempotent.
    pub fn leave_room(&mut self) {
        self.reconnect.cancel();
        let was_active = self.session.state().phase != ConnectionPhase::Disconnected;

        if self.channel.is_some() {
            if let Ok(cmd) = self.commands() {
                if let Err(e) = self.send(cmd.leave_room()) {
                    sink_debug!(self.logger, "[RoomClient] leave_room not delivered: {}", e);
                }
            }
            self.close_channel(NORMAL_CLOSURE);
        }
        self.release_membership();

        if was_active {
            sink_info!(self.logger, "[RoomClient] left {}", self.options.room_id);
            self.emit(RoomEvent::PhaseChanged(ConnectionPhase::Disconnected));
            self.emit(RoomEvent::Left);
        }
    }

    /// Full leave + join cycle right now; cancels a scheduled reconnect.
    pub fn reconnect(&mut self) {
        self.reconnect.cancel();
        self.run_reconnect_cycle();
    }

    /// Same as [`Self::reconnect`], for an error screen's retry button.
    pub fn retry(&mut self) {
        self.reconnect();
    }

    fn run_reconnect_cycle(&mut self) {
        sink_info!(self.logger, "[RoomClient] reconnecting to {}", self.options.room_id);
        self.emit(RoomEvent::Reconnecting);
        self.leave_room();
        self.join_room();
    }

    fn close_channel(&mut self, code: u16) {
        if let Some(mut channel) = self.channel.take() {
            channel.close(code);
        }
        self.events = None;
    }

    fn release_membership(&mut self) {
        self.negotiator.close_all();
        self.devices.stop_local_stream();
        if let Some(screen) = self.session.state_mut().screen_stream.take() {
            screen.stop_all();
        }
        self.session.reset();
    }

    // ---- Event loop -----------------------------------------------------------

    /// Applies queued signaling events, fires the reconnect timer, sweeps
    /// ended tracks. Returns what changed since the last call, in order.
    pub fn poll(&mut self) -> Vec<RoomEvent> {
        self.poll_at(Instant::now())
    }

    /// [`Self::poll`] with an explicit clock.
    pub fn poll_at(&mut self, now: Instant) -> Vec<RoomEvent> {
        while let Some(event) = self.next_signaling_event() {
            match event {
                SignalingEvent::Message(msg) => {
                    let effects = self.session.apply(msg);
                    self.run_effects(effects);
                }
                SignalingEvent::Unrecognized(kind) => {
                    sink_debug!(self.logger, "[RoomClient] ignoring frame type '{}'", kind);
                }
                SignalingEvent::Closed { code, reason } => {
                    self.on_channel_closed(code, reason, now);
                }
            }
        }

        if self.reconnect.poll(now) {
            self.run_reconnect_cycle();
        }

        self.sweep_ended_tracks();
        std::mem::take(&mut self.pending_events)
    }

    fn next_signaling_event(&mut self) -> Option<SignalingEvent> {
        let rx = self.events.as_ref()?;
        match rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(SignalingEvent::Closed {
                code: ABNORMAL_CLOSURE,
                reason: "signaling thread exited".into(),
            }),
        }
    }

    fn on_channel_closed(&mut self, code: u16, reason: String, now: Instant) {
        self.close_channel(code);

        if close_code::is_normal(code) {
            sink_info!(self.logger, "[RoomClient] signaling closed normally");
            let was_active = self.session.state().phase != ConnectionPhase::Disconnected;
            self.release_membership();
            if was_active {
                self.emit(RoomEvent::PhaseChanged(ConnectionPhase::Disconnected));
                self.emit(RoomEvent::Left);
            }
            return;
        }

        sink_warn!(self.logger, "[RoomClient] signaling lost (code {}) {}", code, reason);
        self.record_error(ClientError::SignalingTransport(SignalingClientError::Closed {
            code,
            reason,
        }));
        self.session.state_mut().phase = ConnectionPhase::Disconnected;
        self.emit(RoomEvent::PhaseChanged(ConnectionPhase::Disconnected));

        if self.reconnect.on_channel_closed(code, now) {
            self.emit(RoomEvent::ReconnectScheduled {
                delay: self.reconnect.delay(),
            });
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Send(msg) => {
                    if let Err(e) = self.send(msg) {
                        self.record_error(e);
                    }
                }
                Effect::StartProducing => {
                    if let Some(stream) = self.devices.local_stream().cloned() {
                        let res = self.negotiator.start_producing(&stream, self.config.simulcast);
                        self.report_negotiation(res);
                    }
                }
                Effect::RouterCapabilities(caps) => {
                    if let Err(e) = self.negotiator.on_router_capabilities(&caps) {
                        self.leave_room();
                        self.record_error(ClientError::MediaCapability(e));
                        return;
                    }
                }
                Effect::TransportCreated { direction, options } => {
                    let res = self.negotiator.on_transport_created(direction, &options);
                    self.report_negotiation(res);
                }
                Effect::TransportConnected(direction) => {
                    self.negotiator.on_transport_connected(direction);
                }
                Effect::ProducerCreated {
                    producer_id,
                    kind,
                    app_data,
                } => {
                    let res = self
                        .negotiator
                        .on_producer_created(producer_id, kind, app_data.as_ref())
                        .map(|_| ());
                    self.report_negotiation(res);
                }
                Effect::ConsumerCreated {
                    params,
                    producer_paused,
                } => match self.negotiator.on_consumer_created(params, producer_paused) {
                    Ok(Some(entry)) => {
                        let event = self.session.add_remote_stream(entry);
                        self.emit(event);
                    }
                    Ok(None) => {}
                    Err(e) => self.record_error(ClientError::Negotiation(e)),
                },
                Effect::Consume {
                    producer_id,
                    peer_id,
                } => {
                    let res = self.negotiator.consume(producer_id, peer_id);
                    self.report_negotiation(res);
                }
                Effect::ReleasePeer(peer_id) => self.negotiator.release_peer(&peer_id),
                Effect::ReleaseScreenCapture => self.release_screen_capture(),
                Effect::ServerError(message) => {
                    self.record_error(ClientError::ServerReported(message));
                }
                Effect::Emit(event) => self.emit(event),
            }
            self.flush_outbox();
        }
    }

    /// Local tracks that ended stop their producers; a screen track ended
    /// from the platform stops the share; ended remote tracks drop their
    /// stream and consumer.
    fn sweep_ended_tracks(&mut self) {
        let screen_ended = self
            .session
            .state()
            .screen_stream
            .as_ref()
            .is_some_and(|s| s.video_track().is_some_and(|t| !t.is_live()));
        if screen_ended {
            sink_info!(self.logger, "[RoomClient] screen capture ended by the platform");
            self.stop_screen_share();
        }

        for slot in [ProducerSlot::Audio, ProducerSlot::Video] {
            if self
                .negotiator
                .producer(slot)
                .is_some_and(|p| !p.track.is_live())
            {
                self.negotiator.close_producer(slot);
            }
        }

        let ended: Vec<ProducerId> = self
            .session
            .state()
            .remote_streams
            .iter()
            .filter(|(_, r)| r.stream.all_ended())
            .map(|(id, _)| id.clone())
            .collect();
        for producer_id in ended {
            if let Some(remote) = self.session.state_mut().remote_streams.remove(&producer_id) {
                self.negotiator.close_consumer(&remote.consumer_id);
                self.emit(RoomEvent::RemoteStreamRemoved { producer_id });
            }
        }
    }

    // ---- Local media ----------------------------------------------------------

    /// Mutes/unmutes the microphone in place. No-op without a local audio track.
    ///
    /// Only the track's enabled flag flips; the audio producer stays open
    /// and keeps its server-side id, so the track sends silence while muted.
    pub fn toggle_audio(&mut self) {
        let Some(track) = self.devices.local_stream().and_then(MediaStream::audio_track).cloned() else {
            return;
        };
        let enabled = !track.is_enabled();
        track.set_enabled(enabled);
        if let Some(local) = self.session.state_mut().local_peer.as_mut() {
            local.audio_enabled = enabled;
        }
    }

    /// Camera counterpart of [`Self::toggle_audio`]. Turning the camera off
    /// keeps the video producer open and sends black frames; the capture is
    /// not released.
    pub fn toggle_video(&mut self) {
        let Some(track) = self.devices.local_stream().and_then(MediaStream::video_track).cloned() else {
            return;
        };
        let enabled = !track.is_enabled();
        track.set_enabled(enabled);
        if let Some(local) = self.session.state_mut().local_peer.as_mut() {
            local.video_enabled = enabled;
        }
    }

    /// Takes effect on the next acquisition.
    pub fn change_video_device(&mut self, device_id: impl Into<String>) {
        self.devices.select_video_input(device_id);
    }

    /// Takes effect on the next acquisition.
    pub fn change_audio_device(&mut self, device_id: impl Into<String>) {
        self.devices.select_audio_input(device_id);
    }

    pub fn set_audio_output(&mut self, device_id: impl Into<String>) {
        self.devices.select_audio_output(device_id);
    }

    // ---- Presenter & screen share -------------------------------------------------

    /// Asks for a presenter seat. State changes only on the server's reply.
    pub fn request_presenter(&mut self) {
        if !self.session.state().can_request_presenter() {
            sink_debug!(self.logger, "[RoomClient] presenter request not allowed now");
            return;
        }
        self.dispatch(CommandBuilder::request_presenter_role);
    }

    pub fn stop_presenting(&mut self) {
        if !self.session.state().presenter.is_presenting {
            return;
        }
        self.dispatch(CommandBuilder::stop_presenting);
    }

    /// Captures the display and shares it. The sharing flag flips before the
    /// server confirms.
    pub fn start_screen_share(&mut self) {
        let state = self.session.state();
        if !state.can_screen_share() || state.is_screen_sharing {
            return;
        }
        self.release_screen_capture();
        let stream = match self.devices.get_display_media() {
            Ok(stream) => stream,
            Err(e) => {
                self.record_error(ClientError::MediaAccess(e));
                return;
            }
        };
        let video = stream.video_track().cloned();
        self.set_screen_sharing(true);
        self.session.state_mut().screen_stream = Some(stream);

        if let Some(track) = video.filter(|_| self.negotiator.has_send_transport()) {
            let res = self.negotiator.produce_screen(track);
            self.report_negotiation(res);
            self.flush_outbox();
        }
        self.dispatch(|cmd| cmd.screen_share(ScreenShareAction::Start));
    }

    /// No-op unless sharing.
    pub fn stop_screen_share(&mut self) {
        if !self.session.state().is_screen_sharing {
            return;
        }
        self.release_screen_capture();
        self.set_screen_sharing(false);
        self.dispatch(|cmd| cmd.screen_share(ScreenShareAction::Stop));
    }

    /// Stops the display capture and closes its producer. Leaves the
    /// sharing flag alone.
    fn release_screen_capture(&mut self) {
        if let Some(screen) = self.session.state_mut().screen_stream.take() {
            screen.stop_all();
        }
        self.negotiator.close_producer(ProducerSlot::Screen);
    }

    fn set_screen_sharing(&mut self, active: bool) {
        let state = self.session.state_mut();
        state.is_screen_sharing = active;
        if let Some(local) = state.local_peer.as_mut() {
            local.is_screen_sharing = active;
        }
        self.emit(RoomEvent::ScreenShareChanged { active });
    }

    // ---- Room administration ---------------------------------------------------
    // Authorization is the server's job; these only dispatch.

    pub fn mute_all(&mut self) {
        self.dispatch(CommandBuilder::mute_all);
    }

    pub fn unmute_all(&mut self) {
        self.dispatch(CommandBuilder::unmute_all);
    }

    pub fn mute_peer(&mut self, peer_id: &str) {
        self.dispatch(|cmd| cmd.mute_peer(peer_id));
    }

    pub fn unmute_peer(&mut self, peer_id: &str) {
        self.dispatch(|cmd| cmd.unmute_peer(peer_id));
    }

    pub fn lock_room(&mut self) {
        self.dispatch(CommandBuilder::lock_room);
    }

    pub fn unlock_room(&mut self) {
        self.dispatch(CommandBuilder::unlock_room);
    }

    pub fn start_recording(&mut self) {
        self.dispatch(CommandBuilder::start_recording);
    }

    pub fn stop_recording(&mut self) {
        self.dispatch(CommandBuilder::stop_recording);
    }

    pub fn approve_presenter(&mut self, peer_id: &str) {
        self.dispatch(|cmd| cmd.approve_presenter(peer_id));
    }

    pub fn deny_presenter(&mut self, peer_id: &str) {
        self.dispatch(|cmd| cmd.deny_presenter(peer_id));
    }

    pub fn assign_breakout_room(&mut self, peer_id: &str, breakout_room_id: &str) {
        self.dispatch(|cmd| cmd.assign_breakout_room(peer_id, breakout_room_id));
    }

    pub fn join_breakout_room(&mut self, breakout_room_id: &str) {
        self.dispatch(|cmd| cmd.join_breakout_room(breakout_room_id));
    }

    pub fn leave_breakout_room(&mut self, breakout_room_id: &str) {
        self.dispatch(|cmd| cmd.leave_breakout_room(breakout_room_id));
    }

    // ---- Accessors -------------------------------------------------------------

    #[must_use]
    pub fn get_stats(&self) -> SessionStats {
        self.negotiator.stats()
    }

    #[must_use]
    pub fn state(&self) -> &LocalSessionState {
        self.session.state()
    }

    #[must_use]
    pub fn phase(&self) -> ConnectionPhase {
        self.session.state().phase
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.session.state().error.as_deref()
    }

    #[must_use]
    pub fn local_peer(&self) -> Option<&PeerInfo> {
        self.session.state().local_peer.as_ref()
    }

    #[must_use]
    pub fn peers(&self) -> &[PeerInfo] {
        &self.session.state().peers
    }

    #[must_use]
    pub fn room(&self) -> Option<&RoomInfo> {
        self.session.state().room.as_ref()
    }

    #[must_use]
    pub fn remote_streams(&self) -> &HashMap<ProducerId, RemoteStream> {
        &self.session.state().remote_streams
    }

    #[must_use]
    pub fn devices(&self) -> &[DeviceInfo] {
        self.devices.devices()
    }

    #[must_use]
    pub fn device_selection(&self) -> &DeviceSelection {
        self.devices.selection()
    }

    #[must_use]
    pub fn local_stream(&self) -> Option<&MediaStream> {
        self.devices.local_stream()
    }

    #[must_use]
    pub fn screen_stream(&self) -> Option<&MediaStream> {
        self.session.state().screen_stream.as_ref()
    }

    #[must_use]
    pub fn is_reconnect_scheduled(&self) -> bool {
        self.reconnect.is_armed()
    }

    // ---- helpers ---------------------------------------------------------------

    fn commands(&self) -> Result<CommandBuilder, ClientError> {
        self.session
            .commands()
            .ok_or(ClientError::SignalingTransport(SignalingClientError::Disconnected))
    }

    fn send(&mut self, msg: ClientMessage) -> Result<(), ClientError> {
        let channel = self
            .channel
            .as_mut()
            .ok_or(SignalingClientError::Disconnected)?;
        channel.send(&msg)?;
        Ok(())
    }

    /// Fire-and-forget frame for the current membership.
    fn dispatch(&mut self, build: impl FnOnce(&CommandBuilder) -> ClientMessage) {
        let res = self.commands().and_then(|cmd| self.send(build(&cmd)));
        if let Err(e) = res {
            self.record_error(e);
        }
    }

    fn flush_outbox(&mut self) {
        for msg in self.negotiator.drain_outbox() {
            if let Err(e) = self.send(msg) {
                self.record_error(e);
                return;
            }
        }
    }

    fn report_negotiation(&mut self, res: Result<(), NegotiationError>) {
        if let Err(e) = res {
            self.record_error(ClientError::Negotiation(e));
        }
    }

    fn record_error(&mut self, error: ClientError) {
        let text = error.to_string();
        sink_warn!(self.logger, "[RoomClient] {}", text);
        self.session.state_mut().error = Some(text.clone());
        self.emit(RoomEvent::Error(text));
    }

    fn emit(&mut self, event: RoomEvent) {
        self.pending_events.push(event);
    }
}

impl Drop for RoomClient {
    fn drop(&mut self) {
        self.leave_room();
    }
}
