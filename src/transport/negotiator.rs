use std::{collections::HashMap, sync::Arc};

use serde_json::Value;

use crate::{
    log::log_sink::LogSink,
    media_devices::{MediaStream, MediaTrack},
    protocol::{
        ClientMessage,
        types::{ConsumerId, MediaKind, PeerId, ProducerId, TransportDirection, TransportOptions},
    },
    room::commands::CommandBuilder,
    sink_debug, sink_info, sink_warn,
    transport::{
        media_engine::{ConsumerParams, MediaTransport, NegotiationDevice},
        negotiation_error::NegotiationError,
        produce_options::{ProduceOptions, ProducerSlot},
        stats::SessionStats,
        transport_state::TransportState,
    },
};

/// A local track being sent, confirmed by the server.
#[derive(Debug, Clone)]
pub struct Producer {
    pub id: ProducerId,
    pub slot: ProducerSlot,
    pub track: MediaTrack,
}

/// A remote track being received.
#[derive(Debug, Clone)]
pub struct Consumer {
    pub id: ConsumerId,
    pub producer_id: ProducerId,
    pub peer_id: PeerId,
    pub kind: MediaKind,
    pub track: MediaTrack,
}

/// Result of a `consumer_created` reply that was still wanted.
#[derive(Debug, Clone)]
pub struct RemoteStreamEntry {
    pub producer_id: ProducerId,
    pub consumer_id: ConsumerId,
    pub peer_id: PeerId,
    pub stream: MediaStream,
}

struct TransportSlot {
    transport: Box<dyn MediaTransport>,
    state: TransportState,
}

/// Owns the negotiation device, one send and one recv transport, and every
/// producer and consumer of the current membership.
///
/// Requests to the server are queued in an outbox the caller drains and
/// sends in order. Replies come back through the `on_*` methods. Produce
/// and consume requests issued before the matching transport exists wait
/// until it is created.
pub struct TransportNegotiator {
    device: Box<dyn NegotiationDevice>,
    send: Option<TransportSlot>,
    recv: Option<TransportSlot>,

    producers: HashMap<ProducerSlot, Producer>,
    pending_produces: HashMap<ProducerSlot, ProduceOptions>,
    waiting_produces: Vec<ProduceOptions>,

    consumers: HashMap<ConsumerId, Consumer>,
    pending_consumes: HashMap<ProducerId, PeerId>,
    waiting_consumes: Vec<(ProducerId, PeerId)>,

    outbox: Vec<ClientMessage>,
    logger: Arc<dyn LogSink>,
}

impl TransportNegotiator {
    pub fn new(device: Box<dyn NegotiationDevice>, logger: Arc<dyn LogSink>) -> Self {
        Self {
            device,
            send: None,
            recv: None,
            producers: HashMap::new(),
            pending_produces: HashMap::new(),
            waiting_produces: Vec::new(),
            consumers: HashMap::new(),
            pending_consumes: HashMap::new(),
            waiting_consumes: Vec::new(),
            outbox: Vec::new(),
            logger,
        }
    }

    /// Requests queued for the server since the last call, in order.
    pub fn drain_outbox(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.outbox)
    }

    // ---- Device & transports ----------------------------------------------

    /// Loads the device and asks the server for both transports.
    /// A device already loaded by an earlier membership is reused.
    ///
    /// # Errors
    ///
    /// [`NegotiationError::DeviceLoad`]; fatal for the join attempt.
    pub fn on_router_capabilities(&mut self, caps: &Value) -> Result<(), NegotiationError> {
        if self.device.is_loaded() {
            sink_debug!(self.logger, "[Negotiator] device already loaded");
        } else {
            self.device.load(caps)?;
            sink_info!(self.logger, "[Negotiator] device loaded");
        }
        for direction in [TransportDirection::Send, TransportDirection::Recv] {
            self.outbox
                .push(CommandBuilder::create_webrtc_transport(direction));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`NegotiationError::TransportExists`] for a second transport in the
    /// same direction, [`NegotiationError::DeviceNotLoaded`], or the
    /// platform's refusal.
    pub fn on_transport_created(
        &mut self,
        direction: TransportDirection,
        options: &TransportOptions,
    ) -> Result<(), NegotiationError> {
        if self.slot(direction).is_some() {
            return Err(NegotiationError::TransportExists(direction));
        }
        if !self.device.is_loaded() {
            return Err(NegotiationError::DeviceNotLoaded);
        }
        let transport = self.device.create_transport(direction, options)?;
        sink_info!(
            self.logger,
            "[Negotiator] {} transport {} created",
            direction,
            transport.id()
        );
        *self.slot_mut(direction) = Some(TransportSlot {
            transport,
            state: TransportState::Created,
        });

        match direction {
            TransportDirection::Send => self.flush_waiting_produces(),
            TransportDirection::Recv => self.flush_waiting_consumes(),
        }
    }

    pub fn on_transport_connected(&mut self, direction: TransportDirection) {
        let found = match self.slot_mut(direction) {
            Some(slot) => {
                slot.state = TransportState::Connected;
                true
            }
            None => false,
        };
        if found {
            sink_info!(self.logger, "[Negotiator] {} transport connected", direction);
        } else {
            sink_warn!(
                self.logger,
                "[Negotiator] connected reply for missing {} transport",
                direction
            );
        }
    }

    #[must_use]
    pub fn transport_state(&self, direction: TransportDirection) -> TransportState {
        self.slot(direction)
            .map_or(TransportState::Uncreated, |s| s.state)
    }

    #[must_use]
    pub fn has_send_transport(&self) -> bool {
        self.send.is_some()
    }

    #[must_use]
    pub fn device_loaded(&self) -> bool {
        self.device.is_loaded()
    }

    // ---- Producing ----------------------------------------------------------

    /// Produces the audio and video tracks of `stream` that are live and
    /// enabled. Keeps going after a failure; the first one is returned.
    ///
    /// # Errors
    ///
    /// See [`Self::produce`].
    pub fn start_producing(
        &mut self,
        stream: &MediaStream,
        simulcast: bool,
    ) -> Result<(), NegotiationError> {
        let mut first_err = None;
        let requests = [
            stream.audio_track().cloned().map(ProduceOptions::audio),
            stream
                .video_track()
                .cloned()
                .map(|t| ProduceOptions::video(t, simulcast)),
        ];
        for options in requests.into_iter().flatten() {
            if let Err(e) = self.produce(options) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// # Errors
    ///
    /// See [`Self::produce`].
    pub fn produce_screen(&mut self, track: MediaTrack) -> Result<(), NegotiationError> {
        self.produce(ProduceOptions::screen(track))
    }

    /// Starts one producer. A track that is ended or disabled is skipped.
    /// Without a send transport the request waits for one.
    ///
    /// # Errors
    ///
    /// [`NegotiationError::AlreadyProducing`] when the slot is taken or
    /// pending, [`NegotiationError::CannotProduce`] when the device lacks the
    /// codec, or the transport's own failure.
    pub fn produce(&mut self, options: ProduceOptions) -> Result<(), NegotiationError> {
        let slot = options.slot;
        if !options.track.is_live() || !options.track.is_enabled() {
            sink_debug!(self.logger, "[Negotiator] skip {} producer: track off", slot);
            return Ok(());
        }
        if self.producers.contains_key(&slot)
            || self.pending_produces.contains_key(&slot)
            || self.waiting_produces.iter().any(|o| o.slot == slot)
        {
            return Err(NegotiationError::AlreadyProducing(slot));
        }
        if self.send.is_none() {
            sink_debug!(self.logger, "[Negotiator] {} producer waits for send transport", slot);
            self.waiting_produces.push(options);
            return Ok(());
        }
        self.send_produce(options)
    }

    fn send_produce(&mut self, options: ProduceOptions) -> Result<(), NegotiationError> {
        if !self.device.can_produce(options.kind()) {
            return Err(NegotiationError::CannotProduce(options.kind()));
        }
        self.ensure_connecting(TransportDirection::Send)?;
        let transport = self.transport_mut(TransportDirection::Send)?;
        let rtp_parameters = transport.prepare_produce(&options)?;

        self.outbox.push(CommandBuilder::produce(
            options.kind(),
            rtp_parameters,
            options.app_data.clone(),
        ));
        sink_debug!(self.logger, "[Negotiator] produce {} requested", options.slot);
        self.pending_produces.insert(options.slot, options);
        Ok(())
    }

    fn flush_waiting_produces(&mut self) -> Result<(), NegotiationError> {
        let mut first_err = None;
        for options in std::mem::take(&mut self.waiting_produces) {
            if let Err(e) = self.send_produce(options) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Resolves an outstanding produce.
    ///
    /// # Errors
    ///
    /// [`NegotiationError::UnexpectedProducer`] when nothing is pending for
    /// that slot.
    pub fn on_producer_created(
        &mut self,
        producer_id: ProducerId,
        kind: MediaKind,
        app_data: Option<&Value>,
    ) -> Result<ProducerSlot, NegotiationError> {
        let slot = ProducerSlot::from_reply(kind, app_data);
        let Some(options) = self.pending_produces.remove(&slot) else {
            return Err(NegotiationError::UnexpectedProducer(slot));
        };
        self.transport_mut(TransportDirection::Send)?
            .complete_produce(&producer_id, &options)?;

        sink_info!(self.logger, "[Negotiator] {} producer {} live", slot, producer_id);
        self.producers.insert(
            slot,
            Producer {
                id: producer_id,
                slot,
                track: options.track,
            },
        );
        Ok(slot)
    }

    /// Closes the slot's producer and forgets any request for it. The track
    /// itself is left alone.
    pub fn close_producer(&mut self, slot: ProducerSlot) {
        self.pending_produces.remove(&slot);
        self.waiting_produces.retain(|o| o.slot != slot);
        let Some(producer) = self.producers.remove(&slot) else {
            return;
        };
        if let Some(s) = self.send.as_mut() {
            s.transport.close_producer(&producer.id);
        }
        sink_debug!(self.logger, "[Negotiator] {} producer {} closed", slot, producer.id);
    }

    #[must_use]
    pub fn producer(&self, slot: ProducerSlot) -> Option<&Producer> {
        self.producers.get(&slot)
    }

    #[must_use]
    pub fn is_produce_pending(&self, slot: ProducerSlot) -> bool {
        self.pending_produces.contains_key(&slot) || self.waiting_produces.iter().any(|o| o.slot == slot)
    }

    // ---- Consuming ----------------------------------------------------------

    /// Asks the server for a consumer of a remote producer. Duplicate
    /// requests for the same producer are ignored.
    ///
    /// # Errors
    ///
    /// The recv transport's connect failure.
    pub fn consume(&mut self, producer_id: ProducerId, peer_id: PeerId) -> Result<(), NegotiationError> {
        let known = self.pending_consumes.contains_key(&producer_id)
            || self.waiting_consumes.iter().any(|(p, _)| *p == producer_id)
            || self.consumers.values().any(|c| c.producer_id == producer_id);
        if known {
            sink_debug!(self.logger, "[Negotiator] producer {} already consumed", producer_id);
            return Ok(());
        }
        if self.recv.is_none() || !self.device.is_loaded() {
            self.waiting_consumes.push((producer_id, peer_id));
            return Ok(());
        }
        self.send_consume(producer_id, peer_id)
    }

    fn send_consume(&mut self, producer_id: ProducerId, peer_id: PeerId) -> Result<(), NegotiationError> {
        self.ensure_connecting(TransportDirection::Recv)?;
        self.outbox.push(CommandBuilder::consume(
            producer_id.clone(),
            self.device.rtp_capabilities(),
        ));
        self.pending_consumes.insert(producer_id, peer_id);
        Ok(())
    }

    fn flush_waiting_consumes(&mut self) -> Result<(), NegotiationError> {
        let mut first_err = None;
        for (producer_id, peer_id) in std::mem::take(&mut self.waiting_consumes) {
            if let Err(e) = self.send_consume(producer_id, peer_id) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Resolves an outstanding consume into a one-track remote stream keyed
    /// by the producer id, then asks the server to resume it unless the
    /// producer is paused. A reply nobody waits for (its peer left) yields
    /// `None`.
    ///
    /// # Errors
    ///
    /// [`NegotiationError::NoTransport`] or the transport's own failure.
    pub fn on_consumer_created(
        &mut self,
        params: ConsumerParams,
        producer_paused: bool,
    ) -> Result<Option<RemoteStreamEntry>, NegotiationError> {
        let Some(peer_id) = self.pending_consumes.remove(&params.producer_id) else {
            sink_debug!(
                self.logger,
                "[Negotiator] discarding consumer {} for released producer {}",
                params.consumer_id,
                params.producer_id
            );
            return Ok(None);
        };

        let transport = self.transport_mut(TransportDirection::Recv)?;
        let track = transport.prepare_consume(&params)?;
        if !producer_paused {
            transport.resume_consumer(&params.consumer_id)?;
            self.outbox
                .push(CommandBuilder::resume_consumer(params.consumer_id.clone()));
        }

        let stream = MediaStream::new(params.producer_id.clone(), vec![track.clone()]);
        self.consumers.insert(
            params.consumer_id.clone(),
            Consumer {
                id: params.consumer_id.clone(),
                producer_id: params.producer_id.clone(),
                peer_id: peer_id.clone(),
                kind: params.kind,
                track,
            },
        );
        sink_info!(
            self.logger,
            "[Negotiator] consuming {} from {} as {}",
            params.producer_id,
            peer_id,
            params.consumer_id
        );
        Ok(Some(RemoteStreamEntry {
            producer_id: params.producer_id,
            consumer_id: params.consumer_id,
            peer_id,
            stream,
        }))
    }

    pub fn close_consumer(&mut self, consumer_id: &str) {
        if self.consumers.remove(consumer_id).is_none() {
            return;
        }
        if let Some(s) = self.recv.as_mut() {
            s.transport.close_consumer(consumer_id);
        }
    }

    /// Drops every consumer and consume request that belongs to `peer_id`.
    pub fn release_peer(&mut self, peer_id: &str) {
        let owned: Vec<ConsumerId> = self
            .consumers
            .values()
            .filter(|c| c.peer_id == peer_id)
            .map(|c| c.id.clone())
            .collect();
        for id in owned {
            self.close_consumer(&id);
        }
        self.pending_consumes.retain(|_, owner| owner.as_str() != peer_id);
        self.waiting_consumes.retain(|(_, owner)| owner.as_str() != peer_id);
    }

    #[must_use]
    pub fn consumers(&self) -> impl Iterator<Item = &Consumer> {
        self.consumers.values()
    }

    // ---- Teardown & stats ---------------------------------------------------

    /// Closes producers, consumers and both transports. Idempotent.
    pub fn close_all(&mut self) {
        let slots: Vec<ProducerSlot> = self.producers.keys().copied().collect();
        for slot in slots {
            self.close_producer(slot);
        }
        let consumer_ids: Vec<ConsumerId> = self.consumers.keys().cloned().collect();
        for id in consumer_ids {
            self.close_consumer(&id);
        }
        self.pending_produces.clear();
        self.waiting_produces.clear();
        self.pending_consumes.clear();
        self.waiting_consumes.clear();
        self.outbox.clear();

        for direction in [TransportDirection::Send, TransportDirection::Recv] {
            if let Some(mut slot) = self.slot_mut(direction).take() {
                slot.transport.close();
                sink_debug!(self.logger, "[Negotiator] {} transport closed", direction);
            }
        }
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        let slots = [self.send.as_ref(), self.recv.as_ref()];
        let any_connected = slots
            .iter()
            .flatten()
            .any(|s| s.state == TransportState::Connected);
        let per_transport: Vec<_> = slots.iter().flatten().map(|s| s.transport.stats()).collect();
        SessionStats::aggregate(&per_transport, any_connected)
    }

    // ---- helpers ------------------------------------------------------------

    fn slot(&self, direction: TransportDirection) -> Option<&TransportSlot> {
        match direction {
            TransportDirection::Send => self.send.as_ref(),
            TransportDirection::Recv => self.recv.as_ref(),
        }
    }

    fn slot_mut(&mut self, direction: TransportDirection) -> &mut Option<TransportSlot> {
        match direction {
            TransportDirection::Send => &mut self.send,
            TransportDirection::Recv => &mut self.recv,
        }
    }

    fn transport_mut(
        &mut self,
        direction: TransportDirection,
    ) -> Result<&mut Box<dyn MediaTransport>, NegotiationError> {
        self.slot_mut(direction)
            .as_mut()
            .map(|s| &mut s.transport)
            .ok_or(NegotiationError::NoTransport(direction))
    }

    /// First use of a `Created` transport sends our DTLS parameters.
    fn ensure_connecting(&mut self, direction: TransportDirection) -> Result<(), NegotiationError> {
        let slot = self
            .slot_mut(direction)
            .as_mut()
            .ok_or(NegotiationError::NoTransport(direction))?;
        if slot.state != TransportState::Created {
            return Ok(());
        }
        slot.state = TransportState::Connecting;
        let dtls_parameters = slot.transport.dtls_parameters();
        self.outbox
            .push(CommandBuilder::connect_webrtc_transport(direction, dtls_parameters));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::{log::NoopLogSink, media_devices::TrackKind, transport::stats::TransportStats};
    use serde_json::json;
    use std::sync::Mutex;

    type Calls = Arc<Mutex<Vec<String>>>;

    struct StubTransport {
        id: String,
        direction: TransportDirection,
        calls: Calls,
    }

    impl MediaTransport for StubTransport {
        fn id(&self) -> &str {
            &self.id
        }
        fn direction(&self) -> TransportDirection {
            self.direction
        }
        fn dtls_parameters(&self) -> Value {
            json!({"role": "auto"})
        }
        fn prepare_produce(&mut self, o: &ProduceOptions) -> Result<Value, NegotiationError> {
            Ok(json!({"slot": o.slot.to_string(), "encodings": o.encodings.len()}))
        }
        fn complete_produce(&mut self, id: &str, _: &ProduceOptions) -> Result<(), NegotiationError> {
            self.calls.lock().unwrap().push(format!("complete_produce {id}"));
            Ok(())
        }
        fn prepare_consume(&mut self, p: &ConsumerParams) -> Result<MediaTrack, NegotiationError> {
            Ok(MediaTrack::new(p.consumer_id.clone(), p.kind.into(), "remote"))
        }
        fn resume_consumer(&mut self, id: &str) -> Result<(), NegotiationError> {
            self.calls.lock().unwrap().push(format!("resume {id}"));
            Ok(())
        }
        fn close_producer(&mut self, id: &str) {
            self.calls.lock().unwrap().push(format!("close_producer {id}"));
        }
        fn close_consumer(&mut self, id: &str) {
            self.calls.lock().unwrap().push(format!("close_consumer {id}"));
        }
        fn stats(&self) -> TransportStats {
            TransportStats {
                round_trip_time_ms: Some(40.0),
                ..TransportStats::default()
            }
        }
        fn close(&mut self) {
            self.calls.lock().unwrap().push(format!("close {}", self.direction));
        }
    }

    struct StubDevice {
        loaded: bool,
        reject: bool,
        calls: Calls,
    }

    impl NegotiationDevice for StubDevice {
        fn load(&mut self, _: &Value) -> Result<(), NegotiationError> {
            if self.reject {
                return Err(NegotiationError::DeviceLoad("no common codecs".into()));
            }
            self.loaded = true;
            Ok(())
        }
        fn is_loaded(&self) -> bool {
            self.loaded
        }
        fn rtp_capabilities(&self) -> Value {
            json!({"codecs": ["opus", "vp8"]})
        }
        fn can_produce(&self, _: MediaKind) -> bool {
            true
        }
        fn create_transport(
            &mut self,
            direction: TransportDirection,
            options: &TransportOptions,
        ) -> Result<Box<dyn MediaTransport>, NegotiationError> {
            Ok(Box::new(StubTransport {
                id: options.id.clone(),
                direction,
                calls: self.calls.clone(),
            }))
        }
    }

    fn options(id: &str) -> TransportOptions {
        TransportOptions {
            id: id.into(),
            ice_parameters: json!({}),
            ice_candidates: json!([]),
            dtls_parameters: json!({}),
            sctp_parameters: None,
        }
    }

    fn negotiator(reject: bool) -> (TransportNegotiator, Calls) {
        let calls = Calls::default();
        let device = StubDevice {
            loaded: false,
            reject,
            calls: calls.clone(),
        };
        (
            TransportNegotiator::new(Box::new(device), Arc::new(NoopLogSink)),
            calls,
        )
    }

    fn ready() -> (TransportNegotiator, Calls) {
        let (mut n, calls) = negotiator(false);
        n.on_router_capabilities(&json!({})).unwrap();
        n.on_transport_created(TransportDirection::Send, &options("t-send")).unwrap();
        n.on_transport_created(TransportDirection::Recv, &options("t-recv")).unwrap();
        n.drain_outbox();
        (n, calls)
    }

    fn types(msgs: &[ClientMessage]) -> Vec<&'static str> {
        msgs.iter().map(ClientMessage::type_name).collect()
    }

    fn cam_stream() -> MediaStream {
        MediaStream::new(
            "local",
            vec![
                MediaTrack::new("a", TrackKind::Audio, "mic"),
                MediaTrack::new("v", TrackKind::Video, "cam"),
            ],
        )
    }

    #[test]
    fn capabilities_load_device_and_request_both_transports() {
        let (mut n, _) = negotiator(false);
        n.on_router_capabilities(&json!({"codecs": []})).unwrap();
        assert!(n.device_loaded());
        assert_eq!(
            n.drain_outbox(),
            vec![
                ClientMessage::CreateWebrtcTransport {
                    direction: TransportDirection::Send
                },
                ClientMessage::CreateWebrtcTransport {
                    direction: TransportDirection::Recv
                },
            ]
        );
    }

    #[test]
    fn rejected_capabilities_request_nothing() {
        let (mut n, _) = negotiator(true);
        assert!(matches!(
            n.on_router_capabilities(&json!({})),
            Err(NegotiationError::DeviceLoad(_))
        ));
        assert!(n.drain_outbox().is_empty());
    }

    #[test]
    fn second_transport_per_direction_is_rejected() {
        let (mut n, _) = ready();
        assert_eq!(
            n.on_transport_created(TransportDirection::Send, &options("again")),
            Err(NegotiationError::TransportExists(TransportDirection::Send))
        );
    }

    #[test]
    fn first_produce_connects_transport_once() {
        let (mut n, _) = ready();
        n.start_producing(&cam_stream(), true).unwrap();

        let out = n.drain_outbox();
        assert_eq!(types(&out), ["connect_webrtc_transport", "produce", "produce"]);
        assert_eq!(n.transport_state(TransportDirection::Send), TransportState::Connecting);
        match &out[2] {
            ClientMessage::Produce { kind, rtp_parameters, app_data } => {
                assert_eq!(*kind, MediaKind::Video);
                assert_eq!(rtp_parameters["encodings"], 3);
                assert!(app_data.is_none());
            }
            other => panic!("expected produce, got {other:?}"),
        }

        n.on_transport_connected(TransportDirection::Send);
        assert_eq!(n.transport_state(TransportDirection::Send), TransportState::Connected);
    }

    #[test]
    fn produce_waits_for_send_transport() {
        let (mut n, _) = negotiator(false);
        n.on_router_capabilities(&json!({})).unwrap();
        n.drain_outbox();

        n.start_producing(&cam_stream(), false).unwrap();
        assert!(n.drain_outbox().is_empty());
        assert!(n.is_produce_pending(ProducerSlot::Audio));

        n.on_transport_created(TransportDirection::Send, &options("t-send")).unwrap();
        assert_eq!(
            types(&n.drain_outbox()),
            ["connect_webrtc_transport", "produce", "produce"]
        );
    }

    #[test]
    fn disabled_track_is_not_produced() {
        let (mut n, _) = ready();
        let stream = cam_stream();
        stream.video_track().unwrap().set_enabled(false);
        n.start_producing(&stream, true).unwrap();
        assert_eq!(types(&n.drain_outbox()), ["connect_webrtc_transport", "produce"]);
        assert!(!n.is_produce_pending(ProducerSlot::Video));
    }

    #[test]
    fn producer_reply_resolves_screen_slot_by_app_data() {
        let (mut n, calls) = ready();
        n.start_producing(&cam_stream(), false).unwrap();
        n.produce_screen(MediaTrack::new("s", TrackKind::Video, "screen")).unwrap();

        let slot = n
            .on_producer_created("P-screen".into(), MediaKind::Video, Some(&json!({"source": "screen"})))
            .unwrap();
        assert_eq!(slot, ProducerSlot::Screen);
        assert!(n.is_produce_pending(ProducerSlot::Video));
        assert_eq!(n.producer(ProducerSlot::Screen).map(|p| p.id.as_str()), Some("P-screen"));

        n.close_producer(ProducerSlot::Screen);
        assert!(n.producer(ProducerSlot::Screen).is_none());
        assert!(calls.lock().unwrap().contains(&"close_producer P-screen".to_string()));
    }

    #[test]
    fn unexpected_producer_reply_is_an_error() {
        let (mut n, _) = ready();
        assert_eq!(
            n.on_producer_created("P1".into(), MediaKind::Audio, None).unwrap_err(),
            NegotiationError::UnexpectedProducer(ProducerSlot::Audio)
        );
    }

    #[test]
    fn consume_then_reply_builds_stream_and_resumes() {
        let (mut n, calls) = ready();
        n.consume("P9".into(), "peer-2".into()).unwrap();
        n.consume("P9".into(), "peer-2".into()).unwrap();
        let out = n.drain_outbox();
        assert_eq!(types(&out), ["connect_webrtc_transport", "consume"]);

        let entry = n
            .on_consumer_created(
                ConsumerParams {
                    consumer_id: "C1".into(),
                    producer_id: "P9".into(),
                    kind: MediaKind::Video,
                    rtp_parameters: json!({}),
                },
                false,
            )
            .unwrap()
            .expect("consumer wanted");
        assert_eq!(entry.peer_id, "peer-2");
        assert_eq!(entry.stream.id(), "P9");
        assert!(entry.stream.video_track().is_some());
        assert_eq!(
            n.drain_outbox(),
            vec![ClientMessage::ResumeConsumer {
                consumer_id: "C1".into()
            }]
        );
        assert!(calls.lock().unwrap().contains(&"resume C1".to_string()));
    }

    #[test]
    fn paused_producer_is_not_resumed() {
        let (mut n, _) = ready();
        n.consume("P9".into(), "peer-2".into()).unwrap();
        n.drain_outbox();
        let params = ConsumerParams {
            consumer_id: "C1".into(),
            producer_id: "P9".into(),
            kind: MediaKind::Audio,
            rtp_parameters: json!({}),
        };
        assert!(n.on_consumer_created(params, true).unwrap().is_some());
        assert!(n.drain_outbox().is_empty());
    }

    #[test]
    fn released_peer_reply_is_discarded() {
        let (mut n, _) = ready();
        n.consume("P9".into(), "peer-2".into()).unwrap();
        n.release_peer("peer-2");

        let params = ConsumerParams {
            consumer_id: "C1".into(),
            producer_id: "P9".into(),
            kind: MediaKind::Video,
            rtp_parameters: json!({}),
        };
        assert!(n.on_consumer_created(params, false).unwrap().is_none());
        assert_eq!(n.consumers().count(), 0);
    }

    #[test]
    fn close_all_is_idempotent_and_stats_fail_afterwards() {
        let (mut n, calls) = ready();
        n.on_transport_connected(TransportDirection::Recv);
        assert_ne!(n.stats().quality, crate::protocol::types::ConnectionQuality::Failed);

        n.close_all();
        n.close_all();
        let closes = calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with("close "))
            .count();
        assert_eq!(closes, 2);
        assert_eq!(n.transport_state(TransportDirection::Send), TransportState::Uncreated);
        assert_eq!(n.stats().quality, crate::protocol::types::ConnectionQuality::Failed);
    }
}
