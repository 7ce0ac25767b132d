#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::{
    Arc, Mutex,
    mpsc::{self, Sender},
};

use serde_json::{Value, json};
use url::Url;

use rustyroom::{
    client::{JoinOptions, RoomClient, RoomClientConfig},
    log::NoopLogSink,
    media_devices::{
        DeviceInfo, DeviceKind, DisplayConstraints, MediaBackend, MediaConstraints, MediaError,
        MediaStream, MediaTrack, TrackKind,
    },
    protocol::{
        ClientMessage, ServerMessage,
        types::{MediaKind, PeerInfo, PeerRole, RoomFeatures, RoomInfo, TransportDirection, TransportOptions},
    },
    room::RoomEvent,
    signaling_client::{
        SignalingChannel, SignalingClientError, SignalingConnector, SignalingEvent, SignalingLink,
    },
    transport::{
        ConsumerParams, MediaTransport, NegotiationDevice, NegotiationError, ProduceOptions,
        TransportStats,
    },
};

// ---- Platform double -----------------------------------------------------------

/// Knobs and call log shared by the fake media backend, device and transports.
#[derive(Default)]
pub struct Platform {
    pub deny_user_media: bool,
    pub deny_display: bool,
    pub reject_load: bool,
    pub user_media_requests: Vec<MediaConstraints>,
    pub calls: Vec<String>,
}

pub type SharedPlatform = Arc<Mutex<Platform>>;

pub struct FakeBackend {
    platform: SharedPlatform,
    next_id: u32,
}

impl MediaBackend for FakeBackend {
    fn enumerate_devices(&mut self) -> Result<Vec<DeviceInfo>, MediaError> {
        Ok(vec![
            DeviceInfo::new("cam-1", "Front Camera", DeviceKind::VideoInput),
            DeviceInfo::new("mic-1", "Built-in Mic", DeviceKind::AudioInput),
            DeviceInfo::new("spk-1", "Speakers", DeviceKind::AudioOutput),
            DeviceInfo::new("cam-x", "", DeviceKind::VideoInput),
        ])
    }

    fn get_user_media(&mut self, c: &MediaConstraints) -> Result<MediaStream, MediaError> {
        let mut p = self.platform.lock().unwrap();
        p.user_media_requests.push(c.clone());
        if p.deny_user_media {
            return Err(MediaError::Access("Permission denied".into()));
        }
        self.next_id += 1;
        let mut tracks = Vec::new();
        if c.audio.is_some() {
            tracks.push(MediaTrack::new(format!("mic-track-{}", self.next_id), TrackKind::Audio, "mic"));
        }
        if c.video.is_some() {
            tracks.push(MediaTrack::new(format!("cam-track-{}", self.next_id), TrackKind::Video, "cam"));
        }
        Ok(MediaStream::new(format!("local-{}", self.next_id), tracks))
    }

    fn get_display_media(&mut self, _: &DisplayConstraints) -> Result<MediaStream, MediaError> {
        if self.platform.lock().unwrap().deny_display {
            return Err(MediaError::DisplayAccess("Permission denied".into()));
        }
        self.next_id += 1;
        Ok(MediaStream::new(
            format!("screen-{}", self.next_id),
            vec![MediaTrack::new("screen-track", TrackKind::Video, "Display 1")],
        ))
    }
}

pub struct FakeDevice {
    platform: SharedPlatform,
    loaded: bool,
}

impl NegotiationDevice for FakeDevice {
    fn load(&mut self, _: &Value) -> Result<(), NegotiationError> {
        if self.platform.lock().unwrap().reject_load {
            return Err(NegotiationError::DeviceLoad("unsupported browser".into()));
        }
        self.loaded = true;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn rtp_capabilities(&self) -> Value {
        json!({"codecs": [{"mimeType": "audio/opus"}, {"mimeType": "video/VP8"}]})
    }

    fn can_produce(&self, _: MediaKind) -> bool {
        true
    }

    fn create_transport(
        &mut self,
        direction: TransportDirection,
        options: &TransportOptions,
    ) -> Result<Box<dyn MediaTransport>, NegotiationError> {
        Ok(Box::new(FakeTransport {
            id: options.id.clone(),
            direction,
            platform: self.platform.clone(),
        }))
    }
}

pub struct FakeTransport {
    id: String,
    direction: TransportDirection,
    platform: SharedPlatform,
}

impl FakeTransport {
    fn record(&self, call: String) {
        self.platform.lock().unwrap().calls.push(call);
    }
}

impl MediaTransport for FakeTransport {
    fn id(&self) -> &str {
        &self.id
    }

    fn direction(&self) -> TransportDirection {
        self.direction
    }

    fn dtls_parameters(&self) -> Value {
        json!({"role": "client", "fingerprints": []})
    }

    fn prepare_produce(&mut self, o: &ProduceOptions) -> Result<Value, NegotiationError> {
        Ok(json!({"mid": o.slot.to_string(), "encodings": o.encodings}))
    }

    fn complete_produce(&mut self, producer_id: &str, _: &ProduceOptions) -> Result<(), NegotiationError> {
        self.record(format!("complete_produce {producer_id}"));
        Ok(())
    }

    fn prepare_consume(&mut self, p: &ConsumerParams) -> Result<MediaTrack, NegotiationError> {
        self.record(format!("consume {}", p.consumer_id));
        Ok(MediaTrack::new(p.consumer_id.clone(), p.kind.into(), "remote"))
    }

    fn resume_consumer(&mut self, consumer_id: &str) -> Result<(), NegotiationError> {
        self.record(format!("resume {consumer_id}"));
        Ok(())
    }

    fn close_producer(&mut self, producer_id: &str) {
        self.record(format!("close_producer {producer_id}"));
    }

    fn close_consumer(&mut self, consumer_id: &str) {
        self.record(format!("close_consumer {consumer_id}"));
    }

    fn stats(&self) -> TransportStats {
        TransportStats {
            bytes_sent: 10_000,
            packets_sent: 100,
            packets_received: 100,
            round_trip_time_ms: Some(60.0),
            ..TransportStats::default()
        }
    }

    fn close(&mut self) {
        self.record(format!("close_transport {}", self.direction));
    }
}

// ---- Signaling double ----------------------------------------------------------

/// Everything the client put on the wire, plus the inbound side of the
/// current connection.
#[derive(Default)]
pub struct Wire {
    pub sent: Vec<ClientMessage>,
    pub closes: Vec<u16>,
    pub endpoints: Vec<String>,
    pub fail_open: bool,
    pub inbound: Option<Sender<SignalingEvent>>,
}

pub type SharedWire = Arc<Mutex<Wire>>;

pub struct FakeConnector(SharedWire);

impl SignalingConnector for FakeConnector {
    fn open(&mut self, endpoint: &Url) -> Result<SignalingLink, SignalingClientError> {
        let mut wire = self.0.lock().unwrap();
        if wire.fail_open {
            return Err(SignalingClientError::Handshake("connection refused".into()));
        }
        wire.endpoints.push(endpoint.to_string());
        let (tx, rx) = mpsc::channel();
        wire.inbound = Some(tx);
        Ok(SignalingLink {
            channel: Box::new(FakeChannel {
                wire: self.0.clone(),
                closed: false,
            }),
            events: rx,
        })
    }
}

struct FakeChannel {
    wire: SharedWire,
    closed: bool,
}

impl SignalingChannel for FakeChannel {
    fn send(&mut self, msg: &ClientMessage) -> Result<(), SignalingClientError> {
        if self.closed {
            return Err(SignalingClientError::Disconnected);
        }
        self.wire.lock().unwrap().sent.push(msg.clone());
        Ok(())
    }

    fn close(&mut self, code: u16) {
        if !self.closed {
            self.closed = true;
            self.wire.lock().unwrap().closes.push(code);
        }
    }
}

// ---- Harness ---------------------------------------------------------------------

pub struct Harness {
    pub client: RoomClient,
    pub wire: SharedWire,
    pub platform: SharedPlatform,
}

pub fn options() -> JoinOptions {
    JoinOptions::new("R1", "user-7", "Ada")
}

pub fn config() -> RoomClientConfig {
    RoomClientConfig {
        signaling_url: "ws://signal.test/ws".into(),
        ..RoomClientConfig::default()
    }
}

impl Harness {
    pub fn new(options: JoinOptions) -> Self {
        Self::with_platform(options, Platform::default())
    }

    pub fn with_platform(options: JoinOptions, platform: Platform) -> Self {
        let wire = SharedWire::default();
        let platform = Arc::new(Mutex::new(platform));
        let client = RoomClient::new(
            options,
            config(),
            Box::new(FakeBackend {
                platform: platform.clone(),
                next_id: 0,
            }),
            Box::new(FakeDevice {
                platform: platform.clone(),
                loaded: false,
            }),
            Box::new(FakeConnector(wire.clone())),
            Arc::new(NoopLogSink),
        );
        Self {
            client,
            wire,
            platform,
        }
    }

    /// Queues an inbound frame on the current connection.
    pub fn push(&self, msg: ServerMessage) {
        self.push_event(SignalingEvent::Message(msg));
    }

    pub fn push_event(&self, event: SignalingEvent) {
        let wire = self.wire.lock().unwrap();
        let _ = wire.inbound.as_ref().expect("connection open").send(event);
    }

    pub fn deliver(&mut self, msg: ServerMessage) -> Vec<RoomEvent> {
        self.push(msg);
        self.client.poll()
    }

    pub fn take_sent(&self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.wire.lock().unwrap().sent)
    }

    pub fn sent_types(&self) -> Vec<&'static str> {
        self.wire
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(ClientMessage::type_name)
            .collect()
    }

    pub fn opens(&self) -> usize {
        self.wire.lock().unwrap().endpoints.len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.platform.lock().unwrap().calls.clone()
    }

    /// join_room + room_joined with `others` already in the room.
    pub fn join(&mut self, room: RoomInfo, others: &[&str]) -> Vec<RoomEvent> {
        self.client.join_room();
        self.deliver(ServerMessage::RoomJoined {
            room_info: room,
            peers: others.iter().map(|id| peer(id)).collect(),
            peer_id: None,
        })
    }

    /// Joined, device loaded, both transports created.
    pub fn join_with_transports(&mut self, room: RoomInfo, others: &[&str]) {
        self.join(room, others);
        self.deliver(ServerMessage::RouterRtpCapabilities {
            rtp_capabilities: json!({"codecs": []}),
        });
        self.deliver(ServerMessage::WebrtcTransportCreated {
            direction: TransportDirection::Send,
            transport_options: transport_options("t-send"),
        });
        self.deliver(ServerMessage::WebrtcTransportCreated {
            direction: TransportDirection::Recv,
            transport_options: transport_options("t-recv"),
        });
    }
}

pub fn room(presenter_count: u32, max_presenters: u32) -> RoomInfo {
    RoomInfo {
        room_id: "R1".into(),
        name: "Launch".into(),
        peer_count: 3,
        presenter_count,
        features: RoomFeatures {
            max_presenters,
            ..RoomFeatures::default()
        },
        ..RoomInfo::default()
    }
}

pub fn peer(id: &str) -> PeerInfo {
    PeerInfo {
        id: id.into(),
        user_id: format!("u-{id}"),
        display_name: id.to_uppercase(),
        role: PeerRole::Attendee,
        ..PeerInfo::default()
    }
}

pub fn transport_options(id: &str) -> TransportOptions {
    TransportOptions {
        id: id.into(),
        ice_parameters: json!({"usernameFragment": "u", "password": "p"}),
        ice_candidates: json!([]),
        dtls_parameters: json!({"role": "auto", "fingerprints": []}),
        sctp_parameters: None,
    }
}
