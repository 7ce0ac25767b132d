use serde_json::Value;

use crate::{
    media_devices::MediaTrack,
    protocol::types::{ConsumerId, MediaKind, ProducerId, TransportDirection, TransportOptions},
    transport::{negotiation_error::NegotiationError, produce_options::ProduceOptions, stats::TransportStats},
};

/// Server-side consumer as announced by `consumer_created`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerParams {
    pub consumer_id: ConsumerId,
    pub producer_id: ProducerId,
    pub kind: MediaKind,
    pub rtp_parameters: Value,
}

/// The SFU client device (one per client). Must be loaded with the router's
/// RTP capabilities before any transport exists.
pub trait NegotiationDevice: Send {
    /// # Errors
    ///
    /// [`NegotiationError::DeviceLoad`] when the capabilities are unusable.
    fn load(&mut self, router_rtp_capabilities: &Value) -> Result<(), NegotiationError>;

    fn is_loaded(&self) -> bool;

    /// Our receive capabilities, sent with every `consume`.
    fn rtp_capabilities(&self) -> Value;

    fn can_produce(&self, kind: MediaKind) -> bool;

    /// Applies server transport options locally.
    ///
    /// # Errors
    ///
    /// [`NegotiationError::Transport`] when the options are rejected.
    fn create_transport(
        &mut self,
        direction: TransportDirection,
        options: &TransportOptions,
    ) -> Result<Box<dyn MediaTransport>, NegotiationError>;
}

/// One local WebRTC transport (send or recv).
pub trait MediaTransport: Send {
    fn id(&self) -> &str;

    fn direction(&self) -> TransportDirection;

    /// Our DTLS parameters, sent once in `connect_webrtc_transport`.
    fn dtls_parameters(&self) -> Value;

    /// Starts encoding the track and returns the RTP parameters for the
    /// `produce` request.
    ///
    /// # Errors
    ///
    /// [`NegotiationError::Transport`] on a platform failure.
    fn prepare_produce(&mut self, options: &ProduceOptions) -> Result<Value, NegotiationError>;

    /// Binds the server-issued producer id to the local sender.
    ///
    /// # Errors
    ///
    /// [`NegotiationError::Transport`] on a platform failure.
    fn complete_produce(
        &mut self,
        producer_id: &str,
        options: &ProduceOptions,
    ) -> Result<(), NegotiationError>;

    /// Builds the local receiver for a server-side consumer and returns the
    /// remote track.
    ///
    /// # Errors
    ///
    /// [`NegotiationError::Transport`] on a platform failure.
    fn prepare_consume(&mut self, params: &ConsumerParams) -> Result<MediaTrack, NegotiationError>;

    /// # Errors
    ///
    /// [`NegotiationError::Transport`] on a platform failure.
    fn resume_consumer(&mut self, consumer_id: &str) -> Result<(), NegotiationError>;

    fn close_producer(&mut self, producer_id: &str);

    fn close_consumer(&mut self, consumer_id: &str);

    fn stats(&self) -> TransportStats;

    fn close(&mut self);
}
