//! SFU transport negotiation: device loading, send/recv transports,
//! producers and consumers, plus session statistics.
pub mod constants;
pub mod media_engine;
pub mod negotiation_error;
pub mod negotiator;
pub mod produce_options;
pub mod stats;
pub mod transport_state;

pub use media_engine::{ConsumerParams, MediaTransport, NegotiationDevice};
pub use negotiation_error::NegotiationError;
pub use negotiator::{Consumer, Producer, RemoteStreamEntry, TransportNegotiator};
pub use produce_options::{CodecOptions, ProduceOptions, ProducerSlot, RtpEncoding};
pub use stats::{SessionStats, TransportStats, quality_bucket};
pub use transport_state::TransportState;
