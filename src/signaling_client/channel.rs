use std::{
    io,
    sync::{Arc, mpsc::Receiver},
    time::Duration,
};

use rustls::ClientConfig;
use url::Url;

use crate::{
    config::Config,
    log::log_sink::LogSink,
    protocol::ClientMessage,
    signaling_client::{
        signaling_client_c::{DEFAULT_READ_TIMEOUT, SignalingClient},
        signaling_client_error::SignalingClientError,
        signaling_event::SignalingEvent,
    },
    tls_utils::build_signaling_client_config,
};

/// Outbound half of an open signaling connection.
pub trait SignalingChannel: Send {
    /// Queues one frame. Frames go out in call order.
    ///
    /// # Errors
    ///
    /// [`SignalingClientError::Disconnected`] when the connection is gone.
    fn send(&mut self, msg: &ClientMessage) -> Result<(), SignalingClientError>;

    /// Closes with the given WebSocket close code. Idempotent.
    fn close(&mut self, code: u16);
}

/// An open connection: where to send, and where events arrive.
pub struct SignalingLink {
    pub channel: Box<dyn SignalingChannel>,
    pub events: Receiver<SignalingEvent>,
}

/// Opens signaling connections. One call per join attempt.
pub trait SignalingConnector: Send {
    /// Returns once the connection is open.
    ///
    /// # Errors
    ///
    /// Any failure before the connection is usable.
    fn open(&mut self, endpoint: &Url) -> Result<SignalingLink, SignalingClientError>;
}

impl SignalingChannel for SignalingClient {
    fn send(&mut self, msg: &ClientMessage) -> Result<(), SignalingClientError> {
        SignalingClient::send(self, msg)
    }

    fn close(&mut self, code: u16) {
        SignalingClient::close(self, code);
    }
}

/// Production connector: a [`SignalingClient`] per `open`.
pub struct WsConnector {
    tls: Option<Arc<ClientConfig>>,
    read_timeout: Duration,
    logger: Arc<dyn LogSink>,
}

impl WsConnector {
    pub fn new(logger: Arc<dyn LogSink>) -> Self {
        Self {
            tls: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            logger,
        }
    }

    /// Reads `[Signaling] tls_ca` and `read_timeout_ms`.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` when the configured CA cannot be loaded.
    pub fn from_config(config: &Config, logger: Arc<dyn LogSink>) -> io::Result<Self> {
        let tls = build_signaling_client_config(config)?;
        let default_ms = u64::try_from(DEFAULT_READ_TIMEOUT.as_millis()).unwrap_or(50);
        let read_timeout =
            Duration::from_millis(config.get_u64("Signaling", "read_timeout_ms", default_ms));
        Ok(Self::new(logger)
            .with_tls(tls)
            .with_read_timeout(read_timeout))
    }

    #[must_use]
    pub fn with_tls(mut self, tls: Option<Arc<ClientConfig>>) -> Self {
        self.tls = tls;
        self
    }

    #[must_use]
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

impl SignalingConnector for WsConnector {
    fn open(&mut self, endpoint: &Url) -> Result<SignalingLink, SignalingClientError> {
        let (client, events) = SignalingClient::connect(
            endpoint,
            self.tls.clone(),
            self.read_timeout,
            self.logger.clone(),
        )?;
        Ok(SignalingLink {
            channel: Box::new(client),
            events,
        })
    }
}
