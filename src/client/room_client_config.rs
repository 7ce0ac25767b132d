use std::time::Duration;

use crate::{
    config::Config, reconnect::DEFAULT_RECONNECT_DELAY,
    signaling_client::signaling_client_c::DEFAULT_READ_TIMEOUT,
};

pub const DEFAULT_SIGNALING_URL: &str = "ws://127.0.0.1:3001";

/// Typed view of the client's config file.
///
/// ```ini
/// [Signaling]
/// url = wss://signal.example.com/ws
/// token = secret
/// tls_ca = certs/rootCA.pem
/// read_timeout_ms = 50
///
/// [Reconnect]
/// delay_ms = 3000
///
/// [Media]
/// simulcast = true
/// audio = true
/// video = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomClientConfig {
    pub signaling_url: String,
    pub token: Option<String>,
    pub read_timeout: Duration,
    pub reconnect_delay: Duration,
    pub simulcast: bool,
    pub audio: bool,
    pub video: bool,
}

impl Default for RoomClientConfig {
    fn default() -> Self {
        Self {
            signaling_url: DEFAULT_SIGNALING_URL.to_string(),
            token: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            simulcast: true,
            audio: true,
            video: true,
        }
    }
}

impl RoomClientConfig {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            signaling_url: config
                .get_non_empty("Signaling", "url")
                .map_or(defaults.signaling_url, str::to_string),
            token: config
                .get_non_empty("Signaling", "token")
                .map(str::to_string),
            read_timeout: Duration::from_millis(config.get_u64(
                "Signaling",
                "read_timeout_ms",
                millis(defaults.read_timeout),
            )),
            reconnect_delay: Duration::from_millis(config.get_u64(
                "Reconnect",
                "delay_ms",
                millis(defaults.reconnect_delay),
            )),
            simulcast: config.get_bool("Media", "simulcast", defaults.simulcast),
            audio: config.get_bool("Media", "audio", defaults.audio),
            video: config.get_bool("Media", "video", defaults.video),
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
