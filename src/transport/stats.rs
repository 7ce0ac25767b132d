use crate::{
    protocol::types::ConnectionQuality,
    transport::constants::{EXCELLENT_LOSS, EXCELLENT_RTT_MS, GOOD_LOSS, GOOD_RTT_MS},
};

/// Counters of one transport as reported by the media library.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransportStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub packets_lost: u64,
    pub jitter_ms: f64,
    pub round_trip_time_ms: Option<f64>,
    pub available_outgoing_bitrate_bps: Option<u64>,
}

/// Session-wide snapshot returned by `RoomClient::get_stats`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub packets_lost: u64,
    pub jitter_ms: f64,
    pub round_trip_time_ms: Option<f64>,
    pub available_bandwidth_bps: Option<u64>,
    pub quality: ConnectionQuality,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            bytes_sent: 0,
            bytes_received: 0,
            packets_sent: 0,
            packets_received: 0,
            packets_lost: 0,
            jitter_ms: 0.0,
            round_trip_time_ms: None,
            available_bandwidth_bps: None,
            quality: ConnectionQuality::Failed,
        }
    }
}

impl SessionStats {
    /// Sums counters, keeps the worst jitter/RTT, and buckets the result.
    #[must_use]
    pub fn aggregate<'a>(
        transports: impl IntoIterator<Item = &'a TransportStats>,
        any_connected: bool,
    ) -> Self {
        let mut out = Self::default();
        for t in transports {
            out.bytes_sent += t.bytes_sent;
            out.bytes_received += t.bytes_received;
            out.packets_sent += t.packets_sent;
            out.packets_received += t.packets_received;
            out.packets_lost += t.packets_lost;
            out.jitter_ms = out.jitter_ms.max(t.jitter_ms);
            out.round_trip_time_ms = match (out.round_trip_time_ms, t.round_trip_time_ms) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
            if t.available_outgoing_bitrate_bps.is_some() {
                out.available_bandwidth_bps = t.available_outgoing_bitrate_bps;
            }
        }
        out.quality = quality_bucket(any_connected, out.round_trip_time_ms, out.loss_fraction());
        out
    }

    /// Lost / (received + lost), 0 when nothing was expected yet.
    #[must_use]
    pub fn loss_fraction(&self) -> f64 {
        let expected = self.packets_received + self.packets_lost;
        if expected == 0 {
            0.0
        } else {
            self.packets_lost as f64 / expected as f64
        }
    }
}

/// Maps RTT and loss to a quality bucket. A missing RTT sample counts as fast.
#[must_use]
pub fn quality_bucket(any_connected: bool, rtt_ms: Option<f64>, loss: f64) -> ConnectionQuality {
    if !any_connected {
        return ConnectionQuality::Failed;
    }
    let rtt = rtt_ms.unwrap_or(0.0);
    if rtt <= EXCELLENT_RTT_MS && loss < EXCELLENT_LOSS {
        ConnectionQuality::Excellent
    } else if rtt <= GOOD_RTT_MS && loss < GOOD_LOSS {
        ConnectionQuality::Good
    } else {
        ConnectionQuality::Poor
    }
}
