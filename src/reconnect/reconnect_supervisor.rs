use std::time::{Duration, Instant};

use crate::signaling_client::close_code;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Single-shot reconnection timer.
///
/// An abnormal close arms one deadline; further closes while armed are
/// ignored. The deadline fires once from [`Self::poll`] and clears itself.
#[derive(Debug, Clone)]
pub struct ReconnectSupervisor {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for ReconnectSupervisor {
    fn default() -> Self {
        Self::new(DEFAULT_RECONNECT_DELAY)
    }
}

impl ReconnectSupervisor {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Reacts to the channel closing with `code`. Returns `true` when this
    /// call armed the timer.
    pub fn on_channel_closed(&mut self, code: u16, now: Instant) -> bool {
        if close_code::is_normal(code) || self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(now + self.delay);
        true
    }

    /// `true` exactly once per armed deadline, when `now` reached it.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Manual reconnect or intentional leave.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
