use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
    mpsc,
};

use crate::log::{log_level::LogLevel, log_msg::LogMsg, log_sink::LogSink};

/// Lightweight, cloneable handle to the process logger.
///
/// Calls never block: when the bounded queue is full the line is dropped
/// and counted. Lines below `min_level` are filtered before allocation of
/// the queued message.
#[derive(Clone)]
pub struct LoggerHandle {
    pub(super) tx: mpsc::SyncSender<LogMsg>,
    pub(super) min_level: LogLevel,
    pub(super) dropped: Arc<AtomicU64>,
}

impl LogSink for LoggerHandle {
    #[inline]
    fn log(&self, level: LogLevel, msg: &str, target: &'static str) {
        let _ = self.try_log(level, msg, target);
    }
}

impl LoggerHandle {
    /// Attempts to enqueue a log line without blocking.
    ///
    /// Lines below the configured minimum level are accepted and discarded.
    ///
    /// # Errors
    /// - `TrySendError::Full` when the queue is at capacity (the line is counted as dropped).
    /// - `TrySendError::Disconnected` when the logger worker is gone.
    pub fn try_log<S: Into<String>>(
        &self,
        level: LogLevel,
        text: S,
        target: &'static str,
    ) -> Result<(), mpsc::TrySendError<LogMsg>> {
        if level < self.min_level {
            return Ok(());
        }
        let res = self.tx.try_send(LogMsg::new(level, text, target));
        if let Err(mpsc::TrySendError::Full(_)) = &res {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        res
    }
}
