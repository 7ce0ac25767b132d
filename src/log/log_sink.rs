use crate::log::log_level::LogLevel;

/// Destination for client log lines. Shared across the signaling thread and
/// the owner thread, so implementations must never block for long.
pub trait LogSink: Send + Sync {
    /// `target` is the emitting module path, filled in by the `sink_*!` macros.
    fn log(&self, level: LogLevel, msg: &str, target: &'static str);
}
