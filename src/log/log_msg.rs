use crate::log::log_level::LogLevel;

/// One queued log line.
#[derive(Debug, Clone)]
pub struct LogMsg {
    pub level: LogLevel,
    /// Milliseconds since the UNIX epoch.
    pub ts_ms: u128,
    pub text: String,
    /// Module path the line was emitted from.
    pub target: &'static str,
}

impl LogMsg {
    pub fn new(level: LogLevel, text: impl Into<String>, target: &'static str) -> Self {
        Self {
            level,
            ts_ms: crate::log::now_millis(),
            text: text.into(),
            target,
        }
    }

    /// Renders the line the way it is written to the log file.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "[{}] {} {} | {}",
            self.level, self.ts_ms, self.target, self.text
        )
    }
}
