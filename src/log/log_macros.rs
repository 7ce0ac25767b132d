//! Leveled logging macros over any `LogSink`.
//!
//! # Feature Flags
//! Levels are controlled by cargo features:
//! `log-trace`, `log-debug`, `log-info`, `log-warn`, `log-error`.
//!
//! A disabled level never formats or allocates. Its arguments are only
//! borrowed inside a closure that is never called, so bindings used solely
//! for logging still count as used.

#[macro_export]
macro_rules! sink_log {
    ($sink:expr, $lvl:expr, $($arg:tt)*) => {{
        let __msg = format!($($arg)*);
        $sink.log($lvl, &__msg, module_path!());
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! sink_off {
    ($sink:expr, $($arg:tt)*) => {{
        let _ = &$sink;
        let _ = || format!($($arg)*);
    }};
}

// ---------------------- TRACE ----------------------
#[cfg(feature = "log-trace")]
#[macro_export]
macro_rules! sink_trace { ($sink:expr, $($arg:tt)*) => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Trace, $($arg)*) } }

#[cfg(not(feature = "log-trace"))]
#[macro_export]
macro_rules! sink_trace {
    ($sink:expr, $($arg:tt)*) => {
        $crate::sink_off!($sink, $($arg)*)
    };
}

// ---------------------- DEBUG ----------------------
#[cfg(feature = "log-debug")]
#[macro_export]
macro_rules! sink_debug { ($sink:expr, $($arg:tt)*) => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Debug, $($arg)*) } }

#[cfg(not(feature = "log-debug"))]
#[macro_export]
macro_rules! sink_debug {
    ($sink:expr, $($arg:tt)*) => {
        $crate::sink_off!($sink, $($arg)*)
    };
}

// ---------------------- INFO ----------------------
#[cfg(feature = "log-info")]
#[macro_export]
macro_rules! sink_info { ($sink:expr, $($arg:tt)*) => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Info, $($arg)*) } }

#[cfg(not(feature = "log-info"))]
#[macro_export]
macro_rules! sink_info {
    ($sink:expr, $($arg:tt)*) => {
        $crate::sink_off!($sink, $($arg)*)
    };
}

// ---------------------- WARN ----------------------
#[cfg(feature = "log-warn")]
#[macro_export]
macro_rules! sink_warn { ($sink:expr, $($arg:tt)*) => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Warn, $($arg)*) } }

#[cfg(not(feature = "log-warn"))]
#[macro_export]
macro_rules! sink_warn {
    ($sink:expr, $($arg:tt)*) => {
        $crate::sink_off!($sink, $($arg)*)
    };
}

// ---------------------- ERROR ----------------------
#[cfg(feature = "log-error")]
#[macro_export]
macro_rules! sink_error { ($sink:expr, $($arg:tt)*) => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Error, $($arg)*) } }

#[cfg(not(feature = "log-error"))]
#[macro_export]
macro_rules! sink_error {
    ($sink:expr, $($arg:tt)*) => {
        $crate::sink_off!($sink, $($arg)*)
    };
}

// ---------------------- RAW FRAMES ----------------------
// Separate from the level features: dumping every signaling frame is noisy
// even at trace level.
#[cfg(feature = "signaling-frame-debug")]
#[macro_export]
macro_rules! frame_trace { ($sink:expr, $($arg:tt)*) => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Trace, $($arg)*) } }

#[cfg(not(feature = "signaling-frame-debug"))]
#[macro_export]
macro_rules! frame_trace {
    ($sink:expr, $($arg:tt)*) => {
        $crate::sink_off!($sink, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use crate::log::{log_level::LogLevel, log_sink::LogSink};
    use std::sync::Mutex;
    #[cfg(not(feature = "log-trace"))]
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(LogLevel, String)>>);

    impl LogSink for Recorder {
        fn log(&self, level: LogLevel, msg: &str, _target: &'static str) {
            if let Ok(mut lines) = self.0.lock() {
                lines.push((level, msg.to_string()));
            }
        }
    }

    fn lines(sink: &Recorder) -> Vec<(LogLevel, String)> {
        sink.0.lock().map(|l| l.clone()).unwrap_or_default()
    }

    #[cfg(feature = "log-error")]
    #[test]
    fn enabled_level_reaches_sink() {
        let sink = Recorder::default();
        sink_error!(sink, "close({}) failed", 1000);
        assert_eq!(lines(&sink), [(LogLevel::Error, "close(1000) failed".to_string())]);
    }

    #[cfg(not(feature = "log-trace"))]
    #[test]
    fn disabled_level_never_formats_its_arguments() {
        let sink = Recorder::default();
        let calls = AtomicUsize::new(0);
        let expensive = || {
            calls.fetch_add(1, Ordering::Relaxed);
            "frame"
        };
        let only_logged = "kept for the log line";
        sink_trace!(sink, "{} {}", expensive(), only_logged);
        assert_eq!(calls.load(Ordering::Relaxed), 0);
        assert!(lines(&sink).is_empty());
    }
}
