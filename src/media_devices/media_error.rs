use std::fmt;

/// Local capture failures. Carries the platform's own description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// Camera/microphone denied or unavailable.
    Access(String),
    /// Display capture denied, cancelled or unavailable.
    DisplayAccess(String),
    /// Device listing failed.
    Enumeration(String),
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access(e) => write!(f, "camera/microphone access failed: {e}"),
            Self::DisplayAccess(e) => write!(f, "screen capture failed: {e}"),
            Self::Enumeration(e) => write!(f, "device enumeration failed: {e}"),
        }
    }
}

impl std::error::Error for MediaError {}
