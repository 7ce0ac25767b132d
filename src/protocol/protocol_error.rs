use std::fmt;

/// Failure to encode or decode one signaling frame.
#[derive(Debug)]
pub enum ProtocolError {
    /// The frame is not valid JSON or does not match the variant's shape.
    Json(serde_json::Error),
    /// The frame is JSON but not an object.
    NotAnObject,
    /// The object has no string `type` discriminator.
    MissingType,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "malformed signaling frame: {e}"),
            Self::NotAnObject => write!(f, "signaling frame is not a JSON object"),
            Self::MissingType => write!(f, "signaling frame has no `type` field"),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
