#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

/// One capture or playback device as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device_id: String,
    /// Human readable name. Empty until the user granted media permission.
    pub label: String,
    pub kind: DeviceKind,
}

impl DeviceInfo {
    pub fn new(device_id: impl Into<String>, label: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            device_id: device_id.into(),
            label: label.into(),
            kind,
        }
    }

    /// Usable entries carry both an id and a label.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.device_id.is_empty() && !self.label.is_empty()
    }
}
