use crate::media_devices::{
    constraints::{DisplayConstraints, MediaConstraints},
    device_info::DeviceInfo,
    media_error::MediaError,
    media_stream::MediaStream,
};

/// Platform capture stack.
///
/// Calls may take arbitrarily long (permission prompts). Implementations
/// report failures as-is; the caller never retries on its own.
pub trait MediaBackend: Send {
    /// Lists every input/output device, labelled or not.
    ///
    /// # Errors
    ///
    /// [`MediaError::Enumeration`] when the platform refuses the listing.
    fn enumerate_devices(&mut self) -> Result<Vec<DeviceInfo>, MediaError>;

    /// Acquires camera and/or microphone tracks.
    ///
    /// # Errors
    ///
    /// [`MediaError::Access`] on denial or missing device.
    fn get_user_media(&mut self, constraints: &MediaConstraints) -> Result<MediaStream, MediaError>;

    /// Acquires a display-capture stream.
    ///
    /// # Errors
    ///
    /// [`MediaError::DisplayAccess`] on denial or cancellation.
    fn get_display_media(
        &mut self,
        constraints: &DisplayConstraints,
    ) -> Result<MediaStream, MediaError>;
}
