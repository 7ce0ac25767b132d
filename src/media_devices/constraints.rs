/// Microphone request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioConstraints {
    /// Exact-match device id; `None` lets the platform pick.
    pub device_id: Option<String>,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub sample_rate: u32,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            device_id: None,
            echo_cancellation: true,
            noise_suppression: true,
            sample_rate: 48_000,
        }
    }
}

/// Camera or display request. Dimensions and rate are "ideal" values, the
/// platform may deliver something else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoConstraints {
    pub device_id: Option<String>,
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl VideoConstraints {
    #[must_use]
    pub fn camera() -> Self {
        Self {
            device_id: None,
            width: 1280,
            height: 720,
            frame_rate: 30,
        }
    }

    #[must_use]
    pub fn display() -> Self {
        Self {
            device_id: None,
            width: 1920,
            height: 1080,
            frame_rate: 30,
        }
    }
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self::camera()
    }
}

/// Camera/microphone request. A `None` side is not acquired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: Option<AudioConstraints>,
    pub video: Option<VideoConstraints>,
}

impl MediaConstraints {
    /// Defaults used when entering a room.
    #[must_use]
    pub fn combined(audio: bool, video: bool) -> Self {
        Self {
            audio: audio.then(AudioConstraints::default),
            video: video.then(VideoConstraints::camera),
        }
    }

    #[must_use]
    pub fn requests_nothing(&self) -> bool {
        self.audio.is_none() && self.video.is_none()
    }

    /// Pins each requested side to the selected device. A selection
    /// overrides whatever device id the caller put in.
    #[must_use]
    pub fn with_selected_devices(mut self, audio_id: Option<&str>, video_id: Option<&str>) -> Self {
        if let (Some(audio), Some(id)) = (self.audio.as_mut(), audio_id) {
            audio.device_id = Some(id.to_string());
        }
        if let (Some(video), Some(id)) = (self.video.as_mut(), video_id) {
            video.device_id = Some(id.to_string());
        }
        self
    }
}

/// Display-capture request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConstraints {
    pub video: VideoConstraints,
    pub audio: bool,
}

impl Default for DisplayConstraints {
    fn default() -> Self {
        Self {
            video: VideoConstraints::display(),
            audio: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_defaults() {
        let c = MediaConstraints::combined(true, true);
        let audio = c.audio.as_ref().map(|a| (a.echo_cancellation, a.noise_suppression, a.sample_rate));
        assert_eq!(audio, Some((true, true, 48_000)));
        let video = c.video.as_ref().map(|v| (v.width, v.height, v.frame_rate));
        assert_eq!(video, Some((1280, 720, 30)));

        assert!(MediaConstraints::combined(false, false).requests_nothing());
    }

    #[test]
    fn selected_devices_only_pin_requested_sides() {
        let c = MediaConstraints::combined(true, false).with_selected_devices(Some("mic-2"), Some("cam-1"));
        assert_eq!(c.audio.and_then(|a| a.device_id).as_deref(), Some("mic-2"));
        assert!(c.video.is_none());
    }

    #[test]
    fn display_is_full_hd_with_audio() {
        let d = DisplayConstraints::default();
        assert_eq!((d.video.width, d.video.height, d.video.frame_rate), (1920, 1080, 30));
        assert!(d.audio);
    }
}
