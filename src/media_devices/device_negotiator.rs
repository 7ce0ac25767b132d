use std::sync::Arc;

use crate::{
    log::log_sink::LogSink,
    media_devices::{
        constraints::{DisplayConstraints, MediaConstraints},
        device_info::{DeviceInfo, DeviceKind},
        media_backend::MediaBackend,
        media_error::MediaError,
        media_stream::MediaStream,
    },
    sink_debug, sink_info, sink_warn,
};

/// Devices the user picked. Applied on the next acquisition only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSelection {
    pub video_input: Option<String>,
    pub audio_input: Option<String>,
    pub audio_output: Option<String>,
}

impl DeviceSelection {
    fn slot_mut(&mut self, kind: DeviceKind) -> &mut Option<String> {
        match kind {
            DeviceKind::VideoInput => &mut self.video_input,
            DeviceKind::AudioInput => &mut self.audio_input,
            DeviceKind::AudioOutput => &mut self.audio_output,
        }
    }
}

/// Owns the platform capture backend, the device list, the current
/// selection and the local camera/microphone stream.
pub struct DeviceNegotiator {
    backend: Box<dyn MediaBackend>,
    devices: Vec<DeviceInfo>,
    selection: DeviceSelection,
    local_stream: Option<MediaStream>,
    logger: Arc<dyn LogSink>,
}

impl DeviceNegotiator {
    pub fn new(backend: Box<dyn MediaBackend>, logger: Arc<dyn LogSink>) -> Self {
        Self {
            backend,
            devices: Vec::new(),
            selection: DeviceSelection::default(),
            local_stream: None,
            logger,
        }
    }

    /// Refreshes the device list, keeping only labelled entries. The first
    /// device of each kind becomes the selection when nothing is selected.
    ///
    /// # Errors
    ///
    /// Propagates the backend's [`MediaError::Enumeration`].
    pub fn enumerate_devices(&mut self) -> Result<&[DeviceInfo], MediaError> {
        let all = self.backend.enumerate_devices()?;
        let total = all.len();
        self.devices = all.into_iter().filter(DeviceInfo::is_usable).collect();

        for kind in [
            DeviceKind::VideoInput,
            DeviceKind::AudioInput,
            DeviceKind::AudioOutput,
        ] {
            let first = self
                .devices
                .iter()
                .find(|d| d.kind == kind)
                .map(|d| d.device_id.clone());
            let slot = self.selection.slot_mut(kind);
            if slot.is_none() {
                *slot = first;
            }
        }

        sink_debug!(
            self.logger,
            "[Devices] {} usable of {} reported",
            self.devices.len(),
            total
        );
        Ok(&self.devices)
    }

    #[must_use]
    pub fn devices(&self) -> &[DeviceInfo] {
        &self.devices
    }

    #[must_use]
    pub fn selection(&self) -> &DeviceSelection {
        &self.selection
    }

    pub fn select_video_input(&mut self, device_id: impl Into<String>) {
        self.selection.video_input = Some(device_id.into());
    }

    pub fn select_audio_input(&mut self, device_id: impl Into<String>) {
        self.selection.audio_input = Some(device_id.into());
    }

    pub fn select_audio_output(&mut self, device_id: impl Into<String>) {
        self.selection.audio_output = Some(device_id.into());
    }

    /// Acquires camera/microphone with the selected devices pinned.
    /// Never retries.
    ///
    /// # Errors
    ///
    /// [`MediaError::Access`] with the platform's reason.
    pub fn get_user_media(&mut self, constraints: MediaConstraints) -> Result<MediaStream, MediaError> {
        let constraints = constraints.with_selected_devices(
            self.selection.audio_input.as_deref(),
            self.selection.video_input.as_deref(),
        );
        match self.backend.get_user_media(&constraints) {
            Ok(stream) => Ok(stream),
            Err(e) => {
                sink_warn!(self.logger, "[Devices] getUserMedia failed: {}", e);
                Err(e)
            }
        }
    }

    /// Replaces the local stream with a fresh acquisition. The previous
    /// stream's tracks are stopped first.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_user_media`]; on failure no local stream is held.
    pub fn initialize_local_stream(&mut self, audio: bool, video: bool) -> Result<MediaStream, MediaError> {
        self.stop_local_stream();

        let constraints = MediaConstraints::combined(audio, video);
        let stream = if constraints.requests_nothing() {
            MediaStream::empty("local")
        } else {
            self.get_user_media(constraints)?
        };

        sink_info!(
            self.logger,
            "[Devices] local stream {} ready with {} track(s)",
            stream.id(),
            stream.tracks().len()
        );
        self.local_stream = Some(stream.clone());
        Ok(stream)
    }

    /// # Errors
    ///
    /// [`MediaError::DisplayAccess`] when the user cancels or capture is
    /// unavailable.
    pub fn get_display_media(&mut self) -> Result<MediaStream, MediaError> {
        self.backend.get_display_media(&Self::display_constraints())
    }

    #[must_use]
    pub fn display_constraints() -> DisplayConstraints {
        DisplayConstraints::default()
    }

    #[must_use]
    pub fn local_stream(&self) -> Option<&MediaStream> {
        self.local_stream.as_ref()
    }

    /// Stops every local track and forgets the stream. Idempotent.
    pub fn stop_local_stream(&mut self) {
        if let Some(stream) = self.local_stream.take() {
            stream.stop_all();
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::{
        log::NoopLogSink,
        media_devices::media_track::{MediaTrack, TrackKind},
    };
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorded {
        constraints: Vec<MediaConstraints>,
    }

    struct StubBackend {
        devices: Vec<DeviceInfo>,
        deny: bool,
        recorded: Arc<Mutex<Recorded>>,
    }

    impl MediaBackend for StubBackend {
        fn enumerate_devices(&mut self) -> Result<Vec<DeviceInfo>, MediaError> {
            Ok(self.devices.clone())
        }

        fn get_user_media(&mut self, c: &MediaConstraints) -> Result<MediaStream, MediaError> {
            self.recorded.lock().unwrap().constraints.push(c.clone());
            if self.deny {
                return Err(MediaError::Access("NotAllowedError".into()));
            }
            let mut tracks = Vec::new();
            if c.audio.is_some() {
                tracks.push(MediaTrack::new("a", TrackKind::Audio, "mic"));
            }
            if c.video.is_some() {
                tracks.push(MediaTrack::new("v", TrackKind::Video, "cam"));
            }
            Ok(MediaStream::new("cam-stream", tracks))
        }

        fn get_display_media(&mut self, _: &DisplayConstraints) -> Result<MediaStream, MediaError> {
            Err(MediaError::DisplayAccess("cancelled".into()))
        }
    }

    fn negotiator(deny: bool) -> (DeviceNegotiator, Arc<Mutex<Recorded>>) {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let backend = StubBackend {
            devices: vec![
                DeviceInfo::new("", "ghost", DeviceKind::VideoInput),
                DeviceInfo::new("cam-1", "", DeviceKind::VideoInput),
                DeviceInfo::new("cam-2", "USB Camera", DeviceKind::VideoInput),
                DeviceInfo::new("mic-1", "Headset", DeviceKind::AudioInput),
                DeviceInfo::new("mic-2", "Array", DeviceKind::AudioInput),
            ],
            deny,
            recorded: recorded.clone(),
        };
        (
            DeviceNegotiator::new(Box::new(backend), Arc::new(NoopLogSink)),
            recorded,
        )
    }

    #[test]
    fn enumeration_drops_unlabelled_and_selects_first_of_each_kind() {
        let (mut n, _) = negotiator(false);
        let ids: Vec<_> = n
            .enumerate_devices()
            .unwrap()
            .iter()
            .map(|d| d.device_id.clone())
            .collect();
        assert_eq!(ids, ["cam-2", "mic-1", "mic-2"]);
        assert_eq!(n.selection().video_input.as_deref(), Some("cam-2"));
        assert_eq!(n.selection().audio_input.as_deref(), Some("mic-1"));
        assert_eq!(n.selection().audio_output, None);
    }

    #[test]
    fn enumeration_keeps_existing_selection() {
        let (mut n, _) = negotiator(false);
        n.select_audio_input("mic-2");
        n.enumerate_devices().unwrap();
        assert_eq!(n.selection().audio_input.as_deref(), Some("mic-2"));
    }

    #[test]
    fn acquisition_pins_selected_devices() {
        let (mut n, rec) = negotiator(false);
        n.enumerate_devices().unwrap();
        n.select_video_input("cam-9");
        n.initialize_local_stream(true, true).unwrap();

        let c = rec.lock().unwrap().constraints[0].clone();
        assert_eq!(c.video.unwrap().device_id.as_deref(), Some("cam-9"));
        assert_eq!(c.audio.unwrap().device_id.as_deref(), Some("mic-1"));
    }

    #[test]
    fn reinitializing_stops_previous_tracks() {
        let (mut n, _) = negotiator(false);
        let first = n.initialize_local_stream(true, true).unwrap();
        n.initialize_local_stream(true, false).unwrap();

        assert!(first.all_ended());
        let current = n.local_stream().unwrap();
        assert!(current.audio_track().is_some_and(MediaTrack::is_live));
        assert!(current.video_track().is_none());
    }

    #[test]
    fn denied_access_leaves_no_stream() {
        let (mut n, _) = negotiator(true);
        let err = n.initialize_local_stream(true, true).unwrap_err();
        assert_eq!(err, MediaError::Access("NotAllowedError".into()));
        assert!(n.local_stream().is_none());
    }

    #[test]
    fn nothing_requested_means_no_backend_call() {
        let (mut n, rec) = negotiator(true);
        let stream = n.initialize_local_stream(false, false).unwrap();
        assert!(stream.is_empty());
        assert!(rec.lock().unwrap().constraints.is_empty());
    }
}
