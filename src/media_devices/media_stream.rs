use crate::media_devices::media_track::{MediaTrack, TrackKind};

/// A group of tracks captured or received together.
#[derive(Debug, Clone)]
pub struct MediaStream {
    id: String,
    tracks: Vec<MediaTrack>,
}

impl MediaStream {
    pub fn new(id: impl Into<String>, tracks: Vec<MediaTrack>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }

    pub fn empty(id: impl Into<String>) -> Self {
        Self::new(id, Vec::new())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn audio_track(&self) -> Option<&MediaTrack> {
        self.first_of(TrackKind::Audio)
    }

    #[must_use]
    pub fn video_track(&self) -> Option<&MediaTrack> {
        self.first_of(TrackKind::Video)
    }

    fn first_of(&self, kind: TrackKind) -> Option<&MediaTrack> {
        self.tracks.iter().find(|t| t.kind() == kind)
    }

    pub fn stop_all(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }

    /// True once every track has ended (an empty stream is never "ended").
    #[must_use]
    pub fn all_ended(&self) -> bool {
        !self.tracks.is_empty() && self.tracks.iter().all(|t| !t.is_live())
    }
}
