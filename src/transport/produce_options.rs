use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;

use crate::{
    media_devices::MediaTrack,
    protocol::types::MediaKind,
    transport::constants::{
        SCREEN_SOURCE, SIMULCAST_MAX_BITRATES_BPS, SIMULCAST_SCALABILITY_MODE,
        SIMULCAST_SCALE_DOWN,
    },
};

/// What a local producer carries. At most one producer per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProducerSlot {
    Audio,
    Video,
    Screen,
}

impl ProducerSlot {
    #[must_use]
    pub fn kind(self) -> MediaKind {
        match self {
            Self::Audio => MediaKind::Audio,
            Self::Video | Self::Screen => MediaKind::Video,
        }
    }

    #[must_use]
    pub fn app_data(self) -> Option<Value> {
        match self {
            Self::Screen => Some(json!({ "source": SCREEN_SOURCE })),
            Self::Audio | Self::Video => None,
        }
    }

    /// Slot of a `producer_created` reply: screen is a video producer whose
    /// appData says so.
    #[must_use]
    pub fn from_reply(kind: MediaKind, app_data: Option<&Value>) -> Self {
        let is_screen = app_data
            .and_then(|d| d.get("source"))
            .and_then(Value::as_str)
            == Some(SCREEN_SOURCE);
        match kind {
            MediaKind::Audio => Self::Audio,
            MediaKind::Video if is_screen => Self::Screen,
            MediaKind::Video => Self::Video,
        }
    }
}

impl fmt::Display for ProducerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => f.write_str("audio"),
            Self::Video => f.write_str("video"),
            Self::Screen => f.write_str("screen"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpEncoding {
    pub max_bitrate: u32,
    pub scalability_mode: String,
    pub scale_resolution_down_by: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodecOptions {
    pub opus_stereo: bool,
    pub opus_dtx: bool,
}

/// Three layers, quarter / half / full resolution.
#[must_use]
pub fn simulcast_encodings() -> Vec<RtpEncoding> {
    SIMULCAST_MAX_BITRATES_BPS
        .iter()
        .zip(SIMULCAST_SCALE_DOWN)
        .map(|(&max_bitrate, scale)| RtpEncoding {
            max_bitrate,
            scalability_mode: SIMULCAST_SCALABILITY_MODE.to_string(),
            scale_resolution_down_by: scale,
        })
        .collect()
}

/// Everything the local transport needs to start sending one track.
#[derive(Debug, Clone)]
pub struct ProduceOptions {
    pub slot: ProducerSlot,
    pub track: MediaTrack,
    pub encodings: Vec<RtpEncoding>,
    pub codec_options: Option<CodecOptions>,
    pub app_data: Option<Value>,
}

impl ProduceOptions {
    pub fn audio(track: MediaTrack) -> Self {
        Self {
            slot: ProducerSlot::Audio,
            track,
            encodings: Vec::new(),
            codec_options: Some(CodecOptions {
                opus_stereo: true,
                opus_dtx: true,
            }),
            app_data: None,
        }
    }

    pub fn video(track: MediaTrack, simulcast: bool) -> Self {
        Self {
            slot: ProducerSlot::Video,
            track,
            encodings: if simulcast {
                simulcast_encodings()
            } else {
                Vec::new()
            },
            codec_options: None,
            app_data: None,
        }
    }

    pub fn screen(track: MediaTrack) -> Self {
        Self {
            slot: ProducerSlot::Screen,
            track,
            encodings: Vec::new(),
            codec_options: None,
            app_data: ProducerSlot::Screen.app_data(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> MediaKind {
        self.slot.kind()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::media_devices::TrackKind;

    #[test]
    fn simulcast_layers_serialize_camel_case() {
        let v = serde_json::to_value(simulcast_encodings()).unwrap();
        assert_eq!(
            v,
            json!([
                {"maxBitrate": 100000, "scalabilityMode": "L1T3", "scaleResolutionDownBy": 4.0},
                {"maxBitrate": 300000, "scalabilityMode": "L1T3", "scaleResolutionDownBy": 2.0},
                {"maxBitrate": 900000, "scalabilityMode": "L1T3", "scaleResolutionDownBy": 1.0}
            ])
        );
    }

    #[test]
    fn slot_from_reply_uses_app_data_source() {
        let screen = json!({"source": "screen"});
        let other = json!({"source": "camera"});
        assert_eq!(ProducerSlot::from_reply(MediaKind::Video, Some(&screen)), ProducerSlot::Screen);
        assert_eq!(ProducerSlot::from_reply(MediaKind::Video, Some(&other)), ProducerSlot::Video);
        assert_eq!(ProducerSlot::from_reply(MediaKind::Video, None), ProducerSlot::Video);
        assert_eq!(ProducerSlot::from_reply(MediaKind::Audio, Some(&screen)), ProducerSlot::Audio);
    }

    #[test]
    fn video_without_simulcast_has_no_layers() {
        let track = MediaTrack::new("v", TrackKind::Video, "cam");
        assert!(ProduceOptions::video(track.clone(), false).encodings.is_empty());
        assert_eq!(ProduceOptions::video(track, true).encodings.len(), 3);
    }
}
