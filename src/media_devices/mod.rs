//! Local capture: device listing, selection, camera/microphone and display
//! acquisition through a platform [`MediaBackend`].
pub mod constraints;
pub mod device_info;
pub mod device_negotiator;
pub mod media_backend;
pub mod media_error;
pub mod media_stream;
pub mod media_track;

pub use constraints::{AudioConstraints, DisplayConstraints, MediaConstraints, VideoConstraints};
pub use device_info::{DeviceInfo, DeviceKind};
pub use device_negotiator::{DeviceNegotiator, DeviceSelection};
pub use media_backend::MediaBackend;
pub use media_error::MediaError;
pub use media_stream::MediaStream;
pub use media_track::{MediaTrack, ReadyState, TrackKind};
