pub mod detection;
pub mod video;

pub use detection::{Detection, DetectionClass, DetectionSet, SpotId, Track, TrackId};
pub use video::{Frame, VideoProperties};
