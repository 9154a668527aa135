pub mod overlay;
pub mod processor;

pub use overlay::FrameOverlay;
pub use processor::{VideoProcessor, VideoSummary};
