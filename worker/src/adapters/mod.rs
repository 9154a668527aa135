pub mod overlay_sink;
pub mod recording;
pub mod tracker;

pub use overlay_sink::JsonlOverlaySink;
pub use recording::Recording;
pub use tracker::IouTracker;
