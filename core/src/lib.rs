//! Temporal occupancy reconciliation for parking-lot video.
//!
//! Detectors and trackers are pluggable collaborators; this crate turns their
//! noisy per-frame output into stable per-spot occupancy, smoothed counts and
//! a per-frame overlay for the renderer.

pub mod interface;
pub mod math;
pub mod pipeline;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use pipeline::{FrameOverlay, VideoProcessor, VideoSummary};
pub use prelude::{
    DetectorAdapter, EngineConfig, FrameSink, FrameSource, ParkError, ParkResult, Tracker,
};
