use crate::interface::{Detection, DetectionSet, Frame, Track, VideoProperties};
use crate::pipeline::FrameOverlay;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tunables shared by every reconciliation step of one video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Two boxes describe the same thing when their IoU is strictly above this.
    pub match_iou: f32,
    pub synthetic_confidence: f32,
    /// Used when the tracker reports no detection confidence for a track.
    pub default_track_confidence: f32,
    /// Seconds of sustained car overlap before an empty spot turns occupied.
    pub hysteresis_seconds: f64,
    pub history_capacity: usize,
    pub detection_width: u32,
    pub detection_height: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_iou: 0.5,
            synthetic_confidence: 0.7,
            default_track_confidence: 0.7,
            hysteresis_seconds: 0.5,
            history_capacity: 30,
            detection_width: 640,
            detection_height: 640,
        }
    }
}

impl EngineConfig {
    /// Consecutive overlapping frames required before promotion.
    ///
    /// Never below one, so a zero or fractional frame rate cannot promote a
    /// spot on a frame that shows no overlap at all.
    pub fn hysteresis_frames(&self, fps: f64) -> u32 {
        let frames = (fps * self.hysteresis_seconds).ceil();
        if frames.is_finite() && frames >= 1.0 {
            frames as u32
        } else {
            1
        }
    }
}

/// Common error type for per-video processing.
#[derive(thiserror::Error, Debug)]
pub enum ParkError {
    #[error("cannot open video source: {0}")]
    SourceOpen(String),
    #[error("cannot open video sink: {0}")]
    SinkOpen(String),
    #[error("detector failure: {0}")]
    Detector(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("tracker failure: {0}")]
    Tracker(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("sink write failure: {0}")]
    Sink(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ParkError {
    pub fn detector<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Detector(err.into())
    }

    pub fn tracker<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Tracker(err.into())
    }
}

pub type ParkResult<T> = Result<T, ParkError>;

/// Produces the three per-class detection sequences for one frame.
pub trait DetectorAdapter {
    fn detect(&mut self, frame: &Frame) -> ParkResult<DetectionSet>;
}

/// Multi-object tracker fed with every real and synthetic detection of a frame.
pub trait Tracker {
    fn update(&mut self, detections: &[Detection], frame: &Frame) -> ParkResult<Vec<Track>>;
}

/// Decoded video input. `Ok(None)` marks the end of the stream.
pub trait FrameSource {
    fn properties(&self, config: &EngineConfig) -> VideoProperties;
    fn next_frame(&mut self) -> ParkResult<Option<Frame>>;
}

/// Consumer of the per-frame overlay; owns drawing and encoding.
pub trait FrameSink {
    fn write(&mut self, frame: &Frame, overlay: &FrameOverlay) -> ParkResult<()>;
    /// Flushes the artifact and returns where it was written.
    fn finish(&mut self) -> ParkResult<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hysteresis_follows_frame_rate() {
        let config = EngineConfig::default();
        assert_eq!(config.hysteresis_frames(30.0), 15);
        assert_eq!(config.hysteresis_frames(25.0), 13);
        assert_eq!(config.hysteresis_frames(1.0), 1);
        assert_eq!(config.hysteresis_frames(0.0), 1);
        assert_eq!(config.hysteresis_frames(f64::NAN), 1);
    }
}
