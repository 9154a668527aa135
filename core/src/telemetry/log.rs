use crate::interface::SpotId;
use crate::processing::FrameReport;
use log::{debug, info, warn};

/// Log helper scoped to one video.
pub struct LogManager {
    video: String,
}

impl LogManager {
    pub fn for_video(video: impl Into<String>) -> Self {
        Self {
            video: video.into(),
        }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.video, message);
    }

    pub fn record_frame(&self, index: u64, injected: usize, report: &FrameReport) {
        for spot in &report.transitions.promoted {
            self.record_promotion(index, *spot);
        }
        debug!(
            "[{}] processed frame {}: empty {} occupied {} cars {} capacity {} (injected {})",
            self.video,
            index,
            report.smoothed.empty,
            report.smoothed.occupied,
            report.car_count,
            report.smoothed.capacity,
            injected
        );
    }

    pub fn record_promotion(&self, index: u64, spot: SpotId) {
        info!("[{}] frame {}: spot {} now occupied", self.video, index, spot);
    }

    pub fn record_failure(&self, frames_done: u64, error: &dyn std::error::Error) {
        warn!(
            "[{}] aborted after {} frames: {}",
            self.video, frames_done, error
        );
    }
}
