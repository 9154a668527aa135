use anyhow::Context;
use parkcore::interface::{Detection, DetectionClass, DetectionSet, Frame, VideoProperties};
use parkcore::math::BBox;
use parkcore::{DetectorAdapter, EngineConfig, FrameSource, ParkError, ParkResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Detector output captured offline, one entry per frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frames: Vec<RecordedFrame>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedFrame {
    #[serde(default)]
    pub empty_spots: Vec<RecordedDetection>,
    #[serde(default)]
    pub cars: Vec<RecordedDetection>,
    #[serde(default)]
    pub occupied: Vec<RecordedDetection>,
}

/// `bbox` is `[x, y, w, h]` in detector-resolution pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedDetection {
    pub bbox: [f32; 4],
    pub confidence: f32,
    pub label: String,
}

impl RecordedDetection {
    pub fn new(bbox: BBox, confidence: f32, class: DetectionClass) -> Self {
        Self {
            bbox: bbox.to_tlwh(),
            confidence,
            label: class.label().to_string(),
        }
    }

    fn to_detection(&self) -> Detection {
        let [x, y, w, h] = self.bbox;
        Detection::new(
            BBox::from_tlwh(x, y, w, h),
            self.confidence,
            DetectionClass::from_label(&self.label),
        )
    }
}

impl RecordedFrame {
    fn to_detection_set(&self) -> DetectionSet {
        let convert = |list: &[RecordedDetection]| -> Vec<Detection> {
            list.iter().map(RecordedDetection::to_detection).collect()
        };
        DetectionSet {
            empty_spots: convert(&self.empty_spots),
            cars: convert(&self.cars),
            occupied: convert(&self.occupied),
        }
    }
}

impl Recording {
    /// Opens a recording; anything unreadable is a source-open failure.
    pub fn load<P: AsRef<Path>>(path: P) -> ParkResult<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .map_err(|err| ParkError::SourceOpen(format!("{}: {}", path_ref.display(), err)))?;
        let recording: Recording = serde_json::from_str(&contents)
            .map_err(|err| ParkError::SourceOpen(format!("{}: {}", path_ref.display(), err)))?;
        if recording.width == 0 || recording.height == 0 {
            return Err(ParkError::SourceOpen(format!(
                "{}: zero frame size",
                path_ref.display()
            )));
        }
        Ok(recording)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serializing recording")?;
        fs::write(path_ref, json)
            .with_context(|| format!("writing recording {}", path_ref.display()))?;
        Ok(())
    }

    /// Splits the recording into a frame source and the matching detector.
    pub fn into_parts(self) -> (RecordingSource, RecordedDetector) {
        let source = RecordingSource {
            width: self.width,
            height: self.height,
            fps: self.fps,
            total: self.frames.len() as u64,
            next: 1,
        };
        let detector = RecordedDetector {
            frames: self.frames.iter().map(RecordedFrame::to_detection_set).collect(),
        };
        (source, detector)
    }
}

/// Yields blank frames at the recorded size and rate.
pub struct RecordingSource {
    width: u32,
    height: u32,
    fps: f64,
    total: u64,
    next: u64,
}

impl FrameSource for RecordingSource {
    fn properties(&self, config: &EngineConfig) -> VideoProperties {
        VideoProperties::new(
            self.width,
            self.height,
            self.fps,
            config.detection_width,
            config.detection_height,
        )
    }

    fn next_frame(&mut self) -> ParkResult<Option<Frame>> {
        if self.next > self.total {
            return Ok(None);
        }
        let frame = Frame::blank(self.next, self.width, self.height);
        self.next += 1;
        Ok(Some(frame))
    }
}

/// Returns the recorded detections for the requested frame.
pub struct RecordedDetector {
    frames: Vec<DetectionSet>,
}

impl DetectorAdapter for RecordedDetector {
    fn detect(&mut self, frame: &Frame) -> ParkResult<DetectionSet> {
        let slot = frame.index.checked_sub(1).and_then(|i| self.frames.get(i as usize));
        slot.cloned().ok_or_else(|| {
            ParkError::detector(format!("no recorded detections for frame {}", frame.index))
        })
    }
}
