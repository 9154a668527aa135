use crate::adapters::recording::{RecordedDetection, RecordedFrame, Recording};
use anyhow::Context;
use parkcore::interface::DetectionClass;
use parkcore::math::BBox;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A car pulling into spot `spot` (row-major index) at frame `frame`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Arrival {
    pub spot: usize,
    pub frame: usize,
}

/// Configuration for generating a synthetic lot recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LotConfig {
    pub rows: usize,
    pub columns: usize,
    pub spot_width: f32,
    pub spot_height: f32,
    pub margin: f32,
    pub frames: usize,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub arrivals: Vec<Arrival>,
    /// Frames during which an arriving car and the spot are both visible.
    pub settle_frames: usize,
    /// Max absolute box jitter, in detector pixels.
    pub jitter: f32,
    /// Probability that the detector misses any single object.
    pub dropout: f64,
    pub seed: u64,
}

impl Default for LotConfig {
    fn default() -> Self {
        Self {
            rows: 2,
            columns: 5,
            spot_width: 48.0,
            spot_height: 96.0,
            margin: 16.0,
            frames: 120,
            fps: 30.0,
            width: 1920,
            height: 1080,
            arrivals: vec![Arrival { spot: 0, frame: 10 }, Arrival { spot: 6, frame: 40 }],
            settle_frames: 30,
            jitter: 1.0,
            dropout: 0.05,
            seed: 0,
        }
    }
}

impl LotConfig {
    fn spot_count(&self) -> usize {
        self.rows.max(1) * self.columns.max(1)
    }

    fn spot_box(&self, index: usize) -> BBox {
        let columns = self.columns.max(1);
        let (row, column) = (index / columns, index % columns);
        let x = self.margin + column as f32 * (self.spot_width + self.margin);
        let y = self.margin + row as f32 * (self.spot_height + self.margin);
        BBox::from_tlwh(x, y, self.spot_width, self.spot_height)
    }
}

fn jittered(rng: &mut StdRng, bbox: BBox, jitter: f32) -> BBox {
    if jitter <= 0.0 {
        return bbox;
    }
    let mut shift = || rng.gen_range(-jitter..jitter);
    BBox::new(bbox.x1 + shift(), bbox.y1 + shift(), bbox.x2 + shift(), bbox.y2 + shift())
}

fn seen(rng: &mut StdRng, dropout: f64) -> bool {
    dropout <= 0.0 || !rng.gen_bool(dropout.min(1.0))
}

pub fn build_recording(config: &LotConfig) -> anyhow::Result<Recording> {
    let spots = config.spot_count();
    if let Some(bad) = config.arrivals.iter().find(|a| a.spot >= spots) {
        anyhow::bail!("arrival targets spot {} but the lot has {}", bad.spot, spots);
    }
    let capacity = config
        .frames
        .checked_mul(spots)
        .context("overflow computing detection count for generator")?;
    log::debug!("generating {} frames, up to {} detections per class", config.frames, capacity);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut frames = Vec::with_capacity(config.frames);

    for frame_index in 1..=config.frames {
        let mut frame = RecordedFrame::default();
        for spot in 0..spots {
            let spot_box = config.spot_box(spot);
            let arrived = config
                .arrivals
                .iter()
                .filter(|a| a.spot == spot && a.frame <= frame_index)
                .map(|a| frame_index - a.frame)
                .min();

            let spot_visible = arrived.map_or(true, |since| since < config.settle_frames);
            if spot_visible && seen(&mut rng, config.dropout) {
                frame.empty_spots.push(RecordedDetection::new(
                    jittered(&mut rng, spot_box, config.jitter),
                    rng.gen_range(0.4..0.9),
                    DetectionClass::EmptySpot,
                ));
            }

            if let Some(since) = arrived {
                if seen(&mut rng, config.dropout) {
                    frame.cars.push(RecordedDetection::new(
                        jittered(&mut rng, spot_box, config.jitter),
                        rng.gen_range(0.6..0.99),
                        DetectionClass::Car,
                    ));
                }
                if since >= config.settle_frames && seen(&mut rng, config.dropout) {
                    frame.occupied.push(RecordedDetection::new(
                        jittered(&mut rng, spot_box, config.jitter),
                        rng.gen_range(0.2..0.8),
                        DetectionClass::Occupied,
                    ));
                }
            }
        }
        frames.push(frame);
    }

    Ok(Recording {
        width: config.width,
        height: config.height,
        fps: config.fps,
        frames,
    })
}
