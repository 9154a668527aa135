use crate::interface::{SpotId, VideoProperties};
use crate::math::BBox;
use crate::processing::{FrameReport, FrameState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the renderer needs for one frame, in native coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOverlay {
    pub frame_index: u64,
    /// Known-empty spots that are not occupied.
    pub empty_spots: BTreeMap<SpotId, BBox>,
    pub occupied_spots: BTreeMap<SpotId, BBox>,
    pub empty_count: usize,
    pub occupied_count: usize,
    pub car_count: usize,
    pub capacity: usize,
}

impl FrameOverlay {
    pub fn build(
        frame_index: u64,
        state: &FrameState,
        report: &FrameReport,
        properties: &VideoProperties,
    ) -> Self {
        let scale = |bbox: &BBox| bbox.scaled(properties.scale_x, properties.scale_y);
        let occupied = state.occupied_spots();
        let empty_spots = state
            .empty_spots()
            .iter()
            .filter(|(id, _)| !occupied.contains_key(*id))
            .map(|(id, bbox)| (*id, scale(bbox)))
            .collect();
        let occupied_spots = occupied.iter().map(|(id, bbox)| (*id, scale(bbox))).collect();

        Self {
            frame_index,
            empty_spots,
            occupied_spots,
            empty_count: report.smoothed.empty,
            occupied_count: report.smoothed.occupied,
            car_count: report.car_count,
            capacity: report.smoothed.capacity,
        }
    }
}
