use crate::interface::{DetectionSet, SpotId, Track, VideoProperties};
use crate::math::BBox;
use crate::prelude::EngineConfig;
use crate::processing::frame_view::FrameView;
use crate::processing::injection::inject_persistent_occupancy;
use crate::processing::occupancy::{OccupancyMachine, Transitions};
use crate::processing::smoother::{SmoothedCounts, TemporalSmoother};
use std::collections::BTreeMap;

/// Outcome of reconciling one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub transitions: Transitions,
    pub smoothed: SmoothedCounts,
    /// Raw, unsmoothed car count of this frame.
    pub car_count: usize,
    pub current_empty: usize,
}

/// Per-video reconciliation state. Created at the first frame, dropped with the video.
pub struct FrameState {
    config: EngineConfig,
    occupancy: OccupancyMachine,
    smoother: TemporalSmoother,
    frames: u64,
}

impl FrameState {
    pub fn new(config: EngineConfig, properties: &VideoProperties) -> Self {
        let hysteresis = config.hysteresis_frames(properties.fps);
        Self {
            occupancy: OccupancyMachine::new(config.match_iou, hysteresis),
            smoother: TemporalSmoother::with_window(config.history_capacity),
            config,
            frames: 0,
        }
    }

    /// Adds synthetic occupied detections ahead of tracking.
    pub fn inject(&self, detections: &mut DetectionSet) -> usize {
        inject_persistent_occupancy(self.occupancy.known_occupied(), detections, &self.config)
    }

    /// Folds this frame's tracks into the persistent state.
    pub fn reconcile(&mut self, tracks: &[Track]) -> FrameReport {
        self.frames += 1;
        let view = FrameView::from_tracks(tracks, &self.config);
        let transitions = self.occupancy.advance(&view);
        let smoothed = self
            .smoother
            .record(view.empty_spots.len(), self.occupancy.known_occupied().len());

        FrameReport {
            transitions,
            smoothed,
            car_count: view.cars.len(),
            current_empty: view.empty_spots.len(),
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn empty_spots(&self) -> &BTreeMap<SpotId, BBox> {
        self.occupancy.known_empty()
    }

    pub fn occupied_spots(&self) -> &BTreeMap<SpotId, BBox> {
        self.occupancy.known_occupied()
    }

    pub fn smoothed(&self) -> SmoothedCounts {
        self.smoother.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::DetectionClass;

    fn track(id: u64, bbox: BBox, class: DetectionClass) -> Track {
        Track {
            id,
            bbox,
            class,
            confidence: Some(0.8),
            confirmed: true,
        }
    }

    #[test]
    fn hysteresis_follows_frame_rate() {
        let props = VideoProperties::new(640, 640, 30.0, 640, 640);
        let mut state = FrameState::new(EngineConfig::default(), &props);
        let spot = BBox::new(0.0, 0.0, 10.0, 20.0);
        let car = BBox::new(0.0, 1.0, 10.0, 21.0);
        let tracks = vec![
            track(1, spot, DetectionClass::EmptySpot),
            track(2, car, DetectionClass::Car),
        ];

        for _ in 0..14 {
            state.reconcile(&tracks);
        }
        assert!(state.occupied_spots().is_empty());
        let report = state.reconcile(&tracks);
        assert_eq!(report.transitions.promoted, vec![SpotId::Natural(1)]);
        assert_eq!(report.car_count, 1);
        assert_eq!(state.frames(), 15);
    }

    #[test]
    fn smoother_samples_current_empty_and_known_occupied() {
        let props = VideoProperties::new(640, 640, 2.0, 640, 640);
        let mut state = FrameState::new(EngineConfig::default(), &props);
        let tracks = vec![
            track(1, BBox::new(0.0, 0.0, 10.0, 10.0), DetectionClass::EmptySpot),
            track(2, BBox::new(20.0, 0.0, 30.0, 10.0), DetectionClass::EmptySpot),
            track(3, BBox::new(100.0, 0.0, 110.0, 10.0), DetectionClass::Occupied),
        ];
        let report = state.reconcile(&tracks);
        assert_eq!(report.current_empty, 2);
        assert_eq!(report.smoothed.empty, 2);
        assert_eq!(report.smoothed.occupied, 1);
        assert_eq!(report.smoothed.capacity, 3);
    }

    #[test]
    fn injection_uses_occupied_spots() {
        let props = VideoProperties::new(640, 640, 2.0, 640, 640);
        let mut state = FrameState::new(EngineConfig::default(), &props);
        let occupied = BBox::new(100.0, 0.0, 110.0, 10.0);
        state.reconcile(&[track(3, occupied, DetectionClass::Occupied)]);

        // synthetic `direct_` spots are not re-injected
        let mut detections = DetectionSet::default();
        assert_eq!(state.inject(&mut detections), 0);
    }
}
