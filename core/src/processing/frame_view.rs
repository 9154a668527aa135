use crate::interface::{DetectionClass, Track, TrackId};
use crate::math::{iou, BBox};
use crate::prelude::EngineConfig;
use log::debug;

/// A confirmed track as seen in the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub track_id: TrackId,
    pub bbox: BBox,
    pub confidence: f32,
}

/// Current-frame buckets built from confirmed tracks, in tracker order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameView {
    pub empty_spots: Vec<Observation>,
    pub cars: Vec<Observation>,
    pub occupied: Vec<Observation>,
}

impl FrameView {
    /// Partitions tracks by inherited label.
    ///
    /// Unconfirmed tracks and unknown labels are dropped. An empty-spot track
    /// overlapping an already accepted empty spot is a duplicate of that spot
    /// and is dropped too.
    pub fn from_tracks(tracks: &[Track], config: &EngineConfig) -> Self {
        let mut view = FrameView::default();
        for track in tracks.iter().filter(|track| track.confirmed) {
            let observation = Observation {
                track_id: track.id,
                bbox: track.bbox,
                confidence: track.confidence_or(config.default_track_confidence),
            };
            match track.class {
                DetectionClass::EmptySpot => {
                    let duplicate = view
                        .empty_spots
                        .iter()
                        .any(|accepted| iou(&accepted.bbox, &observation.bbox) > config.match_iou);
                    if duplicate {
                        debug!(
                            "dropping duplicate empty spot track {} (conf {:.2})",
                            observation.track_id, observation.confidence
                        );
                    } else {
                        view.empty_spots.push(observation);
                    }
                }
                DetectionClass::Car => view.cars.push(observation),
                DetectionClass::Occupied => view.occupied.push(observation),
                DetectionClass::Unknown => {}
            }
        }
        view
    }

    pub fn empty_spot(&self, track_id: TrackId) -> Option<&Observation> {
        self.empty_spots.iter().find(|obs| obs.track_id == track_id)
    }
}
