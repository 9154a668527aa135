use parkcore::interface::{Detection, DetectionClass, Frame, Track, TrackId};
use parkcore::math::{iou, BBox};
use parkcore::{ParkResult, Tracker};
use serde::{Deserialize, Serialize};

/// Parameters for the IoU tracker.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Frames a confirmed track survives without a matching detection.
    pub max_age: u32,
    /// Consecutive hits before a track is confirmed.
    pub n_init: u32,
    /// Minimum IoU for associating a detection with an existing track.
    pub iou_threshold: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_age: 100,
            n_init: 3,
            iou_threshold: 0.3,
        }
    }
}

struct TrackEntry {
    id: TrackId,
    bbox: BBox,
    class: DetectionClass,
    confidence: f32,
    hits: u32,
    misses: u32,
    confirmed: bool,
}

/// Greedy IoU tracker standing in for an appearance-based tracker.
///
/// Detections only associate with tracks of the same class. Each frame reports
/// every live track: those matched or created by the frame's detections, plus
/// confirmed tracks coasting on their last box for up to `max_age` misses.
pub struct IouTracker {
    config: TrackerConfig,
    entries: Vec<TrackEntry>,
    next_id: TrackId,
}

impl IouTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            next_id: 1,
        }
    }

    pub fn live_tracks(&self) -> usize {
        self.entries.len()
    }

    fn associate(&self, detections: &[Detection]) -> Vec<(usize, usize)> {
        let mut candidates = Vec::new();
        for (entry_idx, entry) in self.entries.iter().enumerate() {
            for (det_idx, det) in detections.iter().enumerate() {
                if det.class != entry.class {
                    continue;
                }
                let overlap = iou(&entry.bbox, &det.bbox);
                if overlap >= self.config.iou_threshold {
                    candidates.push((overlap, entry_idx, det_idx));
                }
            }
        }
        candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut entry_used = vec![false; self.entries.len()];
        let mut det_used = vec![false; detections.len()];
        let mut pairs = Vec::new();
        for (_, entry_idx, det_idx) in candidates {
            if entry_used[entry_idx] || det_used[det_idx] {
                continue;
            }
            entry_used[entry_idx] = true;
            det_used[det_idx] = true;
            pairs.push((entry_idx, det_idx));
        }
        pairs
    }
}

impl Tracker for IouTracker {
    fn update(&mut self, detections: &[Detection], _frame: &Frame) -> ParkResult<Vec<Track>> {
        let pairs = self.associate(detections);
        let mut det_matched = vec![false; detections.len()];
        let mut entry_matched = vec![false; self.entries.len()];

        for (entry_idx, det_idx) in pairs {
            let det = &detections[det_idx];
            let entry = &mut self.entries[entry_idx];
            entry.bbox = det.bbox;
            entry.confidence = det.confidence;
            entry.hits += 1;
            entry.misses = 0;
            if entry.hits >= self.config.n_init {
                entry.confirmed = true;
            }
            det_matched[det_idx] = true;
            entry_matched[entry_idx] = true;
        }

        for (entry, matched) in self.entries.iter_mut().zip(&entry_matched) {
            if !matched {
                entry.misses += 1;
            }
        }

        // tentative tracks die on their first miss, confirmed ones coast until max_age
        let max_age = self.config.max_age;
        self.entries
            .retain(|entry| entry.misses == 0 || (entry.confirmed && entry.misses <= max_age));

        for (det, _) in detections.iter().zip(&det_matched).filter(|(_, m)| !**m) {
            let id = self.next_id;
            self.next_id += 1;
            self.entries.push(TrackEntry {
                id,
                bbox: det.bbox,
                class: det.class,
                confidence: det.confidence,
                hits: 1,
                misses: 0,
                confirmed: self.config.n_init <= 1,
            });
        }

        Ok(self
            .entries
            .iter()
            .map(|entry| Track {
                id: entry.id,
                bbox: entry.bbox,
                class: entry.class,
                confidence: Some(entry.confidence),
                confirmed: entry.confirmed,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(bbox: BBox, class: DetectionClass) -> Detection {
        Detection::new(bbox, 0.8, class)
    }

    fn frame() -> Frame {
        Frame::blank(1, 640, 640)
    }

    #[test]
    fn track_confirms_after_n_init_hits() {
        let mut tracker = IouTracker::new(TrackerConfig::default());
        let spot = det(BBox::new(0.0, 0.0, 10.0, 20.0), DetectionClass::EmptySpot);

        let first = tracker.update(&[spot.clone()], &frame()).unwrap();
        let second = tracker.update(&[spot.clone()], &frame()).unwrap();
        let third = tracker.update(&[spot], &frame()).unwrap();

        assert!(!first[0].confirmed);
        assert!(!second[0].confirmed);
        assert!(third[0].confirmed);
        assert_eq!(first[0].id, third[0].id);
        assert_eq!(third[0].class, DetectionClass::EmptySpot);
    }

    #[test]
    fn classes_do_not_share_tracks() {
        let config = TrackerConfig {
            n_init: 1,
            ..Default::default()
        };
        let mut tracker = IouTracker::new(config);
        let bbox = BBox::new(0.0, 0.0, 10.0, 20.0);
        tracker
            .update(&[det(bbox, DetectionClass::EmptySpot)], &frame())
            .unwrap();
        let tracks = tracker
            .update(&[det(bbox, DetectionClass::Car)], &frame())
            .unwrap();
        assert_eq!(tracks.len(), 2);
        let car = tracks.iter().find(|t| t.class == DetectionClass::Car).unwrap();
        assert_eq!(car.id, 2);
        let spot = tracks.iter().find(|t| t.class == DetectionClass::EmptySpot).unwrap();
        assert_eq!(spot.id, 1);
    }

    #[test]
    fn tentative_track_is_dropped_on_miss() {
        let mut tracker = IouTracker::new(TrackerConfig::default());
        let spot = det(BBox::new(0.0, 0.0, 10.0, 20.0), DetectionClass::EmptySpot);
        tracker.update(&[spot.clone()], &frame()).unwrap();
        assert!(tracker.update(&[], &frame()).unwrap().is_empty());
        assert_eq!(tracker.live_tracks(), 0);

        let tracks = tracker.update(&[spot], &frame()).unwrap();
        assert_eq!(tracks[0].id, 2);
    }

    #[test]
    fn confirmed_track_coasts_through_gap_shorter_than_max_age() {
        let config = TrackerConfig {
            max_age: 2,
            n_init: 1,
            ..Default::default()
        };
        let mut tracker = IouTracker::new(config);
        let car = det(BBox::new(0.0, 0.0, 10.0, 20.0), DetectionClass::Car);
        tracker.update(&[car.clone()], &frame()).unwrap();
        let coasting = tracker.update(&[], &frame()).unwrap();
        assert_eq!(coasting.len(), 1);
        assert_eq!(coasting[0].id, 1);
        assert_eq!(coasting[0].bbox, car.bbox);
        assert!(coasting[0].confirmed);
        tracker.update(&[], &frame()).unwrap();
        let tracks = tracker.update(&[car.clone()], &frame()).unwrap();
        assert_eq!(tracks[0].id, 1);

        for _ in 0..3 {
            tracker.update(&[], &frame()).unwrap();
        }
        assert_eq!(tracker.live_tracks(), 0);
        assert!(tracker.update(&[], &frame()).unwrap().is_empty());
    }

    #[test]
    fn best_overlap_wins_association() {
        let config = TrackerConfig {
            n_init: 1,
            ..Default::default()
        };
        let mut tracker = IouTracker::new(config);
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(6.0, 0.0, 16.0, 10.0);
        tracker
            .update(&[det(a, DetectionClass::Car), det(b, DetectionClass::Car)], &frame())
            .unwrap();

        let shifted_b = BBox::new(6.5, 0.0, 16.5, 10.0);
        let tracks = tracker
            .update(&[det(shifted_b, DetectionClass::Car)], &frame())
            .unwrap();
        assert_eq!(tracks.len(), 2);
        let moved = tracks.iter().find(|t| t.bbox == shifted_b).unwrap();
        assert_eq!(moved.id, 2);
        let coasting = tracks.iter().find(|t| t.id == 1).unwrap();
        assert_eq!(coasting.bbox, a);
    }
}
