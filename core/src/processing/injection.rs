use crate::interface::{Detection, DetectionClass, DetectionSet, SpotId};
use crate::math::{iou, BBox};
use crate::prelude::EngineConfig;
use std::collections::BTreeMap;

/// Re-inserts occupied evidence for confirmed spots the detector missed.
///
/// Runs before tracking. Every natural spot in `known_occupied` that no
/// occupied detection of this frame overlaps receives a synthetic occupied
/// detection at its last known box. Synthetic `direct_` spots are skipped.
/// Injected detections count as evidence for the spots checked after them.
/// Returns how many detections were injected.
pub fn inject_persistent_occupancy(
    known_occupied: &BTreeMap<SpotId, BBox>,
    detections: &mut DetectionSet,
    config: &EngineConfig,
) -> usize {
    let mut injected = 0;
    for (spot_id, bbox) in known_occupied {
        if spot_id.is_synthetic() {
            continue;
        }
        let observed = detections
            .occupied
            .iter()
            .any(|det| iou(bbox, &det.bbox) > config.match_iou);
        if !observed {
            detections.occupied.push(Detection::new(
                *bbox,
                config.synthetic_confidence,
                DetectionClass::Occupied,
            ));
            injected += 1;
        }
    }
    injected
}
