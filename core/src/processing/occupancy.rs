use crate::interface::SpotId;
use crate::math::{iou, BBox};
use crate::processing::frame_view::FrameView;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

/// What changed in the persistent spot sets during one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transitions {
    pub registered: Vec<SpotId>,
    pub removed: Vec<SpotId>,
    /// Known-empty spots that became occupied, by car overlap or direct evidence.
    pub promoted: Vec<SpotId>,
    /// Synthetic spots written for occupied evidence that matched no occupied spot.
    pub direct: Vec<SpotId>,
}

/// Long-lived per-spot occupancy state for one video.
///
/// A spot lives in exactly one of the two sets. Occupied spots are never
/// released: nothing here removes an entry from `known_occupied`.
#[derive(Debug, Clone)]
pub struct OccupancyMachine {
    known_empty: BTreeMap<SpotId, BBox>,
    known_occupied: BTreeMap<SpotId, BBox>,
    overlap_frames: HashMap<SpotId, u32>,
    match_iou: f32,
    hysteresis_frames: u32,
}

impl OccupancyMachine {
    pub fn new(match_iou: f32, hysteresis_frames: u32) -> Self {
        Self {
            known_empty: BTreeMap::new(),
            known_occupied: BTreeMap::new(),
            overlap_frames: HashMap::new(),
            match_iou,
            hysteresis_frames: hysteresis_frames.max(1),
        }
    }

    pub fn known_empty(&self) -> &BTreeMap<SpotId, BBox> {
        &self.known_empty
    }

    pub fn known_occupied(&self) -> &BTreeMap<SpotId, BBox> {
        &self.known_occupied
    }

    pub fn hysteresis_frames(&self) -> u32 {
        self.hysteresis_frames
    }

    /// Consecutive frames of car overlap counted so far for `spot`.
    pub fn overlap_frames(&self, spot: SpotId) -> u32 {
        self.overlap_frames.get(&spot).copied().unwrap_or(0)
    }

    /// Applies registration, cleanup, car promotion and direct evidence, in that order.
    pub fn advance(&mut self, view: &FrameView) -> Transitions {
        let mut transitions = Transitions::default();
        self.register(view, &mut transitions);
        self.cleanup(view, &mut transitions);
        self.promote_from_cars(view, &mut transitions);
        self.reconcile_direct(view, &mut transitions);
        transitions
    }

    fn register(&mut self, view: &FrameView, transitions: &mut Transitions) {
        for observation in &view.empty_spots {
            let id = SpotId::Natural(observation.track_id);
            if self.known_occupied.contains_key(&id) {
                continue;
            }
            if let Entry::Vacant(slot) = self.known_empty.entry(id) {
                slot.insert(observation.bbox);
                transitions.registered.push(id);
            }
        }
    }

    fn cleanup(&mut self, view: &FrameView, transitions: &mut Transitions) {
        let stale: Vec<SpotId> = self
            .known_empty
            .keys()
            .filter(|id| match id {
                SpotId::Natural(track_id) => view.empty_spot(*track_id).is_none(),
                SpotId::Synthetic(_) => true,
            })
            .filter(|id| !self.known_occupied.contains_key(*id))
            .copied()
            .collect();
        for id in stale {
            self.known_empty.remove(&id);
            self.overlap_frames.remove(&id);
            transitions.removed.push(id);
        }
    }

    fn promote_from_cars(&mut self, view: &FrameView, transitions: &mut Transitions) {
        let candidates: Vec<(SpotId, BBox)> = self
            .known_empty
            .iter()
            .map(|(id, bbox)| (*id, *bbox))
            .collect();

        for (id, spot_box) in candidates {
            let car = view
                .cars
                .iter()
                .find(|car| iou(&spot_box, &car.bbox) > self.match_iou);

            match car {
                Some(car) => {
                    let count = self.overlap_frames.entry(id).or_insert(0);
                    *count += 1;
                    if *count >= self.hysteresis_frames {
                        self.occupy(id, car.bbox);
                        transitions.promoted.push(id);
                    }
                }
                None => {
                    self.overlap_frames.insert(id, 0);
                }
            }
        }
    }

    fn reconcile_direct(&mut self, view: &FrameView, transitions: &mut Transitions) {
        for evidence in &view.occupied {
            let already_occupied = self
                .known_occupied
                .values()
                .any(|bbox| iou(&evidence.bbox, bbox) > self.match_iou);
            if already_occupied {
                continue;
            }

            let attached = self
                .known_empty
                .iter()
                .find(|(_, bbox)| iou(&evidence.bbox, bbox) > self.match_iou)
                .map(|(id, _)| *id);
            if let Some(id) = attached {
                self.occupy(id, evidence.bbox);
                transitions.promoted.push(id);
            }

            // Registered even when a known spot was just promoted for the same evidence.
            let direct_id = SpotId::Synthetic(evidence.track_id);
            self.known_occupied.insert(direct_id, evidence.bbox);
            transitions.direct.push(direct_id);
        }
    }

    fn occupy(&mut self, id: SpotId, bbox: BBox) {
        self.known_empty.remove(&id);
        self.overlap_frames.remove(&id);
        self.known_occupied.insert(id, bbox);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::frame_view::Observation;

    fn obs(track_id: u64, bbox: BBox) -> Observation {
        Observation {
            track_id,
            bbox,
            confidence: 0.9,
        }
    }

    fn spot_box() -> BBox {
        BBox::new(0.0, 0.0, 10.0, 20.0)
    }

    fn car_box() -> BBox {
        BBox::new(0.5, 0.5, 10.5, 20.5)
    }

    fn spot_only() -> FrameView {
        FrameView {
            empty_spots: vec![obs(1, spot_box())],
            ..Default::default()
        }
    }

    fn spot_with_car() -> FrameView {
        FrameView {
            empty_spots: vec![obs(1, spot_box())],
            cars: vec![obs(50, car_box())],
            ..Default::default()
        }
    }

    #[test]
    fn new_empty_spot_is_registered_once() {
        let mut machine = OccupancyMachine::new(0.5, 15);
        let first = machine.advance(&spot_only());
        let second = machine.advance(&spot_only());
        assert_eq!(first.registered, vec![SpotId::Natural(1)]);
        assert!(second.registered.is_empty());
        assert_eq!(machine.known_empty().len(), 1);
    }

    #[test]
    fn registered_spot_keeps_first_observed_box() {
        let mut machine = OccupancyMachine::new(0.5, 15);
        machine.advance(&spot_only());
        let drifted = FrameView {
            empty_spots: vec![obs(1, BBox::new(2.0, 1.0, 12.0, 21.0))],
            ..Default::default()
        };
        machine.advance(&drifted);
        assert_eq!(machine.known_empty()[&SpotId::Natural(1)], spot_box());
    }

    #[test]
    fn unobserved_empty_spot_is_cleaned_up() {
        let mut machine = OccupancyMachine::new(0.5, 15);
        machine.advance(&spot_only());
        let transitions = machine.advance(&FrameView::default());
        assert_eq!(transitions.removed, vec![SpotId::Natural(1)]);
        assert!(machine.known_empty().is_empty());
    }

    #[test]
    fn fourteen_overlapping_frames_then_miss_do_not_promote() {
        let mut machine = OccupancyMachine::new(0.5, 15);
        for _ in 0..14 {
            machine.advance(&spot_with_car());
        }
        assert_eq!(machine.overlap_frames(SpotId::Natural(1)), 14);

        machine.advance(&spot_only());
        assert_eq!(machine.overlap_frames(SpotId::Natural(1)), 0);
        assert!(machine.known_occupied().is_empty());

        for frame in 1..=15 {
            let transitions = machine.advance(&spot_with_car());
            if frame < 15 {
                assert!(transitions.promoted.is_empty());
            } else {
                assert_eq!(transitions.promoted, vec![SpotId::Natural(1)]);
            }
        }
        assert_eq!(machine.known_occupied()[&SpotId::Natural(1)], car_box());
        assert!(!machine.known_empty().contains_key(&SpotId::Natural(1)));
    }

    #[test]
    fn occupied_spot_is_never_released() {
        let mut machine = OccupancyMachine::new(0.5, 1);
        machine.advance(&spot_with_car());
        assert!(machine.known_occupied().contains_key(&SpotId::Natural(1)));

        for _ in 0..50 {
            machine.advance(&FrameView::default());
            machine.advance(&spot_only());
        }
        assert!(machine.known_occupied().contains_key(&SpotId::Natural(1)));
        assert!(!machine.known_empty().contains_key(&SpotId::Natural(1)));
    }

    #[test]
    fn direct_evidence_without_spot_gets_stable_synthetic_id() {
        let mut machine = OccupancyMachine::new(0.5, 15);
        let view = FrameView {
            occupied: vec![obs(7, BBox::new(100.0, 100.0, 120.0, 140.0))],
            ..Default::default()
        };

        let first = machine.advance(&view);
        assert_eq!(first.direct, vec![SpotId::Synthetic(7)]);
        assert!(first.promoted.is_empty());

        let moved = FrameView {
            occupied: vec![obs(7, BBox::new(101.0, 100.0, 121.0, 140.0))],
            ..Default::default()
        };
        machine.advance(&moved);
        let ids: Vec<SpotId> = machine.known_occupied().keys().copied().collect();
        assert_eq!(ids, vec![SpotId::Synthetic(7)]);
    }

    #[test]
    fn direct_evidence_promotes_spot_and_registers_synthetic() {
        let mut machine = OccupancyMachine::new(0.5, 15);
        machine.advance(&spot_only());

        let view = FrameView {
            empty_spots: vec![obs(1, spot_box())],
            occupied: vec![obs(9, car_box())],
            ..Default::default()
        };
        let transitions = machine.advance(&view);

        assert_eq!(transitions.promoted, vec![SpotId::Natural(1)]);
        assert_eq!(transitions.direct, vec![SpotId::Synthetic(9)]);
        assert_eq!(machine.known_occupied().len(), 2);
        assert_eq!(machine.known_occupied()[&SpotId::Natural(1)], car_box());
    }

    #[test]
    fn evidence_matching_occupied_spot_is_ignored() {
        let mut machine = OccupancyMachine::new(0.5, 1);
        machine.advance(&spot_with_car());

        let view = FrameView {
            occupied: vec![obs(9, car_box())],
            ..Default::default()
        };
        let transitions = machine.advance(&view);
        assert!(transitions.direct.is_empty());
        assert_eq!(machine.known_occupied().len(), 1);
    }

    #[test]
    fn zero_hysteresis_is_raised_to_one_frame() {
        let mut machine = OccupancyMachine::new(0.5, 0);
        assert_eq!(machine.hysteresis_frames(), 1);
        let transitions = machine.advance(&spot_only());
        assert!(transitions.promoted.is_empty());
    }
}
