use crate::math::StatsHelper;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Display values derived from the recent count history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothedCounts {
    pub empty: usize,
    pub occupied: usize,
    /// Largest smoothed total seen so far in this video.
    pub capacity: usize,
}

/// Median filter over a bounded window of `(empty, occupied)` samples.
pub struct TemporalSmoother {
    history: VecDeque<(usize, usize)>,
    window: usize,
    max_capacity: usize,
}

impl TemporalSmoother {
    pub fn with_window(window: usize) -> Self {
        let window = window.max(1);
        Self {
            history: VecDeque::with_capacity(window + 1),
            window,
            max_capacity: 0,
        }
    }

    /// Appends one sample, evicting the oldest beyond the window.
    pub fn record(&mut self, empty: usize, occupied: usize) -> SmoothedCounts {
        self.history.push_back((empty, occupied));
        while self.history.len() > self.window {
            self.history.pop_front();
        }

        let current = self.current();
        self.max_capacity = self.max_capacity.max(current.empty + current.occupied);
        SmoothedCounts {
            capacity: self.max_capacity,
            ..current
        }
    }

    /// Medians of the current window without recording anything.
    pub fn current(&self) -> SmoothedCounts {
        let empties: Vec<usize> = self.history.iter().map(|(e, _)| *e).collect();
        let occupied: Vec<usize> = self.history.iter().map(|(_, o)| *o).collect();
        SmoothedCounts {
            empty: StatsHelper::median(&empties),
            occupied: StatsHelper::median(&occupied),
            capacity: self.max_capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn oldest(&self) -> Option<(usize, usize)> {
        self.history.front().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_displays_zero() {
        let smoother = TemporalSmoother::with_window(30);
        assert_eq!(smoother.current(), SmoothedCounts::default());
        assert!(smoother.is_empty());
    }

    #[test]
    fn window_evicts_oldest_sample_first() {
        let mut smoother = TemporalSmoother::with_window(30);
        for i in 0..31 {
            smoother.record(i, 0);
            assert!(smoother.len() <= 30);
        }
        assert_eq!(smoother.len(), 30);
        assert_eq!(smoother.oldest(), Some((1, 0)));
    }

    #[test]
    fn forty_frame_scenario_tracks_recent_median() {
        let mut smoother = TemporalSmoother::with_window(30);
        let mut best_total = 0;
        let mut last = SmoothedCounts::default();
        for frame in 1..=40 {
            last = if frame <= 20 {
                smoother.record(3, 0)
            } else {
                smoother.record(1, 2)
            };
            best_total = best_total.max(last.empty + last.occupied);
            assert_eq!(last.capacity, best_total);
        }
        assert_eq!(last.empty, 1);
        assert_eq!(last.occupied, 2);
        assert_eq!(last.capacity, best_total);
    }

    #[test]
    fn capacity_never_decreases() {
        let mut smoother = TemporalSmoother::with_window(3);
        let mut previous = 0;
        for (empty, occupied) in [(5, 1), (5, 1), (0, 0), (0, 0), (0, 0), (1, 0)] {
            let counts = smoother.record(empty, occupied);
            assert!(counts.capacity >= previous);
            previous = counts.capacity;
        }
        assert_eq!(previous, 6);
    }
}
