pub struct StatsHelper;

impl StatsHelper {
    /// Median of a sample window, truncated toward zero.
    ///
    /// An even-sized window averages the two middle values before truncating,
    /// so `[1, 2]` yields 1 and `[1, 3]` yields 2. An empty window yields 0.
    pub fn median(samples: &[usize]) -> usize {
        if samples.is_empty() {
            return 0;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            sorted[mid]
        } else {
            (sorted[mid - 1] + sorted[mid]) / 2
        }
    }
}
