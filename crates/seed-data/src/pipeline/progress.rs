//! Percent-complete milestones for long runs.

use tracing::info;

/// Milestones reported during a run, in percent.
pub const PROGRESS_THRESHOLDS: [u64; 4] = [25, 50, 75, 100];

/// Reports each threshold once, the first time `completed * 100 / total` reaches it.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: u64,
    completed: u64,
    next_threshold: usize,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            completed: 0,
            next_threshold: 0,
        }
    }

    /// Records `steps` more completed units and returns the thresholds crossed.
    pub fn advance(&mut self, steps: u64) -> Vec<u64> {
        self.completed = (self.completed + steps).min(self.total);
        if self.total == 0 {
            return Vec::new();
        }

        let percent = self.completed * 100 / self.total;
        let mut crossed = Vec::new();
        while let Some(&threshold) = PROGRESS_THRESHOLDS.get(self.next_threshold) {
            if percent < threshold {
                break;
            }
            crossed.push(threshold);
            self.next_threshold += 1;
        }
        crossed
    }

    /// Like [`advance`](Self::advance), logging each crossed threshold.
    pub fn advance_and_log(&mut self, steps: u64) {
        for threshold in self.advance(steps) {
            info!(
                completed = self.completed,
                total = self.total,
                "{threshold}% complete"
            );
        }
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crossings(total: u64) -> Vec<(u64, u64)> {
        let mut tracker = ProgressTracker::new(total);
        (1..=total)
            .flat_map(|step| {
                tracker
                    .advance(1)
                    .into_iter()
                    .map(move |threshold| (step, threshold))
            })
            .collect()
    }

    #[test]
    fn test_each_threshold_once_in_order() {
        for total in [4, 7, 10, 13, 100, 1_999] {
            let thresholds: Vec<u64> = crossings(total).into_iter().map(|(_, t)| t).collect();
            assert_eq!(thresholds, PROGRESS_THRESHOLDS.to_vec(), "total {total}");
        }
    }

    #[test]
    fn test_seven_steps_without_exact_quarters() {
        // 7 * 0.25 is never a whole step, so equality checks would never fire
        assert_eq!(crossings(7), vec![(2, 25), (4, 50), (6, 75), (7, 100)]);
    }

    #[test]
    fn test_one_step_can_cross_several() {
        let mut tracker = ProgressTracker::new(3);
        assert_eq!(tracker.advance(2), vec![25, 50]);
        assert_eq!(tracker.advance(1), vec![75, 100]);
        assert!(tracker.advance(1).is_empty());
    }

    #[test]
    fn test_zero_total_never_reports() {
        let mut tracker = ProgressTracker::new(0);
        assert!(tracker.advance(1).is_empty());
    }
}
