//! Score tracking for a quiz run
//!
//! Every guess is an attempt; only correct guesses add to the correct
//! count. The percentage is what the overlay shows and what gets persisted
//! when the run completes.

use serde::{Deserialize, Serialize};

/// Raw counters and the derived percentage, as shown on the finish screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreStats {
    /// Number of correct guesses
    pub correct: u32,
    /// Number of guesses of any kind
    pub total: u32,
    /// Rounded percentage of correct guesses
    pub percentage: u32,
}

/// Counts correct answers and attempts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTracker {
    correct_answers: u32,
    total_attempts: u32,
}

impl ScoreTracker {
    /// Creates a tracker with no attempts recorded
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a correct guess
    pub fn record_correct(&mut self) {
        self.correct_answers += 1;
        self.total_attempts += 1;
    }

    /// Records a wrong guess
    pub fn record_incorrect(&mut self) {
        self.total_attempts += 1;
    }

    /// Number of correct guesses so far
    pub fn correct(&self) -> u32 {
        self.correct_answers
    }

    /// Number of guesses so far
    pub fn attempts(&self) -> u32 {
        self.total_attempts
    }

    /// Percentage of correct guesses rounded to the nearest integer
    ///
    /// Returns `0` when nothing has been attempted yet.
    pub fn percentage(&self) -> u32 {
        percentage(self.correct_answers, self.total_attempts)
    }

    /// Score line shown in the overlay, e.g. `Score: 85%`
    pub fn formatted(&self) -> String {
        format!("Score: {}%", self.percentage())
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> ScoreStats {
        ScoreStats {
            correct: self.correct_answers,
            total: self.total_attempts,
            percentage: self.percentage(),
        }
    }

    /// Clears both counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// `round(100 * correct / attempts)`, or `0` for zero attempts
pub fn percentage(correct: u32, attempts: u32) -> u32 {
    if attempts == 0 {
        0
    } else {
        (f64::from(correct) * 100. / f64::from(attempts)).round() as u32
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_zero_attempts_is_zero_percent() {
        let tracker = ScoreTracker::new();
        assert_eq!(tracker.percentage(), 0);
        assert_eq!(tracker.formatted(), "Score: 0%");
    }

    #[test]
    fn test_record_correct_and_incorrect() {
        let mut tracker = ScoreTracker::new();
        tracker.record_correct();
        tracker.record_incorrect();
        tracker.record_correct();

        assert_eq!(tracker.correct(), 2);
        assert_eq!(tracker.attempts(), 3);
        assert_eq!(tracker.percentage(), 67);
    }

    #[test]
    fn test_percentage_rounds_to_nearest() {
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(5, 5), 100);
        assert_eq!(percentage(0, 7), 0);
    }

    #[test]
    fn test_percentage_matches_formula_for_small_pairs() {
        for attempts in 0..40u32 {
            for correct in 0..=attempts {
                let expected = if attempts == 0 {
                    0
                } else {
                    (100. * f64::from(correct) / f64::from(attempts)).round() as u32
                };
                assert_eq!(percentage(correct, attempts), expected);
            }
        }
    }

    #[test]
    fn test_correct_never_exceeds_attempts() {
        let mut tracker = ScoreTracker::new();
        for i in 0..50 {
            if i % 3 == 0 {
                tracker.record_correct();
            } else {
                tracker.record_incorrect();
            }
            assert!(tracker.correct() <= tracker.attempts());
        }
    }

    #[test]
    fn test_reset() {
        let mut tracker = ScoreTracker::new();
        tracker.record_correct();
        tracker.reset();

        assert_eq!(
            tracker.stats(),
            ScoreStats {
                correct: 0,
                total: 0,
                percentage: 0
            }
        );
    }
}
