//! Per-quiz options
//!
//! Options come from the quiz registry entry and fall back to the defaults
//! in [`constants`](crate::constants). They are validated with `garde`
//! before a quiz is built from them.

use std::time::Duration;

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

use crate::constants::{quiz as limits, timing};

type ValidationResult = garde::Result;

/// Validates that a duration falls within bounds given in milliseconds
fn validate_duration<const MIN_MILLIS: u64, const MAX_MILLIS: u64>(
    field: &'static str,
    val: &Duration,
) -> ValidationResult {
    if (u128::from(MIN_MILLIS)..=u128::from(MAX_MILLIS)).contains(&val.as_millis()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "{field} is outside of the bounds [{MIN_MILLIS},{MAX_MILLIS}] ms",
        )))
    }
}

fn validate_delay(field: &'static str, val: &Duration) -> ValidationResult {
    validate_duration::<{ timing::MIN_DELAY }, { timing::MAX_DELAY }>(field, val)
}

fn validate_period(field: &'static str, val: &Duration) -> ValidationResult {
    validate_duration::<{ timing::MIN_PERIOD }, { timing::MAX_DELAY }>(field, val)
}

/// Kind of entity a quiz is played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Markers, e.g. peaks or lakes
    Point,
    /// Polylines, e.g. rivers
    Line,
    /// Areas, e.g. districts
    Polygon,
}

/// Tunables of one quiz run
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizOptions {
    /// Cap on the number of questions asked, the whole pool when unset
    #[garde(range(min = 1, max = limits::MAX_QUESTIONS))]
    pub max_questions: Option<usize>,
    /// Wrong guesses allowed before the answer is revealed
    #[garde(range(min = 1, max = limits::MAX_ATTEMPTS))]
    pub max_attempts: u32,
    /// Hold after a correct answer
    #[garde(custom(|v, _| validate_delay("success hold", v)))]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub success_hold: Duration,
    /// Flashing time before the forced reveal starts
    #[garde(custom(|v, _| validate_delay("reveal delay", v)))]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub reveal_delay: Duration,
    /// Period of the reveal flashing
    #[garde(custom(|v, _| validate_period("flash interval", v)))]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub flash_interval: Duration,
    /// How long a wrong guess stays marked
    #[garde(custom(|v, _| validate_delay("wrong feedback", v)))]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub wrong_feedback: Duration,
    /// How long a wrong guess stays marked during a forced reveal
    #[garde(custom(|v, _| validate_delay("forced wrong feedback", v)))]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub forced_wrong_feedback: Duration,
    /// Lifetime of transient tooltips
    #[garde(custom(|v, _| validate_delay("tooltip", v)))]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub tooltip: Duration,
    /// Period of the elapsed-time display
    #[garde(custom(|v, _| validate_period("timer interval", v)))]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub timer_interval: Duration,
}

impl Default for QuizOptions {
    fn default() -> Self {
        Self {
            max_questions: None,
            max_attempts: limits::DEFAULT_MAX_ATTEMPTS,
            success_hold: Duration::from_millis(timing::SUCCESS_HOLD),
            reveal_delay: Duration::from_millis(timing::REVEAL_DELAY),
            flash_interval: Duration::from_millis(timing::FLASH_INTERVAL),
            wrong_feedback: Duration::from_millis(timing::WRONG_FEEDBACK),
            forced_wrong_feedback: Duration::from_millis(timing::FORCED_WRONG_FEEDBACK),
            tooltip: Duration::from_millis(timing::TOOLTIP),
            timer_interval: Duration::from_millis(timing::TIMER_INTERVAL),
        }
    }
}

impl QuizOptions {
    /// Defaults for a quiz played on `shape`
    ///
    /// Marker quizzes hold a correct answer a little longer so the detail
    /// tooltip can be read, and flash a missed answer for a shorter time.
    pub fn for_shape(shape: Shape) -> Self {
        match shape {
            Shape::Point => Self {
                success_hold: Duration::from_millis(timing::POINT_SUCCESS_HOLD),
                reveal_delay: Duration::from_millis(timing::POINT_REVEAL_DELAY),
                ..Self::default()
            },
            Shape::Line | Shape::Polygon => Self::default(),
        }
    }

    /// Copy with a different question cap
    #[must_use]
    pub fn with_max_questions(mut self, max_questions: usize) -> Self {
        self.max_questions = Some(max_questions);
        self
    }

    /// Copy with a different attempt budget
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(QuizOptions::default().validate().is_ok());
        assert!(QuizOptions::for_shape(Shape::Point).validate().is_ok());
    }

    #[test]
    fn test_point_hold_is_longer() {
        assert_eq!(
            QuizOptions::for_shape(Shape::Point).success_hold,
            Duration::from_millis(2500)
        );
        assert_eq!(
            QuizOptions::for_shape(Shape::Line).success_hold,
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn test_point_reveal_is_shorter() {
        assert_eq!(
            QuizOptions::for_shape(Shape::Point).reveal_delay,
            Duration::from_millis(2000)
        );
        assert_eq!(
            QuizOptions::for_shape(Shape::Polygon).reveal_delay,
            Duration::from_millis(3000)
        );
    }

    #[test]
    fn test_unset_cap_is_valid() {
        let options = QuizOptions::default();
        assert_eq!(options.max_questions, None);
        assert!(options.validate().is_ok());
        let options: QuizOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.max_questions, None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: QuizOptions =
            serde_json::from_str(r#"{"maxQuestions": 10, "revealDelay": 1500}"#).unwrap();
        assert_eq!(options.max_questions, Some(10));
        assert_eq!(options.reveal_delay, Duration::from_millis(1500));
        assert_eq!(options.max_attempts, limits::DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        assert!(QuizOptions::default().with_max_questions(0).validate().is_err());
        assert!(QuizOptions::default().with_max_attempts(0).validate().is_err());

        let options = QuizOptions {
            flash_interval: Duration::from_millis(10),
            ..QuizOptions::default()
        };
        assert!(options.validate().is_err());

        let options = QuizOptions {
            wrong_feedback: Duration::from_secs(60),
            ..QuizOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_validate_duration_bounds() {
        assert!(validate_duration::<0, 100>("x", &Duration::from_millis(100)).is_ok());
        assert!(validate_duration::<0, 100>("x", &Duration::from_millis(101)).is_err());
        assert!(validate_duration::<50, 100>("x", &Duration::from_millis(49)).is_err());
    }
}
