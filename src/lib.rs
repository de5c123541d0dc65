//! # Geoquiz
//!
//! This library provides the engine behind map-click geography quizzes.
//! A quiz asks for named places (peaks, rivers, districts), judges the
//! entity the player clicks, flashes the answer after too many wrong
//! guesses and keeps score, time and per-quiz progress.
//!
//! The engine is host-agnostic: rendering goes through an
//! [`EntityAdapter`](quiz::layer::EntityAdapter), output through a
//! [`Presenter`](presenter::Presenter), delays through a
//! [`Scheduler`](scheduler::Scheduler) and persistence through a
//! [`KeyValueStore`](progress::KeyValueStore).

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::module_name_repetitions)]
use serde::{Deserialize, Serialize};

pub mod config;
pub mod constants;
pub mod data;
pub mod effects;
pub mod error;
pub mod game;
pub mod presenter;
pub mod progress;
pub mod quiz;
pub mod registry;
pub mod retest;
pub mod scheduler;
pub mod score;
pub mod timer;

pub use error::{Error, Result};

/// Messages sent to resynchronize a host with the quiz state
///
/// A host that reattaches (page restore, second view) receives one of these
/// instead of replaying every update.
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum SyncMessage {
    /// Snapshot of the running quiz
    Quiz(quiz::SyncMessage),
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Messages sent to update what the player sees
#[derive(Debug, Serialize, Clone, PartialEq, derive_more::From)]
pub enum UpdateMessage {
    /// Prompt, score, timer, tooltip and cue updates
    Quiz(quiz::UpdateMessage),
    /// Animations to play on the map
    Effect(effects::Effect),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Timed events fed back into the quiz
///
/// Every alarm tied to a question carries that question's ordinal, so an
/// alarm that outlives its question is recognised and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alarm {
    /// Move on to the next question
    Advance {
        /// Ordinal of the question that was answered
        question: usize,
    },
    /// Put an entity back to its default style after wrong feedback
    RestoreStyle {
        /// Ordinal of the question the feedback belongs to
        question: usize,
        /// The entity to restore
        entity: quiz::layer::EntityId,
    },
    /// Toggle the reveal flashing
    RevealFlash {
        /// Ordinal of the question being revealed
        question: usize,
        /// Whether the next phase is the highlighted one
        lit: bool,
    },
    /// Stop flashing and require a click on the answer
    EnterForcedReveal {
        /// Ordinal of the question being revealed
        question: usize,
    },
    /// Refresh the elapsed-time display
    TimerTick,
}

impl Alarm {
    /// Ordinal of the question this alarm belongs to, if any
    pub fn question(&self) -> Option<usize> {
        match self {
            Self::Advance { question }
            | Self::RestoreStyle { question, .. }
            | Self::RevealFlash { question, .. }
            | Self::EnterForcedReveal { question } => Some(*question),
            Self::TimerTick => None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_update_message_to_message() {
        let update = UpdateMessage::Quiz(quiz::UpdateMessage::Score { percentage: 50 });
        let json_str = update.to_message();

        assert!(json_str.contains("Quiz"));
        assert!(json_str.contains("Score"));
        assert!(json_str.contains("50"));
    }

    #[test]
    fn test_alarm_question() {
        assert_eq!(Alarm::Advance { question: 3 }.question(), Some(3));
        assert_eq!(
            Alarm::RestoreStyle {
                question: 2,
                entity: quiz::layer::EntityId(0)
            }
            .question(),
            Some(2)
        );
        assert_eq!(Alarm::TimerTick.question(), None);
    }

    #[test]
    fn test_alarm_serde() {
        let alarm = Alarm::RevealFlash {
            question: 1,
            lit: true,
        };
        let json = serde_json::to_string(&alarm).unwrap();
        assert_eq!(serde_json::from_str::<Alarm>(&json).unwrap(), alarm);
    }
}
