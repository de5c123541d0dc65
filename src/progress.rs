//! Per-quiz progress persistence
//!
//! Every quiz's latest record lives in one JSON object under a single key
//! of a [`KeyValueStore`]. Each write loads the whole object, replaces one
//! entry and stores it again. Progress is a convenience for the player, so
//! nothing here fails: unreadable data reads as empty and failed writes are
//! logged and dropped.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{constants::storage, quiz::QuizResult, registry::Registry};

/// Failures reported by a [`KeyValueStore`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The store cannot be reached, e.g. storage is disabled
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The store refused the write, e.g. its quota is exhausted
    #[error("storage write rejected: {0}")]
    WriteRejected(String),
}

/// String key-value storage provided by the host
pub trait KeyValueStore {
    /// Reads a value
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the value was not stored.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory [`KeyValueStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects every write
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::WriteRejected(key.to_string()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// How far a player got with a quiz
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// No record exists
    #[default]
    NeverPlayed,
    /// The player left before the end
    Incomplete,
    /// The quiz reached its end
    Completed,
}

/// Stored outcome of the latest run of a quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// How far the player got
    pub status: ProgressStatus,
    /// Percentage score, 0 to 100
    pub score: u32,
    /// Questions asked
    pub total_questions: usize,
    /// Correct answers
    pub correct_answers: u32,
    /// When the record was written
    pub last_played: DateTime<Utc>,
}

/// Completed and total playable quizzes of a category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    /// Quizzes with a completed record
    pub completed: usize,
    /// Quizzes that are not placeholders
    pub total: usize,
}

/// Reads and writes progress records
#[derive(Debug, Clone, Default)]
pub struct ProgressStore<K> {
    store: K,
}

impl<K: KeyValueStore> ProgressStore<K> {
    /// Wraps a key-value store
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &K {
        &self.store
    }

    /// Gives the underlying store back
    pub fn into_inner(self) -> K {
        self.store
    }

    fn load(&self) -> BTreeMap<String, ProgressRecord> {
        let raw = match self.store.get(storage::PROGRESS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeMap::new(),
            Err(error) => {
                tracing::warn!(%error, "progress unreadable");
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|error| {
            tracing::warn!(%error, "progress corrupt, starting over");
            BTreeMap::new()
        })
    }

    fn save(&mut self, records: &BTreeMap<String, ProgressRecord>) {
        let result = serde_json::to_string(records)
            .map_err(|error| StorageError::WriteRejected(error.to_string()))
            .and_then(|json| self.store.set(storage::PROGRESS_KEY, &json));
        if let Err(error) = result {
            tracing::warn!(%error, "progress not saved");
        }
    }

    /// Status of a quiz, [`ProgressStatus::NeverPlayed`] without a record
    pub fn quiz_status(&self, quiz_id: &str) -> ProgressStatus {
        self.quiz_data(quiz_id)
            .map(|record| record.status)
            .unwrap_or_default()
    }

    /// The stored record of a quiz
    pub fn quiz_data(&self, quiz_id: &str) -> Option<ProgressRecord> {
        self.load().remove(quiz_id)
    }

    /// Replaces the record of a quiz
    pub fn save_quiz_result(
        &mut self,
        quiz_id: &str,
        status: ProgressStatus,
        score: u32,
        total_questions: usize,
        correct_answers: u32,
    ) {
        let mut records = self.load();
        records.insert(
            quiz_id.to_string(),
            ProgressRecord {
                status,
                score,
                total_questions,
                correct_answers,
                last_played: Utc::now(),
            },
        );
        self.save(&records);
        tracing::debug!(quiz = quiz_id, ?status, score, "progress saved");
    }

    /// Stores a finished run as completed
    pub fn save_completed(&mut self, quiz_id: &str, result: &QuizResult) {
        self.save_quiz_result(
            quiz_id,
            ProgressStatus::Completed,
            result.percentage,
            result.questions,
            result.correct,
        );
    }

    /// Marks a quiz incomplete unless it was already completed
    pub fn auto_save_incomplete(&mut self, quiz_id: &str) {
        if self.quiz_status(quiz_id) != ProgressStatus::Completed {
            self.save_quiz_result(quiz_id, ProgressStatus::Incomplete, 0, 0, 0);
        }
    }

    /// Completion counts of a registry category
    pub fn category_progress(&self, registry: &Registry, category: &str) -> CategoryProgress {
        let records = self.load();
        registry
            .in_category(category)
            .filter(|(_, entry)| !entry.is_placeholder)
            .fold(CategoryProgress::default(), |mut progress, (id, _)| {
                progress.total += 1;
                if records
                    .get(id)
                    .is_some_and(|record| record.status == ProgressStatus::Completed)
                {
                    progress.completed += 1;
                }
                progress
            })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_read_back() {
        let mut progress = ProgressStore::new(MemoryStore::new());
        progress.save_quiz_result("q1", ProgressStatus::Completed, 80, 10, 8);

        assert_eq!(progress.quiz_status("q1"), ProgressStatus::Completed);
        let record = progress.quiz_data("q1").unwrap();
        assert_eq!(record.score, 80);
        assert_eq!(record.total_questions, 10);
        assert_eq!(record.correct_answers, 8);
        assert_eq!(progress.quiz_status("q2"), ProgressStatus::NeverPlayed);
        assert_eq!(progress.quiz_data("q2"), None);
    }

    #[test]
    fn test_stored_json_shape() {
        let mut progress = ProgressStore::new(MemoryStore::new());
        progress.save_quiz_result("q1", ProgressStatus::Completed, 80, 10, 8);

        let raw = progress.store().get(storage::PROGRESS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let record = &value["q1"];
        assert_eq!(record["status"], "completed");
        assert_eq!(record["totalQuestions"], 10);
        assert_eq!(record["correctAnswers"], 8);
        assert!(
            DateTime::parse_from_rfc3339(record["lastPlayed"].as_str().unwrap()).is_ok()
        );
    }

    #[test]
    fn test_last_write_wins() {
        let mut progress = ProgressStore::new(MemoryStore::new());
        progress.save_quiz_result("q1", ProgressStatus::Incomplete, 0, 0, 0);
        progress.save_quiz_result("q2", ProgressStatus::Completed, 50, 4, 2);
        progress.save_quiz_result("q1", ProgressStatus::Completed, 100, 3, 3);

        assert_eq!(progress.quiz_data("q1").unwrap().score, 100);
        assert_eq!(progress.quiz_status("q2"), ProgressStatus::Completed);
    }

    #[test]
    fn test_auto_save_keeps_completed() {
        let mut progress = ProgressStore::new(MemoryStore::new());
        progress.auto_save_incomplete("q1");
        assert_eq!(progress.quiz_status("q1"), ProgressStatus::Incomplete);

        progress.save_quiz_result("q1", ProgressStatus::Completed, 80, 10, 8);
        progress.auto_save_incomplete("q1");
        assert_eq!(progress.quiz_status("q1"), ProgressStatus::Completed);
        assert_eq!(progress.quiz_data("q1").unwrap().score, 80);
    }

    #[test]
    fn test_corrupt_blob_reads_empty() {
        let mut store = MemoryStore::new();
        store.set(storage::PROGRESS_KEY, "{not json").unwrap();
        let mut progress = ProgressStore::new(store);

        assert_eq!(progress.quiz_status("q1"), ProgressStatus::NeverPlayed);
        progress.save_quiz_result("q1", ProgressStatus::Completed, 10, 10, 1);
        assert_eq!(progress.quiz_status("q1"), ProgressStatus::Completed);
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let mut progress = ProgressStore::new(MemoryStore::read_only());
        progress.save_quiz_result("q1", ProgressStatus::Completed, 80, 10, 8);
        assert_eq!(progress.quiz_status("q1"), ProgressStatus::NeverPlayed);
    }

    #[test]
    fn test_save_completed_result() {
        let mut progress = ProgressStore::new(MemoryStore::new());
        progress.save_completed(
            "q1",
            &QuizResult {
                percentage: 75,
                correct: 3,
                attempts: 4,
                questions: 3,
            },
        );
        let record = progress.quiz_data("q1").unwrap();
        assert_eq!(record.status, ProgressStatus::Completed);
        assert_eq!(record.score, 75);
        assert_eq!(record.total_questions, 3);
        assert_eq!(record.correct_answers, 3);
    }

    #[test]
    fn test_category_progress() {
        let registry = Registry::from_json(
            r#"{"quizzes": {
                "a": {"category": "INDIA", "title": "A"},
                "b": {"category": "INDIA", "title": "B"},
                "c": {"category": "INDIA", "title": "C", "isPlaceholder": true},
                "d": {"category": "WORLD", "title": "D"}
            }}"#,
        )
        .unwrap();
        let mut progress = ProgressStore::new(MemoryStore::new());
        progress.save_quiz_result("a", ProgressStatus::Completed, 90, 10, 9);
        progress.save_quiz_result("b", ProgressStatus::Incomplete, 0, 0, 0);
        progress.save_quiz_result("c", ProgressStatus::Completed, 90, 10, 9);
        progress.save_quiz_result("d", ProgressStatus::Completed, 90, 10, 9);

        assert_eq!(
            progress.category_progress(&registry, "INDIA"),
            CategoryProgress {
                completed: 1,
                total: 2
            }
        );
    }
}
