//! Errors raised while setting a quiz up
//!
//! Once a quiz session exists nothing is fatal: answer-key mismatches are
//! skipped and storage failures are swallowed. Everything that can abort a
//! quiz happens before that point and is described here.

use thiserror::Error;

/// Errors that abort quiz setup
#[derive(Error, Debug)]
pub enum Error {
    /// The page URL carries no quiz identifier
    #[error("invalid or missing quiz id")]
    MissingQuizId,
    /// The quiz identifier does not name a registry entry
    #[error("unknown quiz `{0}`")]
    UnknownQuiz(String),
    /// The registry entry only redirects to an external page
    #[error("quiz `{0}` has no data source of its own")]
    NoDataSource(String),
    /// A registry entry references visuals that are not defined
    #[error("quiz `{quiz}` references unknown visuals `{visuals}`")]
    UnknownVisuals {
        /// The offending quiz identifier
        quiz: String,
        /// The missing visuals name
        visuals: String,
    },
    /// A registry entry references an icon template that is not defined
    #[error("quiz `{quiz}` references unknown icon `{icon}`")]
    UnknownIcon {
        /// The offending quiz identifier
        quiz: String,
        /// The missing icon name
        icon: String,
    },
    /// The CSV header lacks a column the mapping requires
    #[error("missing required column `{0}`")]
    MissingColumn(String),
    /// The data source parsed but produced no usable item
    #[error("no valid data found in {0}")]
    NoValidData(String),
    /// JSON input (registry or GeoJSON) is malformed
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    /// Configuration values are out of bounds
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] garde::Report),
    /// The page address could not be parsed
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Convenience alias for results carrying [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
