//! Core error types for pathwise-core.
//!
//! This module defines the error hierarchy using thiserror. Engine
//! computations (scoring, selection, streaks, analytics) are total; the
//! variants here cover the boundaries: empty catalogs, illegal status
//! transitions, storage, configuration and the text generator.

use std::path::PathBuf;
use thiserror::Error;

use crate::challenge::{Difficulty, TrainingPath};

/// Core error type for pathwise-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The catalog has no templates for the requested path/difficulty
    #[error("No templates available for {path} / {difficulty}")]
    NoTemplatesAvailable {
        path: TrainingPath,
        difficulty: Difficulty,
    },

    /// Attempted to complete or skip a challenge that is already terminal
    #[error("Invalid transition for challenge {challenge_id}: cannot {attempted} a {from} challenge")]
    InvalidTransition {
        challenge_id: String,
        from: &'static str,
        attempted: &'static str,
    },

    /// No challenge with the given id exists in history
    #[error("Challenge not found: {0}")]
    ChallengeNotFound(String),

    /// The external text generator failed or timed out
    #[error("Summary generation unavailable: {0}")]
    GenerationUnavailable(#[from] GenerationError),

    /// History store errors raised by non-SQLite implementations
    #[error("History store error: {0}")]
    History(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors reported by a text generation collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The request did not finish within the allotted time
    #[error("generation timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The provider refused the request due to rate limiting
    #[error("generation rate limited")]
    RateLimited,

    /// Any other provider failure
    #[error("generation failed: {0}")]
    Failed(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored row could not be decoded
    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration or catalog TOML
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Value outside its allowed range
    #[error("Value {value} for '{field}' is out of range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Unknown enumerated name
    #[error("Unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    /// Invalid date range
    #[error("Invalid date range: end ({end}) is before start ({start})")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) if e.code == rusqlite::ErrorCode::DatabaseLocked => {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
