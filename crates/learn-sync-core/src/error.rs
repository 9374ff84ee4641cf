use std::path::PathBuf;
use thiserror::Error;

/// Malformed input handed to the reconciler.
///
/// Raised before any output is produced; the reconciler never repairs input on its own.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("{field} must be non-negative for course '{course_id}', got {value}")]
    NegativeCount {
        course_id: String,
        field: &'static str,
        value: i64,
    },

    #[error("{field} for course '{course_id}' is out of range: {value} (expected {min}..={max})")]
    ValueOutOfRange {
        course_id: String,
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("score for course '{course_id}' video '{video_id}' is not a finite number")]
    InvalidScore { course_id: String, video_id: String },

    #[error("malformed {what}: {reason}")]
    Malformed { what: String, reason: String },
}

/// Failures at the document store boundary
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored document {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("version conflict for user '{user_id}': expected {expected:?}, found {found:?}")]
    VersionConflict {
        user_id: String,
        expected: Option<u64>,
        found: Option<u64>,
    },

    #[error("invalid user id '{0}'")]
    InvalidKey(String),
}

/// Errors surfaced by `WatchlistService`
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("gave up writing watchlist for user '{user_id}' after {attempts} conflicting attempts")]
    WriteContention { user_id: String, attempts: u32 },
}
