// crates/guestbook-core/src/error.rs

use thiserror::Error;

use crate::schema::FieldIssue;

/// Service-wide error types for the Guestbook service.
#[derive(Debug, Error)]
pub enum GuestbookError {
    /// Store layer error (RocksDB, SQLite, in-memory lock).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Input did not match the procedure's schema.
    #[error("Validation error: {}", summarize(.0))]
    Validation(Vec<FieldIssue>),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn summarize(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for GuestbookError {
    fn from(e: serde_json::Error) -> Self {
        GuestbookError::Serialization(e.to_string())
    }
}
