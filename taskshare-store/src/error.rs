//! Error types for the storage layer.

use rusqlite::ffi;
use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A unique constraint rejected the write.
    #[error("already exists: {0}")]
    Conflict(String),

    /// A foreign key pointed at a row that does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// The row targeted by an update or delete does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The author's grant cannot be written through the grant store.
    #[error("author grant is immutable: {0}")]
    AuthorGrant(String),

    /// A stored value could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The connection mutex was poisoned by a panicking writer.
    #[error("connection lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Returns true for a unique or primary-key constraint failure.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::Conflict(_)) || constraint_code(self).is_some_and(is_unique_code)
    }

    /// Classifies a raw SQLite error, turning constraint failures into
    /// [`StoreError::Conflict`] or [`StoreError::MissingReference`].
    pub(crate) fn classify(err: rusqlite::Error, what: impl Into<String>) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _) if is_unique_code(failure.extended_code) => {
                StoreError::Conflict(what.into())
            }
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                StoreError::MissingReference(what.into())
            }
            _ => StoreError::Database(err),
        }
    }
}

fn constraint_code(err: &StoreError) -> Option<i32> {
    match err {
        StoreError::Database(rusqlite::Error::SqliteFailure(failure, _)) => {
            Some(failure.extended_code)
        }
        _ => None,
    }
}

fn is_unique_code(code: i32) -> bool {
    code == ffi::SQLITE_CONSTRAINT_UNIQUE || code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
}
