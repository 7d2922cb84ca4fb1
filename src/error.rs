/// Error types for the classroom client.
/// Splits expected, user-facing outcomes from backend faults.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassroomError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClassroomError {
    /// Validation, not-found and conflict errors are ordinary results the
    /// caller branches on. Everything else is an operational fault.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ClassroomError::Validation(_) | ClassroomError::NotFound(_) | ClassroomError::Conflict(_)
        )
    }

    /// True for transport and storage failures, including the wrapped
    /// SQLite, JSON and IO errors raised inside a store backend.
    pub fn is_backend_fault(&self) -> bool {
        matches!(
            self,
            ClassroomError::BackendUnavailable(_)
                | ClassroomError::Io(_)
                | ClassroomError::Db(_)
                | ClassroomError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ClassroomError>;
