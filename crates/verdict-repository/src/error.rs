//! Error types for the repository layer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur during repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored document exists but cannot be read back
    #[error("Corrupt document at {path}: {message}")]
    Corrupt { path: String, message: String },

    /// Invalid path provided
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// The id counter cannot grow any further
    #[error("Id space exhausted")]
    IdsExhausted,
}

impl RepositoryError {
    pub(crate) fn corrupt(path: impl Into<String>, message: impl ToString) -> Self {
        RepositoryError::Corrupt {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
