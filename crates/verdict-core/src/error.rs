//! Error types for Verdict Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// An attribute could not be turned into a context value
    #[error("Invalid attribute '{name}': {message}")]
    InvalidAttribute { name: String, message: String },

    /// A persisted tree is missing a field or carries a malformed one
    #[error("Invalid persisted tree at '{path}': {message}")]
    Persist { path: String, message: String },

    /// A legacy function-call record was stored without its name or arguments
    #[error("Legacy record at '{path}' lost its function data")]
    LostFunctionData { path: String },

    /// JSON text could not be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn persist(path: &str, message: impl Into<String>) -> Self {
        CoreError::Persist {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
