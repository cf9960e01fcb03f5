//! SDK error types

use thiserror::Error;
use verdict_repository::{RecordId, RuleId};

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Parser error
    #[error("Parser error: {0}")]
    ParseError(#[from] verdict_parser::ParseError),

    /// Evaluation error
    #[error("Evaluation error: {0}")]
    EvaluationError(#[from] verdict_runtime::EvaluationError),

    /// Stored tree could not be decoded
    #[error("Persisted tree error: {0}")]
    CoreError(#[from] verdict_core::CoreError),

    /// Storage error
    #[error("Repository error: {0}")]
    RepositoryError(#[from] verdict_repository::RepositoryError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// No rule is stored under the id
    #[error("Rule not found: {0}")]
    RuleNotFound(RuleId),

    /// No record is stored under the id
    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    /// Every rule handed to the combinator was rejected
    #[error("No valid rules to combine ({skipped} skipped)")]
    NoValidRules { skipped: usize },
}

impl SdkError {
    /// Stable machine-readable code, suitable for an API error body
    pub fn reason_code(&self) -> &'static str {
        match self {
            SdkError::ConfigError(_) => "config_error",
            SdkError::ParseError(e) if e.is_syntax() => "syntax_error",
            SdkError::ParseError(_) => "unsupported_construct",
            SdkError::EvaluationError(e) => e.reason_code(),
            SdkError::CoreError(_) => "persist_error",
            SdkError::RepositoryError(_) => "repository_error",
            SdkError::IoError(_) => "io_error",
            SdkError::RuleNotFound(_) => "rule_not_found",
            SdkError::RecordNotFound(_) => "record_not_found",
            SdkError::NoValidRules { .. } => "no_valid_rules",
        }
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
