//! Runtime error types

use thiserror::Error;

/// Evaluation error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// A comparison names an attribute the context does not hold
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    /// An ordering comparison met a non-integer operand
    #[error("Type mismatch on attribute '{attribute}': {message}")]
    TypeMismatch { attribute: String, message: String },

    /// A function call names a function the registry does not hold
    #[error("Undefined function: {0}")]
    UndefinedFunction(String),

    /// A registered function returned an error or panicked
    #[error("Function '{name}' failed: {reason}")]
    FunctionFailed { name: String, reason: String },

    /// The tree is deeper than the evaluator allows
    #[error("Rule tree exceeds maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },

    /// A function was registered under a name rules cannot call
    #[error("Invalid function name: '{0}'")]
    InvalidFunctionName(String),
}

impl EvaluationError {
    /// Stable machine-readable code for the error kind
    pub fn reason_code(&self) -> &'static str {
        match self {
            EvaluationError::MissingAttribute(_) => "missing_attribute",
            EvaluationError::TypeMismatch { .. } => "type_mismatch",
            EvaluationError::UndefinedFunction(_) => "undefined_function",
            EvaluationError::FunctionFailed { .. } => "function_failed",
            EvaluationError::DepthExceeded { .. } => "depth_exceeded",
            EvaluationError::InvalidFunctionName(_) => "invalid_function_name",
        }
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, EvaluationError>;
