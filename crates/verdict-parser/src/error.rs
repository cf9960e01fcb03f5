//! Parser error types

use thiserror::Error;

/// Parser error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The text is not a well-formed expression
    #[error("Syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// The expression is well-formed but uses a construct outside the rule grammar
    #[error("Unsupported construct at offset {offset}: {construct}")]
    Unsupported { offset: usize, construct: String },
}

impl ParseError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(offset: usize, construct: impl Into<String>) -> Self {
        ParseError::Unsupported {
            offset,
            construct: construct.into(),
        }
    }

    /// Byte offset in the rule text where the problem was detected
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Syntax { offset, .. } | ParseError::Unsupported { offset, .. } => *offset,
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, ParseError::Syntax { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, ParseError::Unsupported { .. })
    }
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
