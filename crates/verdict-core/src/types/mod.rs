//! Type system for Verdict
//!
//! This module contains:
//! - Scalar values (rule literals and record attributes)
//! - Runtime values seen by registered functions
//! - The attribute context a rule is evaluated against

pub mod context;
pub mod value;

pub use context::AttributeContext;
pub use value::{Scalar, Value};
