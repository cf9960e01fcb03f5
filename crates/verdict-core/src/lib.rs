//! Verdict Core - Core types and definitions for the Verdict rule engine
//!
//! This crate provides the fundamental types used across the Verdict crates:
//! - Scalar and runtime value types
//! - The attribute context a rule is evaluated against
//! - The rule AST (operators, comparisons, function calls)
//! - The persisted-tree codec used by storage backends
//! - Error types

pub mod ast;
pub mod error;
pub mod serializer;
pub mod types;

// Re-export commonly used types
pub use ast::{is_identifier, ComparisonOp, LogicalOp, Node, MAX_TREE_DEPTH};
pub use error::CoreError;
pub use serializer::{from_persisted, to_persisted, PersistedTree};
pub use types::{AttributeContext, Scalar, Value};
