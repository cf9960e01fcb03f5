//! Abstract Syntax Tree (AST) definitions for Verdict
//!
//! A rule is a tree of three node kinds:
//! - Boolean operators (`and` / `or`)
//! - Attribute comparisons (`age > 30`)
//! - Function calls (`is_senior(age > 60)`)

pub mod node;
pub mod operator;

pub use node::{is_identifier, Node, MAX_TREE_DEPTH};
pub use operator::{ComparisonOp, LogicalOp};
