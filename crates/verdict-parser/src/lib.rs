//! Verdict Parser - rule text to AST parser for the Verdict rule engine
//!
//! This crate turns human-written rule strings such as
//! `age > 30 and department == 'Sales'` into [`verdict_core::Node`] trees,
//! and folds batches of rule strings into one combined rule.

pub mod combinator;
pub mod error;
pub mod expression_parser;
mod lexer;
mod syntax;

// Re-export main parser types
pub use combinator::{CombinedRule, RuleCombinator, RuleWarning};
pub use error::{ParseError, Result};
pub use expression_parser::{BooleanChain, ParserOptions, RuleParser};
