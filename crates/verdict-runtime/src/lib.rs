//! Verdict Runtime - Evaluation engine for Verdict rule trees
//!
//! This crate evaluates parsed rule trees against attribute contexts,
//! calling out to host functions held in a [`FunctionRegistry`].

pub mod builtins;
pub mod error;
pub mod evaluator;
pub mod observability;
pub mod registry;
pub mod trace;

// Re-export main types
pub use builtins::Builtin;
pub use error::{EvaluationError, Result};
pub use evaluator::{evaluate, Evaluator, EvaluatorOptions};
pub use observability::{Metrics, MetricsCollector};
pub use registry::{FunctionError, FunctionRegistry, FunctionResult, RuleFunction};
pub use trace::{EvaluationTrace, StepKind, TraceStep};
