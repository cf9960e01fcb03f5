//! Verdict SDK
//!
//! High-level API for parsing, storing and evaluating rules.
//!
//! ```rust,no_run
//! use verdict_sdk::{AttributeContext, RuleEngineBuilder};
//!
//! # #[tokio::main]
//! # async fn main() -> verdict_sdk::Result<()> {
//! let engine = RuleEngineBuilder::new().build().await?;
//!
//! let rule = engine.create_rule("age > 30 and salary > 50000").await?;
//! let record = engine
//!     .add_record(AttributeContext::new().with("age", 35).with("salary", 60000))
//!     .await?;
//!
//! assert!(engine.evaluate_stored(rule, record).await?);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;

// Re-export main types
pub use builder::RuleEngineBuilder;
pub use config::EngineConfig;
pub use engine::RuleEngine;
pub use error::{Result, SdkError};

// Re-export commonly used types from dependencies
pub use verdict_core::{AttributeContext, ComparisonOp, Node, Scalar, Value, MAX_TREE_DEPTH};
pub use verdict_parser::{BooleanChain, CombinedRule, ParserOptions, RuleWarning};
pub use verdict_repository::{RecordId, RepositoryConfig, RuleId};
pub use verdict_runtime::{Builtin, EvaluationTrace, EvaluatorOptions, FunctionResult, MetricsCollector};
