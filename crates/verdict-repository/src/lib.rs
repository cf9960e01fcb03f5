//! Repository abstraction layer for the Verdict rule engine
//!
//! This crate provides the storage boundary the engine talks to when it keeps
//! rules and attribute records between calls.
//!
//! # Backends
//!
//! - **Memory**: [`MemoryRepository`], for tests and short-lived engines
//! - **File System**: [`FileSystemRepository`], one JSON document per rule or
//!   record
//!
//! Both hand out ids starting at 1, like an auto-increment key.
//!
//! # Quick Start
//!
//! ```no_run
//! use verdict_core::{to_persisted, ComparisonOp, Node};
//! use verdict_repository::{FileSystemRepository, RuleRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = FileSystemRepository::open("data").await?;
//!
//!     let node = Node::comparison("age", ComparisonOp::Gt, 30);
//!     let id = repo.store_rule("age > 30", to_persisted(&node)).await?;
//!
//!     let stored = repo.fetch_rule(id).await?;
//!     println!("Loaded rule: {:?}", stored.map(|r| r.rule_string));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod file_system;
pub mod memory;
pub mod models;
pub mod traits;

// Re-exports - Configuration
pub use config::RepositoryConfig;

// Re-exports - Error
pub use error::{RepositoryError, RepositoryResult};

// Re-exports - Repositories
pub use file_system::FileSystemRepository;
pub use memory::MemoryRepository;
pub use models::{RecordId, RuleId, StoredRecord, StoredRule};
pub use traits::RuleRepository;
