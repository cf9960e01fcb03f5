//! Storage boundary trait
//!
//! [`RuleRepository`] is everything the engine needs from storage: rules are
//! written once and read back by id, and attribute records likewise.
//!
//! ```no_run
//! use verdict_core::{AttributeContext, ComparisonOp, Node, to_persisted};
//! use verdict_repository::{MemoryRepository, RuleRepository};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = MemoryRepository::new();
//!
//! let tree = to_persisted(&Node::comparison("age", ComparisonOp::Gt, 30));
//! let rule_id = repo.store_rule("age > 30", tree).await?;
//! let record_id = repo.store_record(AttributeContext::new().with("age", 42)).await?;
//!
//! assert!(repo.fetch_rule(rule_id).await?.is_some());
//! assert!(repo.fetch_record(record_id).await?.is_some());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use verdict_core::{AttributeContext, PersistedTree};

use crate::{RecordId, RepositoryResult, RuleId, StoredRule};

/// Storage for rules and attribute records
///
/// Ids of each kind start at 1 and grow by one with every store.
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Store a rule and its persisted tree, returning the new id
    async fn store_rule(&self, rule_string: &str, rule_tree: PersistedTree) -> RepositoryResult<RuleId>;

    /// Fetch a rule by id; `None` when no such rule exists
    async fn fetch_rule(&self, id: RuleId) -> RepositoryResult<Option<StoredRule>>;

    /// Store an attribute record, returning the new id
    async fn store_record(&self, attributes: AttributeContext) -> RepositoryResult<RecordId>;

    /// Fetch an attribute record by id; `None` when no such record exists
    async fn fetch_record(&self, id: RecordId) -> RepositoryResult<Option<AttributeContext>>;

    /// Short backend name used in logs
    fn backend_name(&self) -> &'static str;
}
