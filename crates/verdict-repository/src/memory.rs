//! In-memory repository
//!
//! Keeps rules and records in process memory. Suitable for tests and
//! short-lived engines; everything is lost when the process exits.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use verdict_core::{AttributeContext, PersistedTree};

use crate::models::IdSequence;
use crate::{RecordId, RepositoryError, RepositoryResult, RuleId, RuleRepository, StoredRule};

#[derive(Debug, Default)]
struct MemoryState {
    rules: HashMap<RuleId, StoredRule>,
    records: HashMap<RecordId, AttributeContext>,
    rule_ids: IdSequence,
    record_ids: IdSequence,
}

/// In-memory repository
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

impl MemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rules
    pub async fn rule_count(&self) -> usize {
        self.state.read().await.rules.len()
    }

    /// Number of stored records
    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }
}

#[async_trait]
impl RuleRepository for MemoryRepository {
    async fn store_rule(&self, rule_string: &str, rule_tree: PersistedTree) -> RepositoryResult<RuleId> {
        let mut state = self.state.write().await;
        let id = RuleId(state.rule_ids.next_id().ok_or(RepositoryError::IdsExhausted)?);
        state.rules.insert(
            id,
            StoredRule {
                id,
                rule_string: rule_string.to_string(),
                rule_tree,
            },
        );
        tracing::debug!("Stored rule {} in memory", id);
        Ok(id)
    }

    async fn fetch_rule(&self, id: RuleId) -> RepositoryResult<Option<StoredRule>> {
        Ok(self.state.read().await.rules.get(&id).cloned())
    }

    async fn store_record(&self, attributes: AttributeContext) -> RepositoryResult<RecordId> {
        let mut state = self.state.write().await;
        let id = RecordId(state.record_ids.next_id().ok_or(RepositoryError::IdsExhausted)?);
        state.records.insert(id, attributes);
        tracing::debug!("Stored record {} in memory", id);
        Ok(id)
    }

    async fn fetch_record(&self, id: RecordId) -> RepositoryResult<Option<AttributeContext>> {
        Ok(self.state.read().await.records.get(&id).cloned())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::{to_persisted, ComparisonOp, Node};

    #[tokio::test]
    async fn test_ids_start_at_one_and_increase() {
        let repo = MemoryRepository::new();
        let tree = to_persisted(&Node::comparison("a", ComparisonOp::Gt, 1));

        assert_eq!(repo.store_rule("a > 1", tree.clone()).await.unwrap(), RuleId(1));
        assert_eq!(repo.store_rule("a > 1", tree).await.unwrap(), RuleId(2));
        assert_eq!(
            repo.store_record(AttributeContext::new()).await.unwrap(),
            RecordId(1)
        );
        assert_eq!(repo.rule_count().await, 2);
        assert_eq!(repo.record_count().await, 1);
    }

    #[tokio::test]
    async fn test_fetch_missing() {
        let repo = MemoryRepository::new();
        assert!(repo.fetch_rule(RuleId(7)).await.unwrap().is_none());
        assert!(repo.fetch_record(RecordId(7)).await.unwrap().is_none());
    }
}
