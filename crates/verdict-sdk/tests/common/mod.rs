//! Common test utilities for SDK integration tests

use tempfile::TempDir;
use verdict_sdk::{AttributeContext, RepositoryConfig, RuleEngine, RuleEngineBuilder};

/// An engine together with the directory backing it, if any
pub struct TestEngine {
    pub engine: RuleEngine,
    _dir: Option<TempDir>,
}

impl TestEngine {
    /// Engine over in-memory storage
    pub async fn memory() -> Self {
        Self::from_builder(RuleEngineBuilder::new(), None).await
    }

    /// Engine over a fresh temporary directory
    pub async fn file_system() -> Self {
        let dir = TempDir::new().unwrap();
        let builder = RuleEngineBuilder::new()
            .with_storage(RepositoryConfig::file_system(dir.path().display().to_string()));
        Self::from_builder(builder, Some(dir)).await
    }

    /// One engine per storage backend
    pub async fn all() -> Vec<Self> {
        vec![Self::memory().await, Self::file_system().await]
    }

    async fn from_builder(builder: RuleEngineBuilder, dir: Option<TempDir>) -> Self {
        Self {
            engine: builder.build().await.unwrap(),
            _dir: dir,
        }
    }
}

/// Record that satisfies the first branch of the sample combined rule
pub fn marketing_record() -> AttributeContext {
    AttributeContext::new()
        .with("age", 32)
        .with("salary", 60000)
        .with("experience", 3)
        .with("department", "Marketing")
}

/// Record that satisfies neither branch
pub fn engineering_record() -> AttributeContext {
    AttributeContext::new()
        .with("age", 25)
        .with("salary", 40000)
        .with("experience", 1)
        .with("department", "Engineering")
}
