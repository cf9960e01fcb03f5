//! Repository configuration types

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{FileSystemRepository, MemoryRepository, RepositoryResult, RuleRepository};

/// Where rules and records are kept
///
/// ```rust
/// use verdict_repository::RepositoryConfig;
///
/// let config: RepositoryConfig = serde_json::from_str(r#"{"type": "file_system", "path": "data"}"#).unwrap();
/// assert_eq!(config, RepositoryConfig::file_system("data"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepositoryConfig {
    /// Process memory, lost on exit
    #[default]
    Memory,
    /// JSON documents under a root directory
    FileSystem { path: String },
}

impl RepositoryConfig {
    /// Create a memory repository configuration
    pub fn memory() -> Self {
        RepositoryConfig::Memory
    }

    /// Create a file system repository configuration
    pub fn file_system(path: impl Into<String>) -> Self {
        RepositoryConfig::FileSystem { path: path.into() }
    }

    /// Open the configured repository
    pub async fn open(&self) -> RepositoryResult<Arc<dyn RuleRepository>> {
        match self {
            RepositoryConfig::Memory => Ok(Arc::new(MemoryRepository::new())),
            RepositoryConfig::FileSystem { path } => {
                Ok(Arc::new(FileSystemRepository::open(path).await?))
            }
        }
    }
}
