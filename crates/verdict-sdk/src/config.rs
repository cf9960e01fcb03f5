//! Configuration types for RuleEngine
//!
//! ```yaml
//! parser:
//!   boolean_chain: fold
//! evaluator:
//!   max_depth: 512
//! functions:
//!   all_of: all
//!   negate: not
//! storage:
//!   type: file_system
//!   path: data
//! enable_metrics: true
//! ```

use crate::error::{Result, SdkError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use verdict_parser::{BooleanChain, ParserOptions};
use verdict_repository::RepositoryConfig;
use verdict_runtime::registry::is_valid_function_name;
use verdict_runtime::{Builtin, EvaluatorOptions};

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Parser options
    pub parser: ParserOptions,

    /// Evaluator options
    pub evaluator: EvaluatorOptions,

    /// Builtins to bind, keyed by the name rules call them with
    pub functions: BTreeMap<String, Builtin>,

    /// Storage backend
    pub storage: RepositoryConfig,

    /// Enable metrics collection
    pub enable_metrics: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            parser: ParserOptions::default(),
            evaluator: EvaluatorOptions::default(),
            functions: BTreeMap::new(),
            storage: RepositoryConfig::Memory,
            enable_metrics: true,
        }
    }

    /// Parse a configuration from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)
            .map_err(|e| SdkError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading engine config from: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            SdkError::ConfigError(message) => {
                SdkError::ConfigError(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = self.functions.keys().find(|n| !is_valid_function_name(n)) {
            return Err(SdkError::ConfigError(format!(
                "'{}' is not a valid function name",
                name
            )));
        }
        if self.evaluator.max_depth == 0 || self.parser.max_depth == 0 {
            return Err(SdkError::ConfigError(
                "parser.max_depth and evaluator.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the boolean chain policy
    pub fn with_boolean_chain(mut self, boolean_chain: BooleanChain) -> Self {
        self.parser.boolean_chain = boolean_chain;
        self
    }

    /// Set the tree depth limit for both parsing and evaluation
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.parser.max_depth = max_depth;
        self.evaluator.max_depth = max_depth;
        self
    }

    /// Parser options the engine runs with: rules are never parsed deeper
    /// than the evaluator will walk
    pub fn effective_parser_options(&self) -> ParserOptions {
        let mut parser = self.parser.clone();
        parser.max_depth = parser.depth_limit().min(self.evaluator.max_depth);
        parser
    }

    /// Bind a builtin under `name`
    pub fn with_function(mut self, name: impl Into<String>, builtin: Builtin) -> Self {
        self.functions.insert(name.into(), builtin);
        self
    }

    /// Set storage configuration
    pub fn with_storage(mut self, storage: RepositoryConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Enable metrics
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
