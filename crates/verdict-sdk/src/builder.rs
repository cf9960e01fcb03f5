//! Builder pattern for RuleEngine

use crate::config::EngineConfig;
use crate::engine::RuleEngine;
use crate::error::Result;
use std::sync::Arc;
use verdict_parser::{BooleanChain, ParserOptions};
use verdict_repository::{RepositoryConfig, RuleRepository};
use verdict_runtime::registry::{FunctionResult, RuleFunction};
use verdict_runtime::{Builtin, Evaluator, EvaluatorOptions, FunctionRegistry, MetricsCollector};
use verdict_core::Value;

/// Builder for RuleEngine
///
/// # Example
///
/// ```rust,no_run
/// use verdict_sdk::{Builtin, RepositoryConfig, RuleEngineBuilder};
///
/// # #[tokio::main]
/// # async fn main() -> verdict_sdk::Result<()> {
/// let engine = RuleEngineBuilder::new()
///     .with_storage(RepositoryConfig::file_system("data"))
///     .with_builtin("all_of", Builtin::All)
///     .enable_metrics(true)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct RuleEngineBuilder {
    config: EngineConfig,
    registry: Option<Arc<FunctionRegistry>>,
    repository: Option<Arc<dyn RuleRepository>>,
    functions: Vec<(String, Arc<dyn RuleFunction>)>,
}

impl RuleEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::from_config(EngineConfig::new())
    }

    /// Start from an existing configuration
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            registry: None,
            repository: None,
            functions: Vec::new(),
        }
    }

    // ========== Parsing and Evaluation ==========

    /// Set parser options
    pub fn with_parser_options(mut self, options: ParserOptions) -> Self {
        self.config.parser = options;
        self
    }

    /// Set the boolean chain policy
    pub fn with_boolean_chain(mut self, boolean_chain: BooleanChain) -> Self {
        self.config.parser.boolean_chain = boolean_chain;
        self
    }

    /// Set evaluator options
    pub fn with_evaluator_options(mut self, options: EvaluatorOptions) -> Self {
        self.config.evaluator = options;
        self
    }

    /// Set the tree depth limit for both parsing and evaluation
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config = self.config.with_max_depth(max_depth);
        self
    }

    // ========== Functions ==========

    /// Use an existing registry, shared with other engines
    pub fn with_registry(mut self, registry: Arc<FunctionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Bind a builtin under `name`
    pub fn with_builtin(mut self, name: impl Into<String>, builtin: Builtin) -> Self {
        self.config.functions.insert(name.into(), builtin);
        self
    }

    /// Bind a host-supplied function under `name`
    pub fn with_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> FunctionResult + Send + Sync + 'static,
    {
        let function: Arc<dyn RuleFunction> = Arc::new(function);
        self.functions.push((name.into(), function));
        self
    }

    // ========== Storage ==========

    /// Set storage configuration
    pub fn with_storage(mut self, storage: RepositoryConfig) -> Self {
        self.config.storage = storage;
        self
    }

    /// Use an already opened repository instead of the configured storage
    pub fn with_repository(mut self, repository: Arc<dyn RuleRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Enable metrics
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.config.enable_metrics = enable;
        self
    }

    /// Build the rule engine
    ///
    /// Opens the configured storage unless a repository was supplied, then
    /// binds configured builtins followed by host functions.
    pub async fn build(self) -> Result<RuleEngine> {
        self.config.validate()?;

        let repository = match self.repository {
            Some(repository) => repository,
            None => self.config.storage.open().await?,
        };

        let registry = self.registry.unwrap_or_default();
        for (name, builtin) in &self.config.functions {
            registry.register(name.as_str(), Arc::new(*builtin))?;
        }
        for (name, function) in self.functions {
            registry.register(name, function)?;
        }

        let metrics = self
            .config
            .enable_metrics
            .then(|| Arc::new(MetricsCollector::new()));

        tracing::info!(
            "Built rule engine ({} storage, {} functions, metrics {})",
            repository.backend_name(),
            registry.len(),
            if metrics.is_some() { "on" } else { "off" }
        );

        Ok(RuleEngine::from_parts(
            self.config.effective_parser_options(),
            Evaluator::with_options(self.config.evaluator),
            registry,
            repository,
            metrics,
        ))
    }
}

impl Default for RuleEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
