//! Core RuleEngine implementation

use crate::config::EngineConfig;
use crate::error::{Result, SdkError};
use std::sync::Arc;
use std::time::Instant;
use verdict_core::{from_persisted, to_persisted, AttributeContext, Node, Value};
use verdict_parser::{CombinedRule, ParserOptions, RuleCombinator, RuleParser};
use verdict_repository::{RecordId, RuleId, RuleRepository, StoredRule};
use verdict_runtime::observability::names;
use verdict_runtime::registry::FunctionResult;
use verdict_runtime::{
    Builtin, EvaluationError, EvaluationTrace, Evaluator, FunctionRegistry, Metrics,
    MetricsCollector,
};

/// Rule engine
///
/// Parses, stores and evaluates rules. Cheap to share behind an `Arc`; all
/// methods take `&self`.
pub struct RuleEngine {
    /// Options every rule is parsed with
    parser_options: ParserOptions,

    /// Evaluator
    evaluator: Evaluator,

    /// Functions rules may call
    registry: Arc<FunctionRegistry>,

    /// Rule and record storage
    repository: Arc<dyn RuleRepository>,

    /// Metrics collector, absent when metrics are disabled
    metrics: Option<Arc<MetricsCollector>>,
}

impl RuleEngine {
    /// Create a rule engine from configuration
    pub async fn new(config: EngineConfig) -> Result<Self> {
        crate::builder::RuleEngineBuilder::from_config(config)
            .build()
            .await
    }

    pub(crate) fn from_parts(
        parser_options: ParserOptions,
        evaluator: Evaluator,
        registry: Arc<FunctionRegistry>,
        repository: Arc<dyn RuleRepository>,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        Self {
            parser_options,
            evaluator,
            registry,
            repository,
            metrics,
        }
    }

    // ========== Parsing ==========

    /// Parse a rule with the engine's parser options
    pub fn parse(&self, rule_string: &str) -> Result<Node> {
        match RuleParser::parse_with(rule_string, &self.parser_options) {
            Ok(node) => {
                self.count(names::RULES_PARSED);
                Ok(node)
            }
            Err(e) => {
                self.count(names::PARSE_FAILURES);
                tracing::debug!("Rejected rule '{}': {}", rule_string, e);
                Err(e.into())
            }
        }
    }

    /// Combine rules with `or`, skipping the ones that do not parse
    pub fn combine_rules<S: AsRef<str>>(&self, rule_strings: &[S]) -> CombinedRule {
        let combined = RuleCombinator::combine_with(rule_strings, &self.parser_options);
        if let Some(metrics) = &self.metrics {
            metrics.counter(names::RULES_COMBINED).add(combined.combined as u64);
            metrics.counter(names::RULES_SKIPPED).add(combined.warnings.len() as u64);
        }
        combined
    }

    /// Names called by `node` that the registry does not define
    pub fn undefined_functions(&self, node: &Node) -> Vec<String> {
        node.function_names()
            .into_iter()
            .filter(|name| !self.registry.contains(name))
            .map(str::to_string)
            .collect()
    }

    // ========== Storage ==========

    /// Parse a rule and store it with its persisted tree
    pub async fn create_rule(&self, rule_string: &str) -> Result<RuleId> {
        let node = self.parse(rule_string)?;
        self.store_node(rule_string, &node).await
    }

    /// Combine rules and store the result, rendered back to rule text
    pub async fn create_combined_rule<S: AsRef<str>>(&self, rule_strings: &[S]) -> Result<RuleId> {
        let combined = self.combine_rules(rule_strings);
        let skipped = combined.warnings.len();
        let node = combined
            .into_tree()
            .ok_or(SdkError::NoValidRules { skipped })?;
        self.store_node(&node.to_string(), &node).await
    }

    async fn store_node(&self, rule_string: &str, node: &Node) -> Result<RuleId> {
        let undefined = self.undefined_functions(node);
        if !undefined.is_empty() {
            tracing::warn!(
                "Rule '{}' calls functions that are not defined yet: {}",
                rule_string,
                undefined.join(", ")
            );
        }

        let id = self
            .repository
            .store_rule(rule_string, to_persisted(node))
            .await?;
        tracing::info!("Created rule {} '{}'", id, rule_string);
        Ok(id)
    }

    /// Store an attribute record
    pub async fn add_record(&self, attributes: AttributeContext) -> Result<RecordId> {
        let id = self.repository.store_record(attributes).await?;
        tracing::info!("Added record {}", id);
        Ok(id)
    }

    /// Fetch a stored rule
    pub async fn get_rule(&self, rule_id: RuleId) -> Result<StoredRule> {
        self.repository
            .fetch_rule(rule_id)
            .await?
            .ok_or(SdkError::RuleNotFound(rule_id))
    }

    /// Fetch a stored rule and decode its tree
    pub async fn load_rule(&self, rule_id: RuleId) -> Result<Node> {
        let stored = self.get_rule(rule_id).await?;
        Ok(from_persisted(&stored.rule_tree)?)
    }

    /// Fetch a stored attribute record
    pub async fn get_record(&self, record_id: RecordId) -> Result<AttributeContext> {
        self.repository
            .fetch_record(record_id)
            .await?
            .ok_or(SdkError::RecordNotFound(record_id))
    }

    // ========== Evaluation ==========

    /// Evaluate a rule tree against a context
    pub fn evaluate(&self, node: &Node, context: &AttributeContext) -> Result<bool> {
        let value = self.evaluate_value(node, context)?;
        Ok(value.is_truthy())
    }

    /// Evaluate a rule tree without coercing the result to a boolean
    pub fn evaluate_value(&self, node: &Node, context: &AttributeContext) -> Result<Value> {
        let start = Instant::now();
        let outcome = self.evaluator.evaluate_value(node, context, &self.registry);
        self.record_evaluation(start, outcome.as_ref().err());
        Ok(outcome?)
    }

    /// Evaluate a rule tree and keep the result of every node
    pub fn evaluate_traced(&self, node: &Node, context: &AttributeContext) -> Result<EvaluationTrace> {
        let start = Instant::now();
        let outcome = self.evaluator.evaluate_traced(node, context, &self.registry);
        self.record_evaluation(start, outcome.as_ref().err());
        Ok(outcome?)
    }

    /// Parse and evaluate rule text in one step
    pub fn evaluate_str(&self, rule_string: &str, context: &AttributeContext) -> Result<bool> {
        let node = self.parse(rule_string)?;
        self.evaluate(&node, context)
    }

    /// Evaluate a stored rule against a context
    pub async fn evaluate_rule(&self, rule_id: RuleId, context: &AttributeContext) -> Result<bool> {
        let node = self.load_rule(rule_id).await?;
        self.evaluate(&node, context)
    }

    /// Evaluate a stored rule against a stored record
    pub async fn evaluate_stored(&self, rule_id: RuleId, record_id: RecordId) -> Result<bool> {
        let node = self.load_rule(rule_id).await?;
        let context = self.get_record(record_id).await?;
        let result = self.evaluate(&node, &context)?;
        tracing::debug!("Rule {} on record {}: {}", rule_id, record_id, result);
        Ok(result)
    }

    fn record_evaluation(&self, start: Instant, error: Option<&EvaluationError>) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        metrics.counter(names::EVALUATIONS).inc();
        metrics.record_execution_time(names::EVALUATION, start.elapsed());
        if let Some(error) = error {
            tracing::debug!("Evaluation failed: {}", error);
            metrics.counter(names::EVALUATION_FAILURES).inc();
            metrics.record_error(error.reason_code());
        }
    }

    fn count(&self, name: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.counter(name).inc();
        }
    }

    // ========== Functions ==========

    /// Bind a host-supplied function under `name`
    pub fn define_function<F>(&self, name: &str, function: F) -> Result<()>
    where
        F: Fn(&[Value]) -> FunctionResult + Send + Sync + 'static,
    {
        self.registry.define(name, function)?;
        tracing::info!("Defined function '{}'", name);
        Ok(())
    }

    /// Bind a builtin under `name`
    pub fn bind_builtin(&self, name: &str, builtin: Builtin) -> Result<()> {
        self.registry.register(name, Arc::new(builtin))?;
        tracing::info!("Bound builtin '{}' as '{}'", builtin, name);
        Ok(())
    }

    // ========== Accessors ==========

    /// Get the function registry
    pub fn registry(&self) -> &Arc<FunctionRegistry> {
        &self.registry
    }

    /// Get the repository
    pub fn repository(&self) -> &Arc<dyn RuleRepository> {
        &self.repository
    }

    /// Get the metrics collector, if metrics are enabled
    pub fn metrics(&self) -> Option<&Arc<MetricsCollector>> {
        self.metrics.as_ref()
    }

    pub fn parser_options(&self) -> &ParserOptions {
        &self.parser_options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleEngineBuilder;

    #[tokio::test]
    async fn test_parse_counts_metrics() {
        let engine = RuleEngineBuilder::new().build().await.unwrap();

        engine.parse("age > 30").unwrap();
        assert!(engine.parse("age >= 30").is_err());

        let snapshot = engine.metrics().unwrap().snapshot();
        assert_eq!(snapshot.get(names::RULES_PARSED), Some(&1));
        assert_eq!(snapshot.get(names::PARSE_FAILURES), Some(&1));
    }

    #[tokio::test]
    async fn test_evaluation_failures_counted_by_reason() {
        let engine = RuleEngineBuilder::new().build().await.unwrap();
        let node = engine.parse("age > 30").unwrap();

        assert!(engine.evaluate(&node, &AttributeContext::new()).is_err());
        assert!(engine
            .evaluate(&node, &AttributeContext::new().with("age", 31))
            .unwrap());

        let metrics = engine.metrics().unwrap();
        assert_eq!(metrics.counter(names::EVALUATIONS).get(), 2);
        assert_eq!(metrics.counter(names::EVALUATION_FAILURES).get(), 1);
        assert_eq!(metrics.counter("errors_missing_attribute").get(), 1);
        assert_eq!(metrics.histogram("evaluation_duration").count(), 2);
    }

    #[tokio::test]
    async fn test_evaluation_timings_stay_bounded() {
        use verdict_runtime::observability::HISTOGRAM_WINDOW;

        let engine = RuleEngineBuilder::new().build().await.unwrap();
        let node = engine.parse("age > 30").unwrap();
        let context = AttributeContext::new().with("age", 31);

        let runs = HISTOGRAM_WINDOW * 3;
        for _ in 0..runs {
            assert!(engine.evaluate(&node, &context).unwrap());
        }

        let durations = engine.metrics().unwrap().histogram("evaluation_duration");
        assert_eq!(durations.count(), runs);
        assert_eq!(durations.retained(), HISTOGRAM_WINDOW);
    }

    #[tokio::test]
    async fn test_metrics_disabled() {
        let engine = RuleEngineBuilder::new()
            .enable_metrics(false)
            .build()
            .await
            .unwrap();
        engine.parse("a > 1").unwrap();
        assert!(engine.metrics().is_none());
    }

    #[tokio::test]
    async fn test_undefined_functions() {
        let engine = RuleEngineBuilder::new()
            .with_builtin("any_of", Builtin::Any)
            .build()
            .await
            .unwrap();
        let node = engine.parse("any_of(a > 1) and custom(b > 2)").unwrap();
        assert_eq!(engine.undefined_functions(&node), vec!["custom".to_string()]);
    }
}
