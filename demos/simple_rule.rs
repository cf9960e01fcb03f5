//! Simple Rule Example
//!
//! Parses one rule, stores it, and evaluates it against a stored record.

use verdict_runtime::observability::{names, Metrics};
use verdict_sdk::{AttributeContext, RuleEngineBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    println!("=== Simple Rule Example ===\n");

    let engine = RuleEngineBuilder::new().enable_metrics(true).build().await?;

    let rule = "age > 30 and salary > 50000";
    let rule_id = engine.create_rule(rule).await?;
    println!("Stored rule {}: {}", rule_id, rule);

    let stored = engine.get_rule(rule_id).await?;
    println!("Persisted tree: {}", stored.rule_tree.to_json_string());

    let record = AttributeContext::new()
        .with("age", 35)
        .with("salary", 65000)
        .with("department", "Sales");
    let record_id = engine.add_record(record).await?;

    let result = engine.evaluate_stored(rule_id, record_id).await?;
    println!("\nRule {} on record {}: {}", rule_id, record_id, result);

    if let Some(metrics) = engine.metrics() {
        println!("\nMetrics:");
        println!("  Rules parsed: {}", metrics.counter(names::RULES_PARSED).get());
        println!("  Evaluations: {}", metrics.counter(names::EVALUATIONS).get());
    }

    Ok(())
}
