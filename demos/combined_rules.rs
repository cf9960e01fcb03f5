//! Combined Rules Example
//!
//! Folds several rule strings into one rule, reports the ones that were
//! skipped, and explains the decision for two records.

use verdict_sdk::{AttributeContext, RuleEngineBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    println!("=== Combined Rules Example ===\n");

    let engine = RuleEngineBuilder::new().build().await?;

    let rules = [
        "age > 30 and salary > 50000",
        "experience > 5 or department == 'Sales'",
        "salary >= 100000",
        "bad syntax ((",
    ];

    let combined = engine.combine_rules(&rules);
    for warning in &combined.warnings {
        println!("Skipped: {}", warning);
    }

    let Some(tree) = combined.tree else {
        println!("No valid rules");
        return Ok(());
    };
    println!("Combined rule: {}\n", tree);

    let records = [
        (
            "marketing",
            AttributeContext::new()
                .with("age", 32)
                .with("salary", 60000)
                .with("experience", 3)
                .with("department", "Marketing"),
        ),
        (
            "engineering",
            AttributeContext::new()
                .with("age", 25)
                .with("salary", 40000)
                .with("experience", 1)
                .with("department", "Engineering"),
        ),
    ];

    for (label, record) in &records {
        let trace = engine.evaluate_traced(&tree, record)?;
        println!("{}: {}", label, trace.result);
        for step in trace.comparisons() {
            println!("    {:<28} {}", step.expression, step.value);
        }
    }

    Ok(())
}
