//! Custom Functions Example
//!
//! Binds builtins from configuration and a host closure, then evaluates
//! rules that call them.

use verdict_sdk::{AttributeContext, EngineConfig, RuleEngine, Value};

const CONFIG: &str = r#"
functions:
  all_of: all
  how_many: count
enable_metrics: false
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    println!("=== Custom Functions Example ===\n");

    let engine = RuleEngine::new(EngineConfig::from_yaml_str(CONFIG)?).await?;

    engine.define_function("is_senior", |args: &[Value]| match args {
        [flag] => Ok(Value::Bool(flag.is_truthy())),
        _ => Err(format!("is_senior takes 1 argument, got {}", args.len()).into()),
    })?;
    println!("Functions: {:?}\n", engine.registry().names());

    let record = AttributeContext::new()
        .with("age", 64)
        .with("tenure", 12)
        .with("department", "Finance");

    for rule in [
        "is_senior(age > 60)",
        "all_of(age > 60, tenure > 20)",
        "how_many(age > 60, tenure > 10, department == 'Finance')",
        "is_senior(age > 60, tenure > 10)",
        "unknown(age > 1)",
    ] {
        let outcome = engine
            .parse(rule)
            .and_then(|node| engine.evaluate_value(&node, &record));
        match outcome {
            Ok(value) => println!("{:<58} => {}", rule, value),
            Err(e) => println!("{:<58} => error [{}]: {}", rule, e.reason_code(), e),
        }
    }

    Ok(())
}
