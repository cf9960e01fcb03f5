//! End-to-end tests for RuleEngine
//!
//! Each flow runs against both storage backends.

mod common;

use common::{engineering_record, marketing_record, TestEngine};
use verdict_sdk::{
    AttributeContext, BooleanChain, Builtin, ComparisonOp, EngineConfig, Node, RecordId,
    RuleEngineBuilder, RuleId, SdkError, Value,
};

fn gt(attribute: &str, literal: i64) -> Node {
    Node::comparison(attribute, ComparisonOp::Gt, literal)
}

// =============================================================================
// Rule Storage Flows
// =============================================================================

#[tokio::test]
async fn test_create_and_evaluate_stored_rule() {
    for test in TestEngine::all().await {
        let engine = &test.engine;

        let rule_id = engine.create_rule("age > 30 and salary > 50000").await.unwrap();
        assert_eq!(rule_id, RuleId(1));

        let stored = engine.get_rule(rule_id).await.unwrap();
        assert_eq!(stored.rule_string, "age > 30 and salary > 50000");

        assert!(engine.evaluate_rule(rule_id, &marketing_record()).await.unwrap());
        assert!(!engine.evaluate_rule(rule_id, &engineering_record()).await.unwrap());
    }
}

#[tokio::test]
async fn test_evaluate_stored_rule_against_stored_record() {
    for test in TestEngine::all().await {
        let engine = &test.engine;

        let rule_id = engine
            .create_combined_rule(&[
                "age > 30 and salary > 50000",
                "experience > 5 or department == 'Sales'",
            ])
            .await
            .unwrap();
        let matching = engine.add_record(marketing_record()).await.unwrap();
        let other = engine.add_record(engineering_record()).await.unwrap();
        assert_eq!((matching, other), (RecordId(1), RecordId(2)));

        assert!(engine.evaluate_stored(rule_id, matching).await.unwrap());
        assert!(!engine.evaluate_stored(rule_id, other).await.unwrap());
    }
}

#[tokio::test]
async fn test_store_and_evaluate_hundreds_of_combined_rules() {
    let rules: Vec<String> = (0..300).map(|i| format!("age > {}", i)).collect();

    for test in TestEngine::all().await {
        let engine = &test.engine;

        let rule_id = engine.create_combined_rule(&rules).await.unwrap();
        assert_eq!(engine.load_rule(rule_id).await.unwrap().depth(), 300);

        let ctx = AttributeContext::new().with("age", 1000);
        assert!(engine.evaluate_rule(rule_id, &ctx).await.unwrap());
        let ctx = AttributeContext::new().with("age", 0);
        assert!(!engine.evaluate_rule(rule_id, &ctx).await.unwrap());
    }
}

#[tokio::test]
async fn test_overlong_rule_is_a_parse_error() {
    let test = TestEngine::memory().await;
    let rule = vec!["age > 1"; 20_000].join(" or ");

    let err = test.engine.create_rule(&rule).await.unwrap_err();
    assert_eq!(err.reason_code(), "unsupported_construct");
    assert!(test.engine.get_rule(RuleId(1)).await.is_err());
}

#[tokio::test]
async fn test_combined_rule_text_reparses() {
    let test = TestEngine::memory().await;
    let engine = &test.engine;

    let rule_id = engine
        .create_combined_rule(&["a > 1 and b > 2", "bad syntax ((", "c == 'x'"])
        .await
        .unwrap();
    let stored = engine.get_rule(rule_id).await.unwrap();
    assert_eq!(stored.rule_string, "(a > 1 and b > 2) or c == 'x'");

    let reparsed = engine.parse(&stored.rule_string).unwrap();
    assert_eq!(reparsed, engine.load_rule(rule_id).await.unwrap());
}

#[tokio::test]
async fn test_missing_rule_and_record() {
    for test in TestEngine::all().await {
        let engine = &test.engine;

        let err = engine
            .evaluate_rule(RuleId(42), &AttributeContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::RuleNotFound(RuleId(42))));

        let rule_id = engine.create_rule("age > 1").await.unwrap();
        let err = engine.evaluate_stored(rule_id, RecordId(9)).await.unwrap_err();
        assert!(matches!(err, SdkError::RecordNotFound(RecordId(9))));
    }
}

#[tokio::test]
async fn test_invalid_rule_is_not_stored() {
    let test = TestEngine::memory().await;
    let engine = &test.engine;

    let err = engine.create_rule("a < b < c").await.unwrap_err();
    assert_eq!(err.reason_code(), "unsupported_construct");

    let err = engine.create_rule("bad syntax ((").await.unwrap_err();
    assert_eq!(err.reason_code(), "syntax_error");

    // The first successful store still gets id 1
    assert_eq!(engine.create_rule("a > 1").await.unwrap(), RuleId(1));
}

// =============================================================================
// Combination
// =============================================================================

#[tokio::test]
async fn test_combine_rules_reports_warnings() {
    let test = TestEngine::memory().await;
    let combined = test.engine.combine_rules(&["age > 30", "age >= 30", "salary > 50000"]);

    assert_eq!(combined.combined, 2);
    assert_eq!(combined.warnings.len(), 1);
    assert_eq!(combined.warnings[0].rule, "age >= 30");
    assert_eq!(
        combined.tree.unwrap().to_string(),
        "age > 30 or salary > 50000"
    );
}

#[tokio::test]
async fn test_combine_without_valid_rules() {
    let test = TestEngine::memory().await;
    let err = test
        .engine
        .create_combined_rule(&["bad syntax (("])
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::NoValidRules { skipped: 1 }));
}

// =============================================================================
// Functions
// =============================================================================

#[tokio::test]
async fn test_define_function_after_rule_creation() {
    let test = TestEngine::memory().await;
    let engine = &test.engine;

    let rule_id = engine.create_rule("is_senior(age > 60)").await.unwrap();
    let ctx = AttributeContext::new().with("age", 70);

    let err = engine.evaluate_rule(rule_id, &ctx).await.unwrap_err();
    assert_eq!(err.reason_code(), "undefined_function");

    engine
        .define_function("is_senior", |args: &[Value]| {
            Ok(Value::Bool(args.iter().all(Value::is_truthy)))
        })
        .unwrap();
    assert!(engine.evaluate_rule(rule_id, &ctx).await.unwrap());
}

#[tokio::test]
async fn test_bind_builtin() {
    let test = TestEngine::memory().await;
    let engine = &test.engine;
    engine.bind_builtin("at_least_one", Builtin::Any).unwrap();

    let ctx = AttributeContext::new().with("age", 20).with("department", "Sales");
    assert!(engine
        .evaluate_str("at_least_one(age > 60, department == 'Sales')", &ctx)
        .unwrap());

    let err = engine.bind_builtin("or", Builtin::Any).unwrap_err();
    assert_eq!(err.reason_code(), "invalid_function_name");
}

#[tokio::test]
async fn test_function_failure_surfaces() {
    let engine = RuleEngineBuilder::new()
        .with_function("strict", |args: &[Value]| match args {
            [Value::Bool(b)] => Ok(Value::Bool(*b)),
            _ => Err("strict expects one boolean".into()),
        })
        .build()
        .await
        .unwrap();

    let ctx = AttributeContext::new().with("a", 1);
    let err = engine.evaluate_str("strict(a > 0, a > 0)", &ctx).unwrap_err();
    assert!(err.to_string().contains("strict expects one boolean"));
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_engine_from_yaml_config() {
    let dir = tempfile::TempDir::new().unwrap();
    let yaml = format!(
        r#"
parser:
  boolean_chain: truncate
functions:
  every: all
storage:
  type: file_system
  path: {}
"#,
        dir.path().display()
    );

    let config = EngineConfig::from_yaml_str(&yaml).unwrap();
    let engine = RuleEngineBuilder::from_config(config).build().await.unwrap();
    assert_eq!(engine.parser_options().boolean_chain, BooleanChain::Truncate);

    // Truncation keeps only the first two terms
    let rule_id = engine.create_rule("a > 1 and b > 1 and c > 1").await.unwrap();
    let ctx = AttributeContext::new().with("a", 2).with("b", 2).with("c", 0);
    assert!(engine.evaluate_rule(rule_id, &ctx).await.unwrap());

    let ctx = AttributeContext::new().with("x", 1);
    assert!(engine.evaluate_str("every(x > 0)", &ctx).unwrap());

    assert!(dir.path().join("rules/1.json").exists());
}

#[tokio::test]
async fn test_engine_from_config_file() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("verdict.yaml");
    std::fs::write(&path, "evaluator:\n  max_depth: 2\n")?;

    let engine = verdict_sdk::RuleEngine::new(EngineConfig::from_file(&path)?).await?;
    let ctx = AttributeContext::new().with("a", 2);

    assert!(engine.evaluate_str("a > 1 or a > 3", &ctx)?);

    // Rules deeper than the evaluator walks are refused at parse time
    assert_eq!(engine.parser_options().max_depth, 2);
    let err = engine.evaluate_str("(a > 1 or a > 3) and a > 0", &ctx).unwrap_err();
    assert_eq!(err.reason_code(), "unsupported_construct");

    // Trees built elsewhere still meet the evaluator's own limit
    let deep = Node::and(Node::or(gt("a", 1), gt("a", 3)), gt("a", 0));
    let err = engine.evaluate(&deep, &ctx).unwrap_err();
    assert_eq!(err.reason_code(), "depth_exceeded");
    Ok(())
}

#[tokio::test]
async fn test_traced_evaluation_through_engine() {
    let test = TestEngine::memory().await;
    let engine = &test.engine;

    let node = engine.parse("age > 30 and salary > 50000").unwrap();
    let trace = engine.evaluate_traced(&node, &engineering_record()).unwrap();

    assert!(!trace.result);
    let failed: Vec<&str> = trace.failed_steps().map(|s| s.expression.as_str()).collect();
    assert_eq!(
        failed,
        vec!["age > 30", "salary > 50000", "age > 30 and salary > 50000"]
    );
}
