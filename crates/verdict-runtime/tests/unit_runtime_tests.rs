//! Unit tests for verdict-runtime
//!
//! Evaluates parsed rules end to end against attribute contexts, registered
//! functions and builtins.

use std::sync::Arc;
use std::thread;
use verdict_core::{AttributeContext, Node, Value, MAX_TREE_DEPTH};
use verdict_parser::{RuleCombinator, RuleParser};
use verdict_runtime::error::EvaluationError;
use verdict_runtime::{Builtin, Evaluator, FunctionRegistry, RuleFunction};

fn combined_rule() -> Node {
    RuleCombinator::combine(&[
        "age > 30 and salary > 50000",
        "experience > 5 or department == 'Sales'",
    ])
    .into_tree()
    .unwrap()
}

// ========== Scenario Tests ==========

#[test]
fn test_combined_rule_matches_first_branch() {
    let ctx = AttributeContext::new()
        .with("age", 32)
        .with("salary", 60000)
        .with("experience", 3)
        .with("department", "Marketing");

    let registry = FunctionRegistry::new();
    assert!(Evaluator::new().evaluate(&combined_rule(), &ctx, &registry).unwrap());
}

#[test]
fn test_combined_rule_rejects_record() {
    let ctx = AttributeContext::new()
        .with("age", 25)
        .with("salary", 40000)
        .with("experience", 1)
        .with("department", "Engineering");

    let registry = FunctionRegistry::new();
    assert!(!Evaluator::new().evaluate(&combined_rule(), &ctx, &registry).unwrap());
}

#[test]
fn test_hundreds_of_combined_rules_evaluate() {
    let rules: Vec<String> = (0..300).map(|i| format!("age > {}", i)).collect();
    let tree = RuleCombinator::combine(&rules).into_tree().unwrap();
    let registry = FunctionRegistry::new();

    let ctx = AttributeContext::new().with("age", 1000);
    assert!(Evaluator::new().evaluate(&tree, &ctx, &registry).unwrap());

    let ctx = AttributeContext::new().with("age", 0);
    assert!(!Evaluator::new().evaluate(&tree, &ctx, &registry).unwrap());
}

#[test]
fn test_deepest_parsed_chain_evaluates() {
    let rule = vec!["age > 1"; MAX_TREE_DEPTH].join(" or ");
    let tree = RuleParser::parse(&rule).unwrap();
    let ctx = AttributeContext::new().with("age", 2);

    let trace = Evaluator::new()
        .evaluate_traced(&tree, &ctx, &FunctionRegistry::new())
        .unwrap();
    assert!(trace.result);
    assert_eq!(trace.comparisons().count(), MAX_TREE_DEPTH);
}

#[test]
fn test_context_from_json_record() {
    let record = serde_json::json!({
        "age": 40,
        "salary": 10,
        "experience": 9,
        "department": "Engineering"
    });
    let ctx = AttributeContext::from_json(&record).unwrap();

    let registry = FunctionRegistry::new();
    assert!(Evaluator::new().evaluate(&combined_rule(), &ctx, &registry).unwrap());
}

// ========== Error Tests ==========

#[test]
fn test_missing_attribute_is_an_error() {
    let node = RuleParser::parse("age > 30").unwrap();
    let err = Evaluator::new()
        .evaluate(&node, &AttributeContext::new(), &FunctionRegistry::new())
        .unwrap_err();
    assert_eq!(err, EvaluationError::MissingAttribute("age".to_string()));
    assert_eq!(err.reason_code(), "missing_attribute");
}

#[test]
fn test_undefined_function_is_an_error() {
    let node = RuleParser::parse("is_senior(age > 60)").unwrap();
    let ctx = AttributeContext::new().with("age", 70);
    let err = Evaluator::new()
        .evaluate(&node, &ctx, &FunctionRegistry::new())
        .unwrap_err();
    assert_eq!(err, EvaluationError::UndefinedFunction("is_senior".to_string()));
}

#[test]
fn test_ordering_against_string_is_type_mismatch() {
    let node = RuleParser::parse("department > 3").unwrap();
    let ctx = AttributeContext::new().with("department", "Sales");
    let err = Evaluator::new()
        .evaluate(&node, &ctx, &FunctionRegistry::new())
        .unwrap_err();
    assert_eq!(err.reason_code(), "type_mismatch");
}

// ========== Function Tests ==========

#[test]
fn test_registered_function_in_parsed_rule() -> anyhow::Result<()> {
    let registry = FunctionRegistry::new();
    registry.define("is_senior", |args: &[Value]| {
        Ok(Value::Bool(args.first().map(Value::is_truthy).unwrap_or(false)))
    })?;

    let node = RuleParser::parse("is_senior(age > 60) or department == 'Board'")?;
    let evaluator = Evaluator::new();

    let ctx = AttributeContext::new().with("age", 65).with("department", "Ops");
    assert!(evaluator.evaluate(&node, &ctx, &registry)?);

    let ctx = AttributeContext::new().with("age", 45).with("department", "Ops");
    assert!(!evaluator.evaluate(&node, &ctx, &registry)?);
    Ok(())
}

#[test]
fn test_builtins_bound_under_aliases() -> anyhow::Result<()> {
    let registry = FunctionRegistry::new();
    registry.register("all_of", Arc::new(Builtin::All))?;
    registry.register("hits", Arc::new(Builtin::Count))?;
    registry.register("negate", Arc::new(Builtin::Not))?;

    let ctx = AttributeContext::new().with("a", 5).with("b", 1);
    let evaluator = Evaluator::new();

    let node = RuleParser::parse("all_of(a > 1, b > 0)")?;
    assert!(evaluator.evaluate(&node, &ctx, &registry)?);

    let node = RuleParser::parse("hits(a > 1, b > 5, a == 5)")?;
    assert_eq!(evaluator.evaluate_value(&node, &ctx, &registry)?, Value::Int(2));

    let node = RuleParser::parse("negate(b > 5)")?;
    assert!(evaluator.evaluate(&node, &ctx, &registry)?);

    let node = RuleParser::parse("negate(a > 1, b > 1)")?;
    let err = evaluator.evaluate(&node, &ctx, &registry).unwrap_err();
    assert!(matches!(err, EvaluationError::FunctionFailed { ref name, .. } if name == "negate"));
    Ok(())
}

#[test]
fn test_traced_function_call() {
    let registry = FunctionRegistry::new();
    registry.register("any", Arc::new(Builtin::Any)).unwrap();

    let node = RuleParser::parse("any(a > 10, a < 10)").unwrap();
    let ctx = AttributeContext::new().with("a", 3);
    let trace = Evaluator::new().evaluate_traced(&node, &ctx, &registry).unwrap();

    assert!(trace.result);
    let expressions: Vec<&str> = trace.steps.iter().map(|s| s.expression.as_str()).collect();
    assert_eq!(expressions, vec!["a > 10", "a < 10", "any(a > 10, a < 10)"]);
}

// ========== Concurrency Tests ==========

#[test]
fn test_concurrent_define_and_evaluate() {
    let registry = Arc::new(FunctionRegistry::new());
    registry
        .define("flag", |_args: &[Value]| Ok(Value::Bool(true)))
        .unwrap();

    let node = Arc::new(RuleParser::parse("flag() and a > 0").unwrap());

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            let node = node.clone();
            thread::spawn(move || {
                let ctx = AttributeContext::new().with("a", 1);
                let evaluator = Evaluator::new();
                for _ in 0..200 {
                    // Every version of `flag` returns a truthy value
                    assert!(evaluator.evaluate(&node, &ctx, &registry).unwrap());
                }
            })
        })
        .collect();

    let writer = {
        let registry = registry.clone();
        thread::spawn(move || {
            for i in 1..=200i64 {
                registry
                    .define("flag", move |_args: &[Value]| Ok(Value::Int(i)))
                    .unwrap();
            }
        })
    };

    for handle in readers {
        handle.join().unwrap();
    }
    writer.join().unwrap();

    let flag = registry.resolve("flag").unwrap();
    assert_eq!(flag.call(&[]).unwrap(), Value::Int(200));
}
