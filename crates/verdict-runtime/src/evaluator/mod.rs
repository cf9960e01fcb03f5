//! Rule evaluator
//!
//! Walks a rule tree against an attribute context. Both children of a
//! boolean operator and every argument of a function call are always
//! evaluated, left to right, so function side effects and errors do not
//! depend on the values of sibling nodes.

mod comparison;

use crate::error::{EvaluationError, Result};
use crate::registry::FunctionRegistry;
use crate::trace::{EvaluationTrace, StepKind, TraceStep};
use comparison::execute_compare;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use verdict_core::{AttributeContext, Node, Value, MAX_TREE_DEPTH};

/// Evaluator options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorOptions {
    /// Deepest tree the evaluator will walk. The default matches the
    /// deepest tree the parser and combinator produce.
    pub max_depth: usize,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_TREE_DEPTH,
        }
    }
}

impl EvaluatorOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Rule evaluator
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    options: EvaluatorOptions,
}

impl Evaluator {
    /// Create an evaluator with default options
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EvaluatorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EvaluatorOptions {
        &self.options
    }

    /// Evaluate a rule to a boolean
    pub fn evaluate(
        &self,
        node: &Node,
        context: &AttributeContext,
        registry: &FunctionRegistry,
    ) -> Result<bool> {
        Ok(self.evaluate_value(node, context, registry)?.is_truthy())
    }

    /// Evaluate a rule without coercing the root value to a boolean
    pub fn evaluate_value(
        &self,
        node: &Node,
        context: &AttributeContext,
        registry: &FunctionRegistry,
    ) -> Result<Value> {
        let mut walk = Walk {
            context,
            registry,
            max_depth: self.options.max_depth,
            steps: None,
        };
        walk.eval(node, 1)
    }

    /// Evaluate a rule and record every node's result
    pub fn evaluate_traced(
        &self,
        node: &Node,
        context: &AttributeContext,
        registry: &FunctionRegistry,
    ) -> Result<EvaluationTrace> {
        let mut walk = Walk {
            context,
            registry,
            max_depth: self.options.max_depth,
            steps: Some(Vec::new()),
        };
        let value = walk.eval(node, 1)?;

        Ok(EvaluationTrace {
            result: value.is_truthy(),
            value,
            steps: walk.steps.unwrap_or_default(),
        })
    }
}

/// Evaluate a rule with default evaluator options
pub fn evaluate(node: &Node, context: &AttributeContext, registry: &FunctionRegistry) -> Result<bool> {
    Evaluator::new().evaluate(node, context, registry)
}

/// State of one evaluation
struct Walk<'a> {
    context: &'a AttributeContext,
    registry: &'a FunctionRegistry,
    max_depth: usize,
    steps: Option<Vec<TraceStep>>,
}

impl Walk<'_> {
    fn eval(&mut self, node: &Node, depth: usize) -> Result<Value> {
        if depth > self.max_depth {
            return Err(EvaluationError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }

        let value = match node {
            Node::Operator { op, left, right } => {
                let left = self.eval(left, depth + 1)?;
                let right = self.eval(right, depth + 1)?;
                Value::Bool(op.apply(left.is_truthy(), right.is_truthy()))
            }
            Node::Comparison {
                attribute,
                operator,
                literal,
            } => Value::Bool(execute_compare(self.context, attribute, *operator, literal)?),
            Node::FunctionCall { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg, depth + 1)?);
                }
                self.call(name, &values)?
            }
        };

        if let Some(steps) = self.steps.as_mut() {
            steps.push(TraceStep {
                expression: node.to_string(),
                kind: StepKind::of(node),
                depth,
                value: value.clone(),
            });
        }
        Ok(value)
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let function = self
            .registry
            .resolve(name)
            .ok_or_else(|| EvaluationError::UndefinedFunction(name.to_string()))?;

        let outcome = catch_unwind(AssertUnwindSafe(|| function.call(args)));
        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::debug!("Function '{}' returned an error: {}", name, e);
                Err(EvaluationError::FunctionFailed {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                tracing::warn!("Function '{}' panicked", name);
                Err(EvaluationError::FunctionFailed {
                    name: name.to_string(),
                    reason: "function panicked".to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use verdict_core::ComparisonOp;

    fn gt(attribute: &str, literal: i64) -> Node {
        Node::comparison(attribute, ComparisonOp::Gt, literal)
    }

    #[test]
    fn test_and_or_laws() {
        let registry = FunctionRegistry::new();
        let ctx = AttributeContext::new().with("a", 5).with("b", 1);
        let t = gt("a", 1);
        let f = gt("b", 1);

        for (node, expected) in [
            (Node::and(t.clone(), t.clone()), true),
            (Node::and(t.clone(), f.clone()), false),
            (Node::and(f.clone(), t.clone()), false),
            (Node::or(t.clone(), f.clone()), true),
            (Node::or(f.clone(), t.clone()), true),
            (Node::or(f.clone(), f.clone()), false),
        ] {
            assert_eq!(evaluate(&node, &ctx, &registry).unwrap(), expected, "{}", node);
        }
    }

    #[test]
    fn test_no_short_circuit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = FunctionRegistry::new();
        let counter = calls.clone();
        registry
            .define("tick", move |_args: &[Value]| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Bool(true))
            })
            .unwrap();

        let ctx = AttributeContext::new().with("a", 0);
        let node = Node::and(gt("a", 1), Node::function_call("tick", vec![]));
        assert!(!evaluate(&node, &ctx, &registry).unwrap());

        let node = Node::or(Node::function_call("tick", vec![]), gt("a", 1));
        assert!(evaluate(&node, &ctx, &registry).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_error_in_right_child_is_not_masked() {
        let registry = FunctionRegistry::new();
        let ctx = AttributeContext::new().with("a", 5);
        let node = Node::or(gt("a", 1), gt("missing", 1));
        assert_eq!(
            evaluate(&node, &ctx, &registry).unwrap_err(),
            EvaluationError::MissingAttribute("missing".to_string())
        );
    }

    #[test]
    fn test_function_receives_args_in_order() {
        let registry = FunctionRegistry::new();
        registry
            .define("second", |args: &[Value]| {
                args.get(1).cloned().ok_or_else(|| "needs two arguments".into())
            })
            .unwrap();

        let ctx = AttributeContext::new().with("a", 5);
        let node = Node::function_call("second", vec![gt("a", 1), gt("a", 10)]);
        assert_eq!(
            Evaluator::new().evaluate_value(&node, &ctx, &registry).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_function_value_truthiness() {
        let registry = FunctionRegistry::new();
        registry.define("zero", |_args: &[Value]| Ok(Value::Int(0))).unwrap();
        registry
            .define("name", |_args: &[Value]| Ok(Value::String("x".to_string())))
            .unwrap();

        let ctx = AttributeContext::new();
        assert!(!evaluate(&Node::function_call("zero", vec![]), &ctx, &registry).unwrap());
        assert!(evaluate(&Node::function_call("name", vec![]), &ctx, &registry).unwrap());
    }

    #[test]
    fn test_undefined_function_after_args() {
        let registry = FunctionRegistry::new();
        let ctx = AttributeContext::new();
        let node = Node::function_call("nope", vec![gt("a", 1)]);
        // Argument errors surface before the lookup
        assert_eq!(
            evaluate(&node, &ctx, &registry).unwrap_err(),
            EvaluationError::MissingAttribute("a".to_string())
        );

        let node = Node::function_call("nope", vec![]);
        assert_eq!(
            evaluate(&node, &ctx, &registry).unwrap_err(),
            EvaluationError::UndefinedFunction("nope".to_string())
        );
    }

    #[test]
    fn test_function_failure_and_panic() {
        let registry = FunctionRegistry::new();
        registry.define("fails", |_args: &[Value]| Err("boom".into())).unwrap();
        registry
            .define("panics", |_args: &[Value]| -> crate::registry::FunctionResult {
                panic!("unexpected")
            })
            .unwrap();

        let ctx = AttributeContext::new();
        let err = evaluate(&Node::function_call("fails", vec![]), &ctx, &registry).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::FunctionFailed {
                name: "fails".to_string(),
                reason: "boom".to_string()
            }
        );

        let err = evaluate(&Node::function_call("panics", vec![]), &ctx, &registry).unwrap_err();
        assert_eq!(err.reason_code(), "function_failed");
    }

    #[test]
    fn test_depth_limit() {
        let mut node = gt("a", 1);
        for _ in 0..10 {
            node = Node::and(node, gt("a", 1));
        }
        let ctx = AttributeContext::new().with("a", 5);
        let registry = FunctionRegistry::new();

        let shallow = Evaluator::with_options(EvaluatorOptions::default().with_max_depth(5));
        assert_eq!(
            shallow.evaluate(&node, &ctx, &registry).unwrap_err(),
            EvaluationError::DepthExceeded { max_depth: 5 }
        );
        assert!(Evaluator::new().evaluate(&node, &ctx, &registry).unwrap());
    }

    #[test]
    fn test_traced_evaluation() {
        let registry = FunctionRegistry::new();
        let ctx = AttributeContext::new().with("age", 35).with("salary", 40000);
        let node = Node::and(gt("age", 30), gt("salary", 50000));

        let trace = Evaluator::new().evaluate_traced(&node, &ctx, &registry).unwrap();
        assert!(!trace.result);
        assert_eq!(trace.steps.len(), 3);
        assert_eq!(trace.steps[0].expression, "age > 30");
        assert_eq!(trace.steps[1].expression, "salary > 50000");
        assert_eq!(trace.steps[2].kind, StepKind::Operator);
        assert_eq!(trace.steps[2].depth, 1);
        assert_eq!(trace.comparisons().count(), 2);
        assert_eq!(trace.failed_steps().count(), 2);
    }
}
