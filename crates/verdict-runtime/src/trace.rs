//! Evaluation traces for explaining rule decisions

use serde::{Deserialize, Serialize};
use verdict_core::{Node, Value};

/// Kind of node a trace step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Operator,
    Comparison,
    FunctionCall,
}

impl StepKind {
    pub fn of(node: &Node) -> Self {
        match node {
            Node::Operator { .. } => StepKind::Operator,
            Node::Comparison { .. } => StepKind::Comparison,
            Node::FunctionCall { .. } => StepKind::FunctionCall,
        }
    }
}

/// Result of one evaluated node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    /// The node rendered as rule text (e.g. "age > 30")
    pub expression: String,

    pub kind: StepKind,

    /// Distance from the root; the root is at depth 1
    pub depth: usize,

    /// The value the node produced
    pub value: Value,
}

/// Trace of a whole evaluation
///
/// Steps are recorded when a node finishes, so children always precede their
/// parent and the root is the last step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationTrace {
    /// Final result after truthiness coercion
    pub result: bool,

    /// Uncoerced value of the root node
    pub value: Value,

    pub steps: Vec<TraceStep>,
}

impl EvaluationTrace {
    /// Steps for comparisons only, in evaluation order
    pub fn comparisons(&self) -> impl Iterator<Item = &TraceStep> {
        self.steps.iter().filter(|s| s.kind == StepKind::Comparison)
    }

    /// Steps whose value is not truthy
    pub fn failed_steps(&self) -> impl Iterator<Item = &TraceStep> {
        self.steps.iter().filter(|s| !s.value.is_truthy())
    }
}
