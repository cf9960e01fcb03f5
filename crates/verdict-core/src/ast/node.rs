//! Rule AST nodes

use super::operator::{ComparisonOp, LogicalOp};
use crate::types::Scalar;
use std::collections::BTreeSet;
use std::fmt;

/// Deepest tree any parser, decoder or evaluator in the workspace accepts.
///
/// Left-nested boolean chains grow one level per term, so this also caps
/// the number of rules an `or` combination can hold.
pub const MAX_TREE_DEPTH: usize = 512;

/// Whether `name` can stand as an attribute or function name in rule text
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = match chars.next() {
        Some(c) => c.is_ascii_alphabetic() || c == '_',
        None => false,
    };
    starts_well
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !matches!(name, "and" | "or" | "not")
}

/// Rule AST node
///
/// The tree owns its children, so it is acyclic by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Boolean combination of exactly two sub-rules
    Operator {
        op: LogicalOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// Attribute compared against a literal (e.g., `age > 30`)
    Comparison {
        attribute: String,
        operator: ComparisonOp,
        literal: Scalar,
    },

    /// Call of a registered function; arguments are evaluated in order
    FunctionCall { name: String, args: Vec<Node> },
}

impl Node {
    /// Create a boolean operator node
    pub fn operator(op: LogicalOp, left: Node, right: Node) -> Self {
        Node::Operator {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Create `left AND right`
    pub fn and(left: Node, right: Node) -> Self {
        Self::operator(LogicalOp::And, left, right)
    }

    /// Create `left OR right`
    pub fn or(left: Node, right: Node) -> Self {
        Self::operator(LogicalOp::Or, left, right)
    }

    /// Create a comparison node
    pub fn comparison(
        attribute: impl Into<String>,
        operator: ComparisonOp,
        literal: impl Into<Scalar>,
    ) -> Self {
        Node::Comparison {
            attribute: attribute.into(),
            operator,
            literal: literal.into(),
        }
    }

    /// Create a function call node
    pub fn function_call(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::FunctionCall {
            name: name.into(),
            args,
        }
    }

    /// Number of nodes on the longest root-to-leaf path
    ///
    /// Walks with an explicit stack, so it is safe on trees of any depth.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];

        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            match node {
                Node::Operator { left, right, .. } => {
                    pending.push((left, level + 1));
                    pending.push((right, level + 1));
                }
                Node::Comparison { .. } => {}
                Node::FunctionCall { args, .. } => {
                    pending.extend(args.iter().map(|arg| (arg, level + 1)));
                }
            }
        }
        deepest
    }

    /// Total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        match self {
            Node::Operator { left, right, .. } => 1 + left.node_count() + right.node_count(),
            Node::Comparison { .. } => 1,
            Node::FunctionCall { args, .. } => 1 + args.iter().map(Node::node_count).sum::<usize>(),
        }
    }

    /// Names of every function called anywhere in the tree
    pub fn function_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_function_names(&mut names);
        names
    }

    fn collect_function_names<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Node::Operator { left, right, .. } => {
                left.collect_function_names(names);
                right.collect_function_names(names);
            }
            Node::Comparison { .. } => {}
            Node::FunctionCall { name, args } => {
                names.insert(name.as_str());
                for arg in args {
                    arg.collect_function_names(names);
                }
            }
        }
    }

    /// Names of every attribute read anywhere in the tree
    pub fn attribute_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_attribute_names(&mut names);
        names
    }

    fn collect_attribute_names<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Node::Operator { left, right, .. } => {
                left.collect_attribute_names(names);
                right.collect_attribute_names(names);
            }
            Node::Comparison { attribute, .. } => {
                names.insert(attribute.as_str());
            }
            Node::FunctionCall { args, .. } => {
                for arg in args {
                    arg.collect_attribute_names(names);
                }
            }
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Operator { .. } => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for Node {
    /// Renders the node as rule text.
    ///
    /// When every name is an identifier, as in any tree returned by the
    /// parser or by `from_persisted`, the text parses back to an equal tree
    /// under default parser options, provided its parentheses nest no deeper
    /// than the parser's `max_nesting`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Operator { op, left, right } => {
                left.fmt_operand(f)?;
                write!(f, " {} ", op)?;
                right.fmt_operand(f)
            }
            Node::Comparison {
                attribute,
                operator,
                literal,
            } => write!(f, "{} {} {}", attribute, operator, literal),
            Node::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}
