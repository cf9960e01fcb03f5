//! Rule expression parser
//!
//! Parses rule strings into [`Node`] trees.
//!
//! Supported syntax:
//! - Comparisons: `age > 30`, `salary < 50000`, `department == 'Sales'`
//! - Literals: integers (`42`, `-7`, `50_000`) and strings (`'x'`, `"x"`)
//! - Boolean connectives: `and`, `or` (`and` binds tighter)
//! - Function calls: `is_senior(age > 60)`, `all(a > 1, b == 'x')`
//! - Parentheses for grouping: `(a > 1 or b > 2) and c > 3`
//!
//! Well-formed text outside that grammar (`>=`, `!=`, `not`, arithmetic,
//! chained or attribute-to-attribute comparisons, float literals, bare
//! attributes) fails with [`ParseError::Unsupported`], as does a rule whose
//! tree would be deeper than [`ParserOptions::max_depth`].

use crate::error::{ParseError, Result};
use crate::lexer::tokenize;
use crate::syntax::{CompareToken, Expr, SyntaxParser};
use serde::{Deserialize, Serialize};
use verdict_core::{ComparisonOp, LogicalOp, Node, Scalar, MAX_TREE_DEPTH};

/// How three or more terms joined by the same connective are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanChain {
    /// Fold every term left-to-right: `a and b and c` is `(a and b) and c`
    #[default]
    Fold,
    /// Keep the first two terms and drop the rest, as the first-generation
    /// rule service did
    Truncate,
}

/// Parser options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Treatment of boolean chains longer than two terms
    pub boolean_chain: BooleanChain,

    /// Maximum nesting of parentheses, calls and unary operators
    pub max_nesting: usize,

    /// Deepest rule tree to produce; boolean chains add one level per term.
    /// Values above [`MAX_TREE_DEPTH`] are treated as that ceiling.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            boolean_chain: BooleanChain::Fold,
            max_nesting: 64,
            max_depth: MAX_TREE_DEPTH,
        }
    }
}

impl ParserOptions {
    /// Builder method to set the boolean chain policy
    pub fn with_boolean_chain(mut self, boolean_chain: BooleanChain) -> Self {
        self.boolean_chain = boolean_chain;
        self
    }

    /// Builder method to set the nesting limit
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Builder method to set the tree depth limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Tree depth limit in effect
    pub fn depth_limit(&self) -> usize {
        self.max_depth.min(MAX_TREE_DEPTH)
    }

    /// Fail when a tree of `depth` levels, built at `offset`, is too deep
    pub(crate) fn check_depth(&self, depth: usize, offset: usize) -> Result<()> {
        if depth > self.depth_limit() {
            return Err(ParseError::unsupported(
                offset,
                format!("rule nests deeper than {} levels", self.depth_limit()),
            ));
        }
        Ok(())
    }
}

/// Rule expression parser
pub struct RuleParser;

impl RuleParser {
    /// Parse a rule with default options
    pub fn parse(input: &str) -> Result<Node> {
        Self::parse_with(input, &ParserOptions::default())
    }

    /// Parse a rule with explicit options
    pub fn parse_with(input: &str, options: &ParserOptions) -> Result<Node> {
        let tokens = tokenize(input)?;
        let expr = SyntaxParser::new(tokens, options.max_nesting).parse()?;
        let node = Self::lower(expr, options)?;
        options.check_depth(node.depth(), 0)?;
        Ok(node)
    }

    /// Convert a syntax tree into a rule AST, rejecting unsupported constructs
    fn lower(expr: Expr, options: &ParserOptions) -> Result<Node> {
        match expr {
            Expr::Bool { op, terms, .. } => Self::lower_bool(op, terms, options),
            Expr::Compare { left, rest, offset } => Self::lower_compare(*left, rest, offset),
            Expr::Call { name, args, offset } => {
                let args = args
                    .into_iter()
                    .map(|arg| Self::lower(arg, options))
                    .collect::<Result<Vec<_>>>()?;
                let depth = 1 + args.iter().map(Node::depth).max().unwrap_or(0);
                options.check_depth(depth, offset)?;
                Ok(Node::function_call(name, args))
            }
            Expr::Name { name, offset } => Err(ParseError::unsupported(
                offset,
                format!("bare attribute '{}' is not a rule", name),
            )),
            Expr::Int { offset, .. } | Expr::Str { offset, .. } | Expr::Float { offset } => {
                Err(ParseError::unsupported(offset, "bare literal is not a rule"))
            }
            Expr::Negate { offset, .. } | Expr::Arithmetic { offset } => {
                Err(ParseError::unsupported(offset, "arithmetic expression"))
            }
            Expr::Not { offset } => Err(ParseError::unsupported(offset, "'not' operator")),
        }
    }

    fn lower_bool(op: LogicalOp, terms: Vec<Expr>, options: &ParserOptions) -> Result<Node> {
        let total = terms.len();
        let keep = match options.boolean_chain {
            BooleanChain::Fold => total,
            BooleanChain::Truncate => total.min(2),
        };
        if keep < total {
            log::warn!(
                "Dropping {} trailing '{}' term(s) under truncating boolean chain policy",
                total - keep,
                op.keyword()
            );
        }

        let mut terms = terms.into_iter().take(keep);
        let first = match terms.next() {
            Some(first) => Self::lower(first, options)?,
            None => return Err(ParseError::syntax(0, "empty boolean expression")),
        };

        // Checked per term so an overlong chain fails before it is built
        let mut depth = first.depth();
        terms.try_fold(first, |acc, term| -> Result<Node> {
            let offset = term.offset();
            let right = Self::lower(term, options)?;
            depth = 1 + depth.max(right.depth());
            options.check_depth(depth, offset)?;
            Ok(Node::operator(op, acc, right))
        })
    }

    fn lower_compare(left: Expr, mut rest: Vec<(CompareToken, Expr)>, offset: usize) -> Result<Node> {
        if rest.len() > 1 {
            return Err(ParseError::unsupported(offset, "chained comparison"));
        }
        let (token, right) = match rest.pop() {
            Some(pair) => pair,
            None => return Err(ParseError::syntax(offset, "comparison without operator")),
        };

        let attribute = match left {
            Expr::Name { name, .. } => name,
            other => {
                return Err(ParseError::unsupported(
                    other.offset(),
                    "left side of a comparison must be an attribute",
                ))
            }
        };

        let operator = match token {
            CompareToken::Gt => ComparisonOp::Gt,
            CompareToken::Lt => ComparisonOp::Lt,
            CompareToken::Eq => ComparisonOp::Eq,
            CompareToken::Ge | CompareToken::Le | CompareToken::Ne => {
                return Err(ParseError::unsupported(
                    offset,
                    format!("comparison operator '{}'", token.symbol()),
                ))
            }
        };

        let literal = Self::lower_literal(right)?;
        Ok(Node::comparison(attribute, operator, literal))
    }

    fn lower_literal(expr: Expr) -> Result<Scalar> {
        match expr {
            Expr::Int { value, .. } => Ok(Scalar::Int(value)),
            Expr::Str { value, .. } => Ok(Scalar::String(value)),
            Expr::Negate { operand, offset } => match *operand {
                Expr::Int { value, .. } => Ok(Scalar::Int(-value)),
                _ => Err(ParseError::unsupported(offset, "arithmetic expression")),
            },
            Expr::Name { name, offset } => Err(ParseError::unsupported(
                offset,
                format!("comparison against attribute '{}'", name),
            )),
            Expr::Float { offset } => Err(ParseError::unsupported(offset, "float literal")),
            other => Err(ParseError::unsupported(
                other.offset(),
                "right side of a comparison must be a literal",
            )),
        }
    }
}
