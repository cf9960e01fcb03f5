//! Rule combinator
//!
//! Folds many rule strings into a single tree joined by `or`. Rules that fail
//! to parse, or that would push the combined tree past the parser's depth
//! limit, are skipped and reported instead of failing the whole batch.

use crate::error::ParseError;
use crate::expression_parser::{ParserOptions, RuleParser};
use verdict_core::Node;

/// A rule that was skipped while combining
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleWarning {
    /// Position of the rule in the input sequence
    pub index: usize,
    /// The rule text as given
    pub rule: String,
    /// Why the rule was rejected
    pub error: ParseError,
}

impl std::fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rule #{} '{}' skipped: {}", self.index, self.rule, self.error)
    }
}

/// Outcome of combining a batch of rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedRule {
    /// Combined tree, absent when no rule parsed
    pub tree: Option<Node>,
    /// Number of rules folded into `tree`
    pub combined: usize,
    /// One entry per skipped rule, in input order
    pub warnings: Vec<RuleWarning>,
}

impl CombinedRule {
    pub fn is_empty(&self) -> bool {
        self.tree.is_none()
    }

    pub fn into_tree(self) -> Option<Node> {
        self.tree
    }
}

/// Rule combinator
pub struct RuleCombinator;

impl RuleCombinator {
    /// Combine rules with default parser options
    pub fn combine<S: AsRef<str>>(rules: &[S]) -> CombinedRule {
        Self::combine_with(rules, &ParserOptions::default())
    }

    /// Combine rules, parsing each one with `options`.
    ///
    /// The running tree becomes the left child and the next valid rule the
    /// right child of a new `or` node, so the shape follows input order.
    pub fn combine_with<S: AsRef<str>>(rules: &[S], options: &ParserOptions) -> CombinedRule {
        let mut result = CombinedRule::default();
        let mut depth = 0;

        for (index, rule) in rules.iter().enumerate() {
            let rule = rule.as_ref();
            let parsed = RuleParser::parse_with(rule, options).and_then(|node| {
                let combined_depth = match result.tree {
                    Some(_) => 1 + depth.max(node.depth()),
                    None => node.depth(),
                };
                options
                    .check_depth(combined_depth, 0)
                    .map(|_| (node, combined_depth))
            });

            match parsed {
                Ok((node, combined_depth)) => {
                    result.tree = Some(match result.tree.take() {
                        Some(acc) => Node::or(acc, node),
                        None => node,
                    });
                    depth = combined_depth;
                    result.combined += 1;
                }
                Err(error) => {
                    log::warn!("Skipping rule #{} '{}': {}", index, rule, error);
                    result.warnings.push(RuleWarning {
                        index,
                        rule: rule.to_string(),
                        error,
                    });
                }
            }
        }

        log::debug!(
            "Combined {} rule(s), skipped {}",
            result.combined,
            result.warnings.len()
        );
        result
    }
}
