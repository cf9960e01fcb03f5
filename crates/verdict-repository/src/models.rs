//! Data models for the repository layer

use serde::{Deserialize, Serialize};
use std::fmt;
use verdict_core::{AttributeContext, PersistedTree};

/// Identifier of a stored rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub u64);

/// Identifier of a stored attribute record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rule as kept by storage: the text it was written as and its parsed tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRule {
    pub id: RuleId,
    pub rule_string: String,
    pub rule_tree: PersistedTree,
}

/// An attribute record as kept by storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub attributes: AttributeContext,
}

/// Hands out ids 1, 2, 3, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IdSequence {
    next: u64,
}

impl IdSequence {
    /// Sequence continuing after `last`, the highest id already in use
    pub fn after(last: u64) -> Self {
        Self {
            next: last.saturating_add(1),
        }
    }

    pub fn next_id(&mut self) -> Option<u64> {
        let id = self.peek()?;
        self.commit();
        Some(id)
    }

    /// Id the next allocation will return, without consuming it
    pub fn peek(&self) -> Option<u64> {
        (self.next != u64::MAX).then_some(self.next)
    }

    /// Consume the id returned by [`IdSequence::peek`]
    pub fn commit(&mut self) {
        self.next = self.next.saturating_add(1);
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::after(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_starts_at_one() {
        let mut seq = IdSequence::default();
        assert_eq!(seq.next_id(), Some(1));
        assert_eq!(seq.next_id(), Some(2));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut seq = IdSequence::default();
        assert_eq!(seq.peek(), Some(1));
        assert_eq!(seq.peek(), Some(1));
        seq.commit();
        assert_eq!(seq.next_id(), Some(2));
    }

    #[test]
    fn test_sequence_continues_after_last() {
        let mut seq = IdSequence::after(41);
        assert_eq!(seq.next_id(), Some(42));
    }

    #[test]
    fn test_sequence_exhaustion() {
        let mut seq = IdSequence::after(u64::MAX - 2);
        assert_eq!(seq.next_id(), Some(u64::MAX - 1));
        assert_eq!(seq.next_id(), None);
    }
}
