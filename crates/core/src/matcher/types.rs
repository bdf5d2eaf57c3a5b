//! Matcher output types.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::record::{InputRecord, InvalidRecordError};
use crate::taxonomy::NodeId;

/// Matching tier that produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Code found in an explicit lookup entry.
    Exact,
    /// Prefix, code pattern or description rule.
    Pattern,
    /// No rule matched; assigned to the unclassified node, if any.
    Fallback,
    /// The record could not enter classification at all.
    Unmatched,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Pattern => write!(f, "pattern"),
            Self::Fallback => write!(f, "fallback"),
            Self::Unmatched => write!(f, "unmatched"),
        }
    }
}

/// One input record (or one share of it) assigned to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedRecord {
    /// The record as received.
    pub source: InputRecord,
    /// Target node; `None` when unmatched and no fallback node exists.
    pub node: Option<NodeId>,
    /// Tier that decided the match.
    pub confidence: Confidence,
    /// Amount assigned to `node`, in the record's raw sign convention. Equal
    /// to the source amount unless a split rule applied.
    pub amount: Decimal,
    /// Declaration index of the rule that fired.
    pub rule: Option<usize>,
}

impl ClassifiedRecord {
    /// Whether no rule matched this record.
    #[must_use]
    pub fn is_unmatched(&self) -> bool {
        matches!(self.confidence, Confidence::Fallback | Confidence::Unmatched)
    }
}

/// A record excluded from classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    /// Position in the input batch.
    pub index: usize,
    /// The record as received.
    pub record: InputRecord,
    /// Always [`Confidence::Unmatched`].
    pub confidence: Confidence,
    /// Why the record was rejected.
    pub reason: String,
}

impl RejectedRecord {
    /// Builds a rejection entry.
    #[must_use]
    pub fn new(index: usize, record: InputRecord, error: &InvalidRecordError) -> Self {
        Self {
            index,
            record,
            confidence: Confidence::Unmatched,
            reason: error.to_string(),
        }
    }
}
