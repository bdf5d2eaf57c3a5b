//! Taxonomy error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while loading a taxonomy definition.
///
/// Any of these aborts the load; no partially built taxonomy is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The definition could not be parsed.
    #[error("Failed to parse taxonomy definition: {0}")]
    Parse(String),

    /// The definition declares no nodes.
    #[error("Taxonomy defines no nodes")]
    Empty,

    /// A node id is empty or contains characters outside `[A-Za-z0-9_.]`.
    #[error("Invalid node id '{0}'")]
    InvalidNodeId(String),

    /// Two nodes share an id.
    #[error("Duplicate node id '{0}'")]
    DuplicateNode(String),

    /// A reference points at a node that is not declared.
    #[error("{context} references unknown node '{node}'")]
    UnknownNode {
        /// Where the reference was found.
        context: String,
        /// The missing node id.
        node: String,
    },

    /// Following parent links from a node leads back to it.
    #[error("Cycle detected in taxonomy at node '{0}'")]
    Cycle(String),

    /// A regular expression does not compile.
    #[error("Invalid pattern '{pattern}' on node '{node}': {reason}")]
    InvalidPattern {
        /// Node declaring the pattern.
        node: String,
        /// The pattern source.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// A subtotal formula does not parse.
    #[error("Invalid formula '{formula}' on node '{node}': {reason}")]
    InvalidFormula {
        /// Node declaring the formula.
        node: String,
        /// The formula source.
        formula: String,
        /// What went wrong.
        reason: String,
    },

    /// Split shares are not positive or do not add up to one.
    #[error("Split rule for code '{code}' is invalid: ratios sum to {total}")]
    InvalidSplit {
        /// Normalized account code of the split rule.
        code: String,
        /// Sum of the declared ratios.
        total: Decimal,
    },

    /// The same exact code is declared more than once.
    #[error("Account code '{0}' is mapped more than once")]
    DuplicateCode(String),

    /// A rule or lookup entry is empty once normalized.
    #[error("Empty {kind} on node '{node}'")]
    EmptyRule {
        /// Rule kind (code, prefix, keyword).
        kind: &'static str,
        /// Node declaring the rule.
        node: String,
    },

    /// A matching rule targets a node that has children.
    #[error("Node '{0}' has children and cannot be a classification target")]
    BranchTarget(String),

    /// Balance roles must name disjoint subtrees.
    #[error("Balance roles '{0}' and '{1}' overlap")]
    OverlappingRoles(String, String),
}

/// Lookup of a node id that the taxonomy does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Taxonomy node not found: {0}")]
pub struct NotFoundError(pub String);
