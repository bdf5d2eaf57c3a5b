//! Taxonomy data types.

use std::borrow::Borrow;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::formula::Formula;

/// Stable identifier of a taxonomy node (e.g. `attivo.c.iv`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wraps an id. Validity is checked when the taxonomy is loaded.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id only uses `[A-Za-z0-9_.]` and is not empty.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Normal balance side of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedSign {
    /// Debit-normal (assets, costs).
    #[serde(alias = "dare")]
    Debit,
    /// Credit-normal (liabilities, equity, revenues).
    #[serde(alias = "avere")]
    Credit,
    /// No constraint; the node takes the orientation of its nearest ancestor.
    #[default]
    Either,
}

impl ExpectedSign {
    /// Multiplier applied to raw (debit-positive) amounts at a leaf with this
    /// resolved sign.
    #[must_use]
    pub fn factor(self) -> Decimal {
        match self {
            Self::Debit | Self::Either => Decimal::ONE,
            Self::Credit => Decimal::NEGATIVE_ONE,
        }
    }
}

impl fmt::Display for ExpectedSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debit => write!(f, "debit"),
            Self::Credit => write!(f, "credit"),
            Self::Either => write!(f, "either"),
        }
    }
}

/// One line item or subtotal of the target statement.
#[derive(Debug, Clone, Serialize)]
pub struct TaxonomyNode {
    /// Unique id.
    pub id: NodeId,
    /// Human-readable label.
    pub label: String,
    /// Parent node, `None` for a section root.
    pub parent: Option<NodeId>,
    /// Declared normal balance side.
    pub sign: ExpectedSign,
    /// Sign after resolving `Either` against the ancestors.
    pub effective_sign: ExpectedSign,
    /// Subtotal cross-check formula.
    pub formula: Option<Formula>,
    /// Formula mismatches on this node are reported as errors.
    pub critical: bool,
    /// Distance from the section root (roots have depth 0).
    pub depth: usize,
}

impl TaxonomyNode {
    /// Whether this node is a section root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Nodes playing a role in the fundamental balance identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BalanceRoles {
    /// Total assets.
    pub assets: Option<NodeId>,
    /// Total liabilities (excluding equity).
    pub liabilities: Option<NodeId>,
    /// Total equity.
    pub equity: Option<NodeId>,
    /// Revenues of the period, when the trial balance is not yet closed.
    pub income: Option<NodeId>,
    /// Costs of the period, when the trial balance is not yet closed.
    pub expenses: Option<NodeId>,
}

impl BalanceRoles {
    /// Iterates the declared roles as `(role name, node)`.
    pub fn declared(&self) -> impl Iterator<Item = (&'static str, &NodeId)> {
        [
            ("assets", self.assets.as_ref()),
            ("liabilities", self.liabilities.as_ref()),
            ("equity", self.equity.as_ref()),
            ("income", self.income.as_ref()),
            ("expenses", self.expenses.as_ref()),
        ]
        .into_iter()
        .filter_map(|(role, node)| node.map(|node| (role, node)))
    }
}
