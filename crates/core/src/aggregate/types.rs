//! Aggregation output types.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::taxonomy::NodeId;

/// Aggregated figures for one taxonomy node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeTotal {
    /// Node id.
    pub node: NodeId,
    /// Node label, copied for export.
    pub label: String,
    /// Depth in the taxonomy.
    pub depth: usize,
    /// Sign-normalized roll-up: leaf amounts, or the sum of the children.
    pub sum: Decimal,
    /// Classified entries contributing to this node or its descendants.
    pub record_count: usize,
    /// Value of the node's subtotal formula, if it has one.
    pub formula_value: Option<Decimal>,
}

/// Totals for every node, in taxonomy order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTotals {
    totals: Vec<NodeTotal>,
    index: HashMap<NodeId, usize>,
}

impl NodeTotals {
    /// Wraps totals already in taxonomy order.
    #[must_use]
    pub fn new(totals: Vec<NodeTotal>) -> Self {
        let index = totals
            .iter()
            .enumerate()
            .map(|(pos, total)| (total.node.clone(), pos))
            .collect();
        Self { totals, index }
    }

    /// Total for a node.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&NodeTotal> {
        self.index.get(id).map(|&pos| &self.totals[pos])
    }

    /// Roll-up sum for a node, zero when the node is unknown.
    #[must_use]
    pub fn sum_of(&self, id: &str) -> Decimal {
        self.get(id).map_or(Decimal::ZERO, |total| total.sum)
    }

    /// Totals in taxonomy order.
    pub fn iter(&self) -> std::slice::Iter<'_, NodeTotal> {
        self.totals.iter()
    }

    /// Totals in taxonomy order.
    #[must_use]
    pub fn as_slice(&self) -> &[NodeTotal] {
        &self.totals
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Whether there are no totals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

impl<'a> IntoIterator for &'a NodeTotals {
    type Item = &'a NodeTotal;
    type IntoIter = std::slice::Iter<'a, NodeTotal>;

    fn into_iter(self) -> Self::IntoIter {
        self.totals.iter()
    }
}

impl Serialize for NodeTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.totals.serialize(serializer)
    }
}
