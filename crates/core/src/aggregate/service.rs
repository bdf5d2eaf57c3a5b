//! Per-node aggregation and roll-up.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::matcher::ClassifiedRecord;
use crate::record::InvalidRecordError;
use crate::taxonomy::Taxonomy;

use super::types::{NodeTotal, NodeTotals};

/// Aggregation service.
///
/// Sign normalization happens once, at the node a record lands on: amounts on
/// credit-normal nodes are negated so that every section reads positive when
/// it holds its normal balance. Each contribution is then added to its node
/// and to every ancestor, so parents always equal the sum of their children.
///
/// Sums use checked arithmetic. A contribution that would overflow any node
/// on its path is refused and leaves the totals untouched.
#[derive(Debug)]
pub struct Aggregator<'t> {
    taxonomy: &'t Taxonomy,
    sums: Vec<Decimal>,
    counts: Vec<usize>,
}

impl<'t> Aggregator<'t> {
    /// Creates an empty aggregation over `taxonomy`.
    #[must_use]
    pub fn new(taxonomy: &'t Taxonomy) -> Self {
        let len = taxonomy.len();
        Self {
            taxonomy,
            sums: vec![Decimal::ZERO; len],
            counts: vec![0; len],
        }
    }

    /// Aggregates classified records into per-node totals.
    ///
    /// Records without a node are skipped, as are records whose amount would
    /// overflow a node total. Without overflow the result does not depend on
    /// the order of `records`.
    #[must_use]
    pub fn aggregate(taxonomy: &'t Taxonomy, records: &[ClassifiedRecord]) -> NodeTotals {
        let mut aggregator = Self::new(taxonomy);
        for record in records {
            if let Err(error) = aggregator.add(std::slice::from_ref(record)) {
                warn!(error = %error, "Skipping classified record");
            }
        }
        aggregator.finish()
    }

    /// Adds every share of one input record, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRecordError::AmountOutOfRange`] when a share would
    /// overflow its node or one of the node's ancestors. The totals are left
    /// as they were.
    pub fn add(&mut self, entries: &[ClassifiedRecord]) -> Result<(), InvalidRecordError> {
        let nodes = self.taxonomy.nodes();
        let mut pending: Vec<(usize, Decimal)> = Vec::new();

        for entry in entries {
            let Some(id) = &entry.node else {
                continue;
            };
            let Some(pos) = self.taxonomy.position(id.as_str()) else {
                warn!(node = %id, "Classified record references a node outside the taxonomy");
                continue;
            };
            let contribution = entry.amount * nodes[pos].effective_sign.factor();

            for node in ancestry(self.taxonomy, pos) {
                let slot = match pending.iter().position(|(p, _)| *p == node) {
                    Some(slot) => slot,
                    None => {
                        pending.push((node, self.sums[node]));
                        pending.len() - 1
                    }
                };
                let sum = pending[slot].1.checked_add(contribution).ok_or_else(|| {
                    InvalidRecordError::AmountOutOfRange(entry.amount.to_string())
                })?;
                pending[slot].1 = sum;
            }
        }

        for (node, sum) in pending {
            self.sums[node] = sum;
        }
        for entry in entries {
            let Some(pos) = entry.node.as_ref().and_then(|id| self.taxonomy.position(id.as_str()))
            else {
                continue;
            };
            for node in ancestry(self.taxonomy, pos) {
                self.counts[node] += 1;
            }
        }
        Ok(())
    }

    /// Freezes the totals, computing formula values from the roll-ups.
    ///
    /// A formula whose value overflows is left without a value.
    #[must_use]
    pub fn finish(self) -> NodeTotals {
        let taxonomy = self.taxonomy;
        let totals: Vec<NodeTotal> = taxonomy
            .nodes()
            .iter()
            .enumerate()
            .map(|(pos, node)| NodeTotal {
                node: node.id.clone(),
                label: node.label.clone(),
                depth: node.depth,
                sum: self.sums[pos],
                record_count: self.counts[pos],
                formula_value: node.formula.as_ref().and_then(|formula| {
                    let value = formula.terms.iter().try_fold(Decimal::ZERO, |acc, term| {
                        let value = taxonomy
                            .position(term.node.as_str())
                            .map_or(Decimal::ZERO, |p| self.sums[p]);
                        if term.negated {
                            acc.checked_sub(value)
                        } else {
                            acc.checked_add(value)
                        }
                    });
                    if value.is_none() {
                        warn!(node = %node.id, "Formula value overflowed");
                    }
                    value
                }),
            })
            .collect();

        debug!(nodes = totals.len(), "Aggregation complete");
        NodeTotals::new(totals)
    }
}

/// Positions from `pos` up to its section root.
fn ancestry(taxonomy: &Taxonomy, pos: usize) -> impl Iterator<Item = usize> + '_ {
    std::iter::successors(Some(pos), move |&current| {
        taxonomy.nodes()[current]
            .parent
            .as_ref()
            .and_then(|parent| taxonomy.position(parent.as_str()))
    })
}
