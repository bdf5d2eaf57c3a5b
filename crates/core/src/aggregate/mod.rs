//! Aggregation of classified records into per-node totals.

pub mod service;
pub mod types;

#[cfg(test)]
mod props;

pub use service::Aggregator;
pub use types::{NodeTotal, NodeTotals};
