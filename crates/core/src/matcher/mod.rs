//! Account matcher.
//!
//! Maps one normalized input record onto the taxonomy:
//! - Tiered precedence (exact, pattern, fallback)
//! - Ratio splits for mixed-use accounts
//! - Rejection of records with nothing to match on

pub mod engine;
pub mod split;
pub mod types;

#[cfg(test)]
mod props;

pub use engine::Matcher;
pub use split::split_amount;
pub use types::{ClassifiedRecord, Confidence, RejectedRecord};
