//! Balance validation.
//!
//! Checks aggregated totals against accounting identities:
//! - Assets = Liabilities + Equity (error)
//! - Subtotal formulas against roll-ups (warning, or error when critical)
//!
//! The validator reports; it never adjusts totals.

pub mod service;
pub mod types;


pub use service::{BalanceValidator, DEFAULT_TOLERANCE};
pub use types::{Severity, ValidationIssue};
