//! Core classification logic for Bilancio.
//!
//! This crate contains pure business logic with no web or file-format
//! dependencies. Trial-balance records go in, a classification report with
//! per-node totals and balance checks comes out.
//!
//! # Modules
//!
//! - `record` - Input records and account code normalization
//! - `taxonomy` - Reporting schemas: loading, validation, hot reload
//! - `matcher` - Tiered rule matching and split allocation
//! - `aggregate` - Bottom-up roll-up of classified amounts
//! - `validation` - Accounting identity and formula checks
//! - `report` - Classification pipeline and its immutable report

pub mod aggregate;
pub mod error;
pub mod matcher;
pub mod record;
pub mod report;
pub mod taxonomy;
pub mod validation;

pub use aggregate::{Aggregator, NodeTotal, NodeTotals};
pub use matcher::{ClassifiedRecord, Confidence, Matcher, RejectedRecord};
pub use record::{InputRecord, InvalidRecordError, normalize_code};
pub use report::{ClassificationPipeline, ClassificationReport, PipelineOptions, ReportSummary};
pub use taxonomy::{SchemaError, Taxonomy, TaxonomyStore};
pub use validation::{BalanceValidator, Severity, ValidationIssue};
