//! Classification runs and their reports.
//!
//! - Pipeline driving Matcher, Aggregator and Validator over one batch
//! - Immutable report with totals, issues, unmatched and rejected records
//! - Summary metrics

pub mod pipeline;
pub mod types;


pub use pipeline::{ClassificationPipeline, DEFAULT_PARALLEL_THRESHOLD, PipelineOptions};
pub use types::{ClassificationReport, ReportParts, ReportSummary};
