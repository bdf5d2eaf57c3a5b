//! Classification pipeline: Matcher, Aggregator, Validator.

use bilancio_shared::ClassifierConfig;
use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::aggregate::{Aggregator, NodeTotals};
use crate::matcher::{ClassifiedRecord, Matcher, RejectedRecord};
use crate::record::{InputRecord, InvalidRecordError};
use crate::taxonomy::{NodeId, Taxonomy};
use crate::validation::{BalanceValidator, DEFAULT_TOLERANCE, Severity, ValidationIssue};

use super::types::{ClassificationReport, ReportParts, ReportSummary};

/// Default batch size from which the matcher stage runs in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

/// Pipeline tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Rounding tolerance for validation.
    pub tolerance: Decimal,
    /// Batches with at least this many records are matched on the rayon pool.
    pub parallel_threshold: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl From<&ClassifierConfig> for PipelineOptions {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            parallel_threshold: config.parallel_threshold,
        }
    }
}

/// Runs one batch through every stage.
///
/// Stages are strictly sequential: aggregation needs the complete set of
/// classifications and validation needs complete totals. Only the matcher
/// stage fans out, and it keeps input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassificationPipeline {
    options: PipelineOptions,
}

impl ClassificationPipeline {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Pipeline options.
    #[must_use]
    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Classifies a batch and builds its report.
    ///
    /// Never fails: invalid records, and records whose amount would overflow
    /// a node total, are listed as rejected; accounting problems are reported
    /// as issues.
    #[must_use]
    pub fn run(&self, taxonomy: &Taxonomy, records: &[InputRecord]) -> ClassificationReport {
        let outcomes = self.match_all(taxonomy, records);

        let mut aggregator = Aggregator::new(taxonomy);
        let mut classifications = Vec::with_capacity(records.len());
        let mut unmatched = Vec::new();
        let mut rejected = Vec::new();

        for (index, (record, outcome)) in records.iter().zip(outcomes).enumerate() {
            match outcome.and_then(|entries| aggregator.add(&entries).map(|()| entries)) {
                Ok(entries) => {
                    if entries.iter().any(ClassifiedRecord::is_unmatched) {
                        unmatched.push(record.clone());
                    }
                    classifications.extend(entries);
                }
                Err(error) => {
                    warn!(index, error = %error, "Record rejected");
                    rejected.push(RejectedRecord::new(index, record.clone(), &error));
                }
            }
        }

        let totals = aggregator.finish();
        let issues = BalanceValidator::new(self.options.tolerance).validate(taxonomy, &totals);
        let summary = summarize(taxonomy, &totals, &issues, records.len(), &unmatched, &rejected);

        let report = ClassificationReport::new(
            ReportParts {
                taxonomy: taxonomy.name().to_string(),
                totals,
                issues,
                unmatched,
                rejected,
                classifications,
            },
            summary,
        );

        info!(
            run_id = %report.run_id(),
            taxonomy = %report.taxonomy(),
            processed = report.summary().records_processed,
            unmatched = report.summary().records_unmatched,
            rejected = report.summary().records_rejected,
            issues = report.issues().len(),
            balanced = report.summary().is_balanced,
            "Classification run complete"
        );
        report
    }

    fn match_all(
        &self,
        taxonomy: &Taxonomy,
        records: &[InputRecord],
    ) -> Vec<Result<Vec<ClassifiedRecord>, InvalidRecordError>> {
        let matcher = Matcher::new(taxonomy);
        if records.len() >= self.options.parallel_threshold {
            records.par_iter().map(|record| matcher.classify(record)).collect()
        } else {
            records.iter().map(|record| matcher.classify(record)).collect()
        }
    }
}

fn summarize(
    taxonomy: &Taxonomy,
    totals: &NodeTotals,
    issues: &[ValidationIssue],
    processed: usize,
    unmatched: &[InputRecord],
    rejected: &[RejectedRecord],
) -> ReportSummary {
    let roles = taxonomy.roles();
    let role_sum = |role: Option<&NodeId>| {
        role.map_or(Decimal::ZERO, |id| totals.sum_of(id.as_str()))
    };
    let net_result = match (&roles.income, &roles.expenses) {
        (Some(income), Some(expenses)) => {
            Some(
                totals
                    .sum_of(income.as_str())
                    .saturating_sub(totals.sum_of(expenses.as_str())),
            )
        }
        _ => None,
    };

    ReportSummary {
        total_assets: role_sum(roles.assets.as_ref()),
        total_liabilities: role_sum(roles.liabilities.as_ref()),
        total_equity: role_sum(roles.equity.as_ref()),
        net_result,
        records_processed: processed,
        records_unmatched: unmatched.len(),
        records_rejected: rejected.len(),
        is_balanced: !issues.iter().any(|issue| issue.severity == Severity::Error),
    }
}
