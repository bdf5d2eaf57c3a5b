//! Classification report.

use bilancio_shared::RunId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::NodeTotals;
use crate::matcher::{ClassifiedRecord, RejectedRecord};
use crate::record::InputRecord;
use crate::validation::{Severity, ValidationIssue};

/// Headline figures of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Roll-up of the assets role, zero when not declared.
    pub total_assets: Decimal,
    /// Roll-up of the liabilities role, zero when not declared.
    pub total_liabilities: Decimal,
    /// Roll-up of the equity role, zero when not declared.
    pub total_equity: Decimal,
    /// Income minus expenses, when both roles are declared.
    pub net_result: Option<Decimal>,
    /// Records in the input batch.
    pub records_processed: usize,
    /// Records no rule matched.
    pub records_unmatched: usize,
    /// Records rejected as invalid.
    pub records_rejected: usize,
    /// No error-severity issue was raised.
    pub is_balanced: bool,
}

/// Immutable result of one classification run.
///
/// This is the only artifact handed to export and rendering collaborators;
/// everything in it is already computed.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    run_id: RunId,
    taxonomy: String,
    generated_at: DateTime<Utc>,
    summary: ReportSummary,
    totals: NodeTotals,
    issues: Vec<ValidationIssue>,
    unmatched: Vec<InputRecord>,
    rejected: Vec<RejectedRecord>,
    classifications: Vec<ClassifiedRecord>,
}

/// Parts a report is assembled from.
#[derive(Debug, Clone)]
pub struct ReportParts {
    /// Taxonomy name.
    pub taxonomy: String,
    /// Per-node totals in taxonomy order.
    pub totals: NodeTotals,
    /// Validation findings, in check order.
    pub issues: Vec<ValidationIssue>,
    /// Unmatched records, in input order.
    pub unmatched: Vec<InputRecord>,
    /// Rejected records, in input order.
    pub rejected: Vec<RejectedRecord>,
    /// Every classification, in input order.
    pub classifications: Vec<ClassifiedRecord>,
}

impl ClassificationReport {
    /// Freezes the parts of a run into a report.
    #[must_use]
    pub fn new(parts: ReportParts, summary: ReportSummary) -> Self {
        Self {
            run_id: RunId::new(),
            taxonomy: parts.taxonomy,
            generated_at: Utc::now(),
            summary,
            totals: parts.totals,
            issues: parts.issues,
            unmatched: parts.unmatched,
            rejected: parts.rejected,
            classifications: parts.classifications,
        }
    }

    /// Unique id of the run.
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Name of the taxonomy used.
    #[must_use]
    pub fn taxonomy(&self) -> &str {
        &self.taxonomy
    }

    /// When the report was built.
    #[must_use]
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Summary metrics.
    #[must_use]
    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    /// Per-node totals in taxonomy order.
    #[must_use]
    pub fn totals(&self) -> &NodeTotals {
        &self.totals
    }

    /// Validation issues.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Records no rule matched, in input order.
    #[must_use]
    pub fn unmatched(&self) -> &[InputRecord] {
        &self.unmatched
    }

    /// Records rejected as invalid, in input order.
    #[must_use]
    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    /// Audit trail of every classification.
    #[must_use]
    pub fn classifications(&self) -> &[ClassifiedRecord] {
        &self.classifications
    }

    /// Issues of the given severity.
    pub fn issues_with(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |issue| issue.severity == severity)
    }
}
