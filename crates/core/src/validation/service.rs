//! Balance and formula checks.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::aggregate::NodeTotals;
use crate::taxonomy::{NodeId, Taxonomy};

use super::types::{Severity, ValidationIssue};

/// Default rounding tolerance (one cent).
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Checks aggregated totals against the taxonomy's accounting identities.
///
/// Order of the returned issues: the balance identity first, then formula
/// checks in taxonomy order. Differences within the tolerance are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceValidator {
    tolerance: Decimal,
}

impl Default for BalanceValidator {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl BalanceValidator {
    /// Creates a validator; negative tolerances count as zero.
    #[must_use]
    pub fn new(tolerance: Decimal) -> Self {
        Self {
            tolerance: tolerance.max(Decimal::ZERO),
        }
    }

    /// Configured tolerance.
    #[must_use]
    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    /// Runs every check.
    #[must_use]
    pub fn validate(&self, taxonomy: &Taxonomy, totals: &NodeTotals) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if let Some(issue) = self.check_balance_identity(taxonomy, totals) {
            issues.push(issue);
        }

        for node in taxonomy.nodes() {
            let Some(formula) = &node.formula else {
                continue;
            };
            let Some(total) = totals.get(node.id.as_str()) else {
                continue;
            };
            let Some(expected) = total.formula_value else {
                warn!(node = %node.id, "Formula has no value, skipping check");
                continue;
            };
            let severity = if node.critical {
                Severity::Error
            } else {
                Severity::Warning
            };
            if let Some(issue) = self.compare(
                format!("{}: {}", node.id, formula.source),
                Some(node.id.clone()),
                expected,
                total.sum,
                severity,
            ) {
                issues.push(issue);
            }
        }

        debug!(issues = issues.len(), "Validation complete");
        issues
    }

    /// Assets = Liabilities + Equity, extended with Income - Expenses when
    /// both period roles are declared.
    fn check_balance_identity(
        &self,
        taxonomy: &Taxonomy,
        totals: &NodeTotals,
    ) -> Option<ValidationIssue> {
        let roles = taxonomy.roles();
        let assets = roles.assets.as_ref()?;
        if roles.liabilities.is_none() && roles.equity.is_none() {
            return None;
        }

        let sum = |role: Option<&NodeId>| {
            role.map_or(Decimal::ZERO, |id| totals.sum_of(id.as_str()))
        };
        let mut expected =
            sum(roles.liabilities.as_ref()).saturating_add(sum(roles.equity.as_ref()));
        let mut rule = String::from("Assets = Liabilities + Equity");

        if let (Some(income), Some(expenses)) = (&roles.income, &roles.expenses) {
            let net = totals
                .sum_of(income.as_str())
                .saturating_sub(totals.sum_of(expenses.as_str()));
            expected = expected.saturating_add(net);
            rule.push_str(" + Income - Expenses");
        }

        self.compare(
            rule,
            Some(assets.clone()),
            expected,
            totals.sum_of(assets.as_str()),
            Severity::Error,
        )
    }

    fn compare(
        &self,
        rule: String,
        node: Option<NodeId>,
        expected: Decimal,
        actual: Decimal,
        severity: Severity,
    ) -> Option<ValidationIssue> {
        let delta = actual.saturating_sub(expected);
        (delta.abs() > self.tolerance).then_some(ValidationIssue {
            rule,
            node,
            expected,
            actual,
            delta,
            severity,
        })
    }
}
