//! Validation output types.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::taxonomy::NodeId;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth a look; the statement may still be usable.
    Warning,
    /// The statement does not hold together.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A violated accounting identity.
///
/// Issues are findings about the data, not errors: a run that produces them
/// still returns a complete report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// The identity that does not hold.
    pub rule: String,
    /// Node the identity is anchored on.
    pub node: Option<NodeId>,
    /// Value the identity requires.
    pub expected: Decimal,
    /// Value found.
    pub actual: Decimal,
    /// `actual - expected`.
    pub delta: Decimal,
    /// Severity.
    pub severity: Severity,
}

impl ValidationIssue {
    /// Whether this issue is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
