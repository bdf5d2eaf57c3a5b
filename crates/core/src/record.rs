//! Normalized input records.
//!
//! Format adapters turn raw ledger exports into [`InputRecord`]s; from here on
//! the engine never looks at the original file again.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters treated as separators inside account codes.
const CODE_SEPARATORS: &[char] = &['-', '.', '/', '\\', ' ', ',', ';', ':', '|'];

/// A record that cannot enter classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRecordError {
    /// Neither a code nor a description is present.
    #[error("Record has neither an account code nor a description")]
    MissingIdentity,

    /// Amount is NaN or infinite.
    #[error("Amount is not a finite number: {0}")]
    NonFiniteAmount(String),

    /// Amount does not fit the decimal range.
    #[error("Amount is out of range: {0}")]
    AmountOutOfRange(String),
}

/// One normalized account line.
///
/// Sign convention: positive amounts are debit balances, negative amounts are
/// credit balances, as exported by the source ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Account code as it appeared in the source, if any.
    #[serde(default, alias = "codice")]
    pub code: Option<String>,
    /// Free-text account description.
    #[serde(default, alias = "descrizione")]
    pub description: String,
    /// Signed balance.
    #[serde(alias = "valore", alias = "importo", alias = "saldo")]
    pub amount: Decimal,
}

impl InputRecord {
    /// Creates a record from already-parsed parts.
    #[must_use]
    pub fn new(code: Option<&str>, description: &str, amount: Decimal) -> Self {
        Self {
            code: code.map(str::to_string),
            description: description.to_string(),
            amount,
        }
    }

    /// Creates a record from a floating-point amount, as produced by
    /// spreadsheet-like sources.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRecordError::NonFiniteAmount`] for NaN or infinity and
    /// [`InvalidRecordError::AmountOutOfRange`] when the value does not fit a
    /// `Decimal`.
    pub fn from_float(
        code: Option<&str>,
        description: &str,
        amount: f64,
    ) -> Result<Self, InvalidRecordError> {
        if !amount.is_finite() {
            return Err(InvalidRecordError::NonFiniteAmount(amount.to_string()));
        }
        let amount = Decimal::from_f64(amount)
            .ok_or_else(|| InvalidRecordError::AmountOutOfRange(amount.to_string()))?;
        Ok(Self::new(code, description, amount))
    }

    /// Returns the normalized code, or `None` when the record has no usable code.
    #[must_use]
    pub fn normalized_code(&self) -> Option<String> {
        self.code
            .as_deref()
            .map(normalize_code)
            .filter(|code| !code.is_empty())
    }

    /// Checks that the record carries something to match on.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRecordError::MissingIdentity`] when both the code and
    /// the description are blank.
    pub fn ensure_classifiable(&self) -> Result<(), InvalidRecordError> {
        if self.normalized_code().is_none() && self.description.trim().is_empty() {
            return Err(InvalidRecordError::MissingIdentity);
        }
        Ok(())
    }
}

/// Normalizes an account code to the `X_Y_Z` form.
///
/// Separators become `_`, repeated `_` collapse, leading and trailing `_` are
/// dropped and letters are upper-cased, so `"1-6.10"`, `" 1/6/10 "` and
/// `"1__6_10"` all compare equal.
#[must_use]
pub fn normalize_code(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        let c = if CODE_SEPARATORS.contains(&c) { '_' } else { c };
        if c == '_' && (normalized.is_empty() || normalized.ends_with('_')) {
            continue;
        }
        normalized.extend(c.to_uppercase());
    }
    while normalized.ends_with('_') {
        normalized.pop();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("1-6-10", "1_6_10")]
    #[case(" 1.6.10 ", "1_6_10")]
    #[case("1/6\\10", "1_6_10")]
    #[case("1__6__10", "1_6_10")]
    #[case("-1-6-", "1_6")]
    #[case("a10", "A10")]
    #[case("1 | 2 ; 3", "1_2_3")]
    #[case("", "")]
    #[case(" - ", "")]
    fn test_normalize_code(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_code(raw), expected);
    }

    #[test]
    fn test_blank_code_is_none() {
        let record = InputRecord::new(Some(" - "), "Cassa", dec!(10));
        assert_eq!(record.normalized_code(), None);
    }

    #[test]
    fn test_missing_identity_is_rejected() {
        let record = InputRecord::new(None, "   ", dec!(10));
        assert_eq!(
            record.ensure_classifiable(),
            Err(InvalidRecordError::MissingIdentity)
        );
    }

    #[test]
    fn test_description_only_is_classifiable() {
        let record = InputRecord::new(None, "Banca c/c", dec!(10));
        assert!(record.ensure_classifiable().is_ok());
    }

    #[test]
    fn test_from_float_rejects_non_finite() {
        assert!(matches!(
            InputRecord::from_float(Some("1"), "x", f64::NAN),
            Err(InvalidRecordError::NonFiniteAmount(_))
        ));
        assert!(matches!(
            InputRecord::from_float(Some("1"), "x", f64::INFINITY),
            Err(InvalidRecordError::NonFiniteAmount(_))
        ));
    }

    #[test]
    fn test_from_float_accepts_finite() {
        let record = InputRecord::from_float(Some("1"), "x", 12.5).unwrap();
        assert_eq!(record.amount, dec!(12.5));
    }

    #[test]
    fn test_deserializes_italian_field_names() {
        let record: InputRecord =
            serde_json::from_str(r#"{"codice":"1_1_1","descrizione":"Cassa","valore":"100.50"}"#)
                .unwrap();
        assert_eq!(record.code.as_deref(), Some("1_1_1"));
        assert_eq!(record.description, "Cassa");
        assert_eq!(record.amount, dec!(100.50));
    }
}
