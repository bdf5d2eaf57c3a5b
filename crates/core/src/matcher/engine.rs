//! Tiered account matcher.

use tracing::trace;

use crate::record::{InputRecord, InvalidRecordError};
use crate::taxonomy::{Allocation, IndexedRule, MatchKey, Taxonomy};

use super::split::split_amount;
use super::types::{ClassifiedRecord, Confidence};

/// Classifies records against one taxonomy.
///
/// Precedence, first satisfied tier wins:
/// 1. exact: the normalized code has a lookup, per-node code or split entry
/// 2. pattern: prefix rules (longest first), then code patterns, then
///    description keywords and patterns; ties go to the earlier declaration
/// 3. fallback: the unclassified node, or no node at all
///
/// The matcher holds no state besides the taxonomy reference, so it can be
/// shared freely across threads.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'t> {
    taxonomy: &'t Taxonomy,
}

impl<'t> Matcher<'t> {
    /// Creates a matcher over `taxonomy`.
    #[must_use]
    pub fn new(taxonomy: &'t Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// The taxonomy this matcher classifies into.
    #[must_use]
    pub fn taxonomy(&self) -> &'t Taxonomy {
        self.taxonomy
    }

    /// Classifies one record.
    ///
    /// Returns one entry per receiving node: a single entry unless a split
    /// rule applies.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRecordError::MissingIdentity`] when the record has
    /// neither a code nor a description.
    pub fn classify(
        &self,
        record: &InputRecord,
    ) -> Result<Vec<ClassifiedRecord>, InvalidRecordError> {
        record.ensure_classifiable()?;

        let code = record.normalized_code();
        let key = MatchKey::new(code.as_deref(), &record.description);

        if let Some(indexed) = code.as_deref().and_then(|c| self.taxonomy.exact_rule(c)) {
            if let Some(classified) = emit(record, &key, indexed, Confidence::Exact) {
                return Ok(classified);
            }
        }

        for indexed in self.taxonomy.pattern_rules() {
            if let Some(classified) = emit(record, &key, indexed, Confidence::Pattern) {
                return Ok(classified);
            }
        }

        trace!(code = ?code, description = %record.description, "No rule matched");
        Ok(vec![ClassifiedRecord {
            source: record.clone(),
            node: self.taxonomy.unclassified().cloned(),
            confidence: Confidence::Fallback,
            amount: record.amount,
            rule: None,
        }])
    }
}

fn emit(
    record: &InputRecord,
    key: &MatchKey<'_>,
    indexed: &IndexedRule,
    confidence: Confidence,
) -> Option<Vec<ClassifiedRecord>> {
    let classified = match indexed.rule.apply(key)? {
        Allocation::Single(node) => vec![ClassifiedRecord {
            source: record.clone(),
            node: Some(node.clone()),
            confidence,
            amount: record.amount,
            rule: Some(indexed.index),
        }],
        Allocation::Split(shares) => {
            let ratios: Vec<_> = shares.iter().map(|share| share.ratio).collect();
            shares
                .iter()
                .zip(split_amount(record.amount, &ratios))
                .map(|(share, amount)| ClassifiedRecord {
                    source: record.clone(),
                    node: Some(share.node.clone()),
                    confidence,
                    amount,
                    rule: Some(indexed.index),
                })
                .collect()
        }
    };
    Some(classified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::taxonomy::NodeId;

    fn taxonomy(source: &str) -> Taxonomy {
        Taxonomy::from_toml_str(source).unwrap()
    }

    fn node_of(classified: &[ClassifiedRecord]) -> Option<&str> {
        classified[0].node.as_ref().map(NodeId::as_str)
    }

    const PREFIXES: &str = r#"
        name = "prefixes"

        [[nodes]]
        id = "short"
        prefixes = ["A10"]

        [[nodes]]
        id = "long"
        prefixes = ["A100"]

        [[nodes]]
        id = "by_code"
        codes = ["A100"]
        keywords = ["cassa"]
    "#;

    #[test]
    fn test_longest_prefix_wins() {
        let taxonomy = taxonomy(
            r#"
            name = "d"
            [[nodes]]
            id = "short"
            prefixes = ["A10"]
            [[nodes]]
            id = "long"
            prefixes = ["A100"]
            "#,
        );
        let matcher = Matcher::new(&taxonomy);

        let result = matcher
            .classify(&InputRecord::new(Some("A100"), "", dec!(1)))
            .unwrap();
        assert_eq!(node_of(&result), Some("long"));
        assert_eq!(result[0].confidence, Confidence::Pattern);

        let result = matcher
            .classify(&InputRecord::new(Some("A105"), "", dec!(1)))
            .unwrap();
        assert_eq!(node_of(&result), Some("short"));
    }

    #[test]
    fn test_exact_outranks_patterns() {
        let taxonomy = taxonomy(PREFIXES);
        let result = Matcher::new(&taxonomy)
            .classify(&InputRecord::new(Some(" a100 "), "Cassa", dec!(5)))
            .unwrap();
        assert_eq!(node_of(&result), Some("by_code"));
        assert_eq!(result[0].confidence, Confidence::Exact);
        assert_eq!(result[0].rule, Some(2));
    }

    #[test]
    fn test_code_rules_outrank_description_rules() {
        let taxonomy = taxonomy(PREFIXES);
        let result = Matcher::new(&taxonomy)
            .classify(&InputRecord::new(Some("A101"), "Cassa", dec!(5)))
            .unwrap();
        assert_eq!(node_of(&result), Some("short"));
    }

    #[test]
    fn test_description_only_record() {
        let taxonomy = taxonomy(PREFIXES);
        let result = Matcher::new(&taxonomy)
            .classify(&InputRecord::new(None, "CASSA contanti", dec!(5)))
            .unwrap();
        assert_eq!(node_of(&result), Some("by_code"));
        assert_eq!(result[0].confidence, Confidence::Pattern);
    }

    #[test]
    fn test_fallback_without_unclassified_node() {
        let taxonomy = taxonomy(PREFIXES);
        let result = Matcher::new(&taxonomy)
            .classify(&InputRecord::new(Some("X9"), "Unknown Thing", dec!(30)))
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].node, None);
        assert_eq!(result[0].confidence, Confidence::Fallback);
        assert_eq!(result[0].amount, dec!(30));
        assert!(result[0].is_unmatched());
    }

    #[test]
    fn test_fallback_to_unclassified_node() {
        let taxonomy = taxonomy(
            r#"
            name = "u"
            unclassified = "other"
            [[nodes]]
            id = "cash"
            keywords = ["cash"]
            [[nodes]]
            id = "other"
            "#,
        );
        let result = Matcher::new(&taxonomy)
            .classify(&InputRecord::new(Some("X9"), "Unknown", dec!(30)))
            .unwrap();
        assert_eq!(node_of(&result), Some("other"));
        assert_eq!(result[0].confidence, Confidence::Fallback);
    }

    #[test]
    fn test_missing_identity_is_rejected() {
        let taxonomy = taxonomy(PREFIXES);
        let result = Matcher::new(&taxonomy).classify(&InputRecord::new(Some(" "), "", dec!(1)));
        assert_eq!(result, Err(InvalidRecordError::MissingIdentity));
    }

    #[test]
    fn test_split_rule() {
        let taxonomy = taxonomy(
            r#"
            name = "s"
            [[nodes]]
            id = "auto"
            [[nodes]]
            id = "personal"

            [[split]]
            code = "6.10"
            shares = [{ node = "auto", ratio = "0.7" }, { node = "personal", ratio = "0.3" }]
            "#,
        );
        let result = Matcher::new(&taxonomy)
            .classify(&InputRecord::new(Some("6-10"), "Auto aziendale", dec!(100.01)))
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].node.as_ref().map(NodeId::as_str), Some("auto"));
        assert_eq!(result[1].node.as_ref().map(NodeId::as_str), Some("personal"));
        assert!(result.iter().all(|c| c.confidence == Confidence::Exact));
        assert_eq!(result.iter().map(|c| c.amount).sum::<Decimal>(), dec!(100.01));
        assert_eq!(result[0].amount, dec!(70.01));
        assert_eq!(result[1].amount, dec!(30.00));
    }

    #[test]
    fn test_builtin_schema_examples() {
        let taxonomy = crate::taxonomy::builtin_cee().unwrap();
        let matcher = Matcher::new(&taxonomy);
        let classify = |code: Option<&str>, description: &str| {
            let result = matcher
                .classify(&InputRecord::new(code, description, dec!(1)))
                .unwrap();
            result[0].node.as_ref().map(|n| n.as_str().to_string())
        };

        assert_eq!(classify(Some("1-6-10"), "Fabbricati"), Some("attivo.b.ii.1".into()));
        assert_eq!(classify(Some("1.6.1"), "Impianti"), Some("attivo.b.ii.2".into()));
        assert_eq!(classify(Some("1/2/1"), ""), Some("attivo.c.iv".into()));
        assert_eq!(classify(Some("2-9-3"), ""), Some("attivo.b.ii.fondi".into()));
        assert_eq!(classify(None, "Ammortamento impianti"), Some("ce.b.10".into()));
        assert_eq!(classify(None, "Debiti verso banche"), Some("passivo.d".into()));
        assert_eq!(classify(None, "Banca Intesa c/c"), Some("attivo.c.iv".into()));
        assert_eq!(classify(Some("99"), "Boh"), Some("non_classificati".into()));
    }
}
