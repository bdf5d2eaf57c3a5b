//! Property-based tests for the matcher.
//!
//! - Idempotence: classifying the same record twice gives the same result
//! - Coverage: a declared exact code always classifies as exact
//! - Split parts always add up to the source amount

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::engine::Matcher;
use super::split::split_amount;
use super::types::Confidence;
use crate::record::InputRecord;
use crate::taxonomy::{Taxonomy, builtin_cee};

const EXACT_CODES: &[&str] = &["1_1_1", "1_6_10", "2_9_3", "4_1_1"];

fn exact_taxonomy() -> Taxonomy {
    Taxonomy::from_toml_str(
        r#"
        name = "exact"

        [[nodes]]
        id = "cassa"
        codes = ["1.1.1"]
        prefixes = ["1"]
        keywords = ["cassa", "banca"]

        [[nodes]]
        id = "fabbricati"
        codes = ["1-6-10"]
        code_patterns = ["^1_6"]

        [[nodes]]
        id = "fondi"
        codes = ["2/9/3"]
        prefixes = ["2_9"]

        [[split]]
        code = "4 1 1"
        shares = [{ node = "cassa", ratio = "0.25" }, { node = "fondi", ratio = "0.75" }]
        "#,
    )
    .unwrap()
}

/// Strategy for signed amounts with 0 to 4 decimal places.
fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..10_000_000i64, 0u32..=4).prop_map(|(units, scale)| Decimal::new(units, scale))
}

/// Strategy for account codes with mixed separators.
fn account_code() -> impl Strategy<Value = String> {
    prop::collection::vec(1u32..20, 1..4).prop_flat_map(|parts| {
        prop_oneof![Just("-"), Just("."), Just("_"), Just("/"), Just(" ")]
            .prop_map(move |sep| {
                parts
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(sep)
            })
    })
}

/// Strategy for ratios that add up to exactly one.
fn ratios() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(1u32..100, 1..6).prop_map(|weights| {
        let total: u32 = weights.iter().sum();
        let mut ratios: Vec<Decimal> = weights
            .iter()
            .map(|w| Decimal::from(*w) / Decimal::from(total))
            .collect();
        let head: Decimal = ratios[..ratios.len() - 1].iter().copied().sum();
        if let Some(last) = ratios.last_mut() {
            *last = Decimal::ONE - head;
        }
        ratios
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Classifying the same record twice yields identical output.
    #[test]
    fn prop_classify_is_idempotent(
        code in proptest::option::of(account_code()),
        description in "[a-zA-Z ]{0,20}",
        amount in signed_amount(),
    ) {
        let taxonomy = builtin_cee().unwrap();
        let matcher = Matcher::new(&taxonomy);
        let record = InputRecord::new(code.as_deref(), &description, amount);

        let first = matcher.classify(&record);
        let second = matcher.classify(&record);
        prop_assert_eq!(first, second);
    }

    /// A record whose code is declared exactly is never a pattern or fallback.
    #[test]
    fn prop_exact_code_is_always_exact(
        idx in 0usize..EXACT_CODES.len(),
        sep in prop_oneof![Just("-"), Just("."), Just(" / "), Just("_")],
        description in "[a-z ]{0,20}",
        amount in signed_amount(),
    ) {
        let taxonomy = exact_taxonomy();
        let code = EXACT_CODES[idx].replace('_', sep);
        let record = InputRecord::new(Some(&code), &description, amount);

        let classified = Matcher::new(&taxonomy).classify(&record).unwrap();
        prop_assert!(!classified.is_empty());
        for entry in &classified {
            prop_assert_eq!(entry.confidence, Confidence::Exact);
        }
        let total: Decimal = classified.iter().map(|c| c.amount).sum();
        prop_assert_eq!(total, amount);
    }

    /// Split parts sum exactly to the source amount.
    #[test]
    fn prop_split_preserves_total(
        amount in signed_amount(),
        ratios in ratios(),
    ) {
        let parts = split_amount(amount, &ratios);
        prop_assert_eq!(parts.len(), ratios.len());
        prop_assert_eq!(parts.iter().copied().sum::<Decimal>(), amount);
    }
}
