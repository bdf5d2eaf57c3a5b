//! Property-based tests for aggregation.
//!
//! - Order independence: permuting the classified records changes nothing
//! - Roll-up consistency: every parent equals the sum of its children

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::Aggregator;
use crate::matcher::{ClassifiedRecord, Confidence};
use crate::record::InputRecord;
use crate::taxonomy::{ExpectedSign, NodeDefinition, NodeId, SchemaDefinition, Taxonomy};

/// Strategy for a random forest: entry `i` is the parent choice for node `i`,
/// either a root or one of the earlier nodes.
fn forest() -> impl Strategy<Value = Vec<(Option<usize>, ExpectedSign)>> {
    prop::collection::vec(
        (
            any::<prop::sample::Index>(),
            any::<bool>(),
            prop_oneof![
                Just(ExpectedSign::Debit),
                Just(ExpectedSign::Credit),
                Just(ExpectedSign::Either),
            ],
        ),
        1..25,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (index, is_root, sign))| {
                let parent = if i == 0 || is_root {
                    None
                } else {
                    Some(index.index(i))
                };
                (parent, sign)
            })
            .collect()
    })
}

fn build(forest: &[(Option<usize>, ExpectedSign)]) -> Taxonomy {
    let nodes = forest
        .iter()
        .enumerate()
        .map(|(i, (parent, sign))| NodeDefinition {
            id: format!("n{i}"),
            parent: parent.map(|p| format!("n{p}")),
            sign: *sign,
            ..NodeDefinition::default()
        })
        .collect();
    Taxonomy::load(SchemaDefinition {
        name: "random".to_string(),
        nodes,
        ..SchemaDefinition::default()
    })
    .unwrap()
}

fn records(taxonomy: &Taxonomy, picks: &[(prop::sample::Index, i64)]) -> Vec<ClassifiedRecord> {
    let leaves: Vec<&NodeId> = taxonomy
        .nodes()
        .iter()
        .filter(|n| taxonomy.is_leaf(n.id.as_str()))
        .map(|n| &n.id)
        .collect();
    picks
        .iter()
        .map(|(index, cents)| {
            let amount = Decimal::new(*cents, 2);
            ClassifiedRecord {
                source: InputRecord::new(None, "x", amount),
                node: Some(leaves[index.index(leaves.len())].clone()),
                confidence: Confidence::Pattern,
                amount,
                rule: None,
            }
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Aggregating a permutation of the records gives identical totals.
    #[test]
    fn prop_aggregate_is_order_independent(
        forest in forest(),
        picks in prop::collection::vec(
            (any::<prop::sample::Index>(), -1_000_000i64..1_000_000i64),
            0..40,
        ),
        seed in any::<u64>(),
    ) {
        let taxonomy = build(&forest);
        let records = records(&taxonomy, &picks);

        let mut shuffled = records.clone();
        // Deterministic permutation derived from the seed.
        let len = shuffled.len();
        if len > 1 {
            let mut state = seed;
            for i in (1..len).rev() {
                state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                let j = usize::try_from(state >> 33).unwrap_or(0) % (i + 1);
                shuffled.swap(i, j);
            }
        }

        let original = Aggregator::aggregate(&taxonomy, &records);
        let permuted = Aggregator::aggregate(&taxonomy, &shuffled);
        prop_assert_eq!(original, permuted);
    }

    /// Every non-leaf node sums to exactly the sum of its direct children.
    #[test]
    fn prop_rollup_equals_children(
        forest in forest(),
        picks in prop::collection::vec(
            (any::<prop::sample::Index>(), -1_000_000i64..1_000_000i64),
            0..40,
        ),
    ) {
        let taxonomy = build(&forest);
        let totals = Aggregator::aggregate(&taxonomy, &records(&taxonomy, &picks));

        for node in taxonomy.nodes() {
            if taxonomy.is_leaf(node.id.as_str()) {
                continue;
            }
            let children: Decimal = taxonomy
                .children(node.id.as_str())
                .map(|child| totals.sum_of(child.id.as_str()))
                .sum();
            prop_assert_eq!(totals.sum_of(node.id.as_str()), children);
        }
    }

    /// The grand total over section roots equals the sign-normalized input.
    #[test]
    fn prop_roots_account_for_every_record(
        forest in forest(),
        picks in prop::collection::vec(
            (any::<prop::sample::Index>(), -1_000_000i64..1_000_000i64),
            0..40,
        ),
    ) {
        let taxonomy = build(&forest);
        let records = records(&taxonomy, &picks);
        let totals = Aggregator::aggregate(&taxonomy, &records);

        let expected: Decimal = records
            .iter()
            .map(|r| {
                let node = taxonomy.lookup(r.node.as_ref().unwrap().as_str()).unwrap();
                r.amount * node.effective_sign.factor()
            })
            .sum();
        let roots: Decimal = taxonomy
            .nodes()
            .iter()
            .filter(|n| n.is_root())
            .map(|n| totals.sum_of(n.id.as_str()))
            .sum();
        prop_assert_eq!(roots, expected);
    }
}
