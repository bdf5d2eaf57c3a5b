//! Apportioning amounts over split shares.
//!
//! Largest remainder method: every share is rounded toward zero, then the
//! leftover units go to the shares with the largest dropped fractions, so the
//! parts always add up to the source amount.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Minimum precision of split parts (cents).
const MIN_DECIMAL_PLACES: u32 = 2;

/// Splits `amount` by `ratios`, which must sum to one.
///
/// Parts carry `max(amount.scale(), 2)` decimal places. Negative amounts are
/// split by magnitude and keep their sign. Ties between equal remainders go
/// to the earlier share.
#[must_use]
pub fn split_amount(amount: Decimal, ratios: &[Decimal]) -> Vec<Decimal> {
    if ratios.is_empty() {
        return vec![];
    }

    let decimal_places = amount.scale().max(MIN_DECIMAL_PLACES);
    let unit = Decimal::new(1, decimal_places);
    let magnitude = amount.abs();

    let exact: Vec<Decimal> = ratios.iter().map(|ratio| magnitude * *ratio).collect();
    let mut parts: Vec<Decimal> = exact
        .iter()
        .map(|value| value.round_dp_with_strategy(decimal_places, RoundingStrategy::ToZero))
        .collect();

    let allocated: Decimal = parts.iter().copied().sum();
    let units_left = ((magnitude - allocated) / unit)
        .round_dp_with_strategy(0, RoundingStrategy::ToZero)
        .to_usize()
        .unwrap_or(0);

    if units_left > 0 {
        let mut remainders: Vec<(usize, Decimal)> = exact
            .iter()
            .zip(&parts)
            .enumerate()
            .map(|(i, (e, p))| (i, *e - *p))
            .collect();
        // Stable: equal remainders keep share order.
        remainders.sort_by(|a, b| b.1.cmp(&a.1));
        for (idx, _) in remainders.iter().take(units_left) {
            parts[*idx] += unit;
        }
    }

    if amount.is_sign_negative() {
        for part in &mut parts {
            *part = -*part;
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_split_even() {
        assert_eq!(
            split_amount(dec!(100), &[dec!(0.5), dec!(0.5)]),
            vec![dec!(50), dec!(50)]
        );
    }

    #[test]
    fn test_split_thirds_sums_to_total() {
        let third = dec!(1) / dec!(3);
        let ratios = [third, third, dec!(1) - third - third];
        let parts = split_amount(dec!(100), &ratios);
        assert_eq!(parts.iter().sum::<Decimal>(), dec!(100));
        assert_eq!(parts[1], dec!(33.33));
    }

    #[test]
    fn test_split_negative_amount() {
        let parts = split_amount(dec!(-10.01), &[dec!(0.5), dec!(0.5)]);
        assert_eq!(parts, vec![dec!(-5.01), dec!(-5.00)]);
        assert_eq!(parts.iter().sum::<Decimal>(), dec!(-10.01));
    }

    #[test]
    fn test_split_keeps_finer_source_precision() {
        let parts = split_amount(dec!(1.001), &[dec!(0.5), dec!(0.5)]);
        assert_eq!(parts.iter().sum::<Decimal>(), dec!(1.001));
    }

    #[test]
    fn test_split_zero() {
        assert_eq!(
            split_amount(dec!(0), &[dec!(0.3), dec!(0.7)]),
            vec![dec!(0), dec!(0)]
        );
    }

    #[test]
    fn test_split_empty() {
        assert!(split_amount(dec!(10), &[]).is_empty());
    }
}
