//! Amount parsing for ledger exports.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Dare/avere marker trailing an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Dare,
    Avere,
}

/// Parses an amount as written in ledger exports.
///
/// Accepted notations:
/// - Italian `1.234,56` when `decimal_comma` is set, `1,234.56` otherwise
/// - accounting parentheses `(1.234,56)` and leading or trailing minus
/// - a trailing `D` (dare) or `A` (avere) marker; `A` makes the amount a credit
/// - currency symbols, apostrophes and spaces, which are ignored
///
/// With `decimal_comma` set, a value with a single dot and no comma is read
/// as a decimal point unless exactly three digits follow it (`1234.5` is
/// 1234.5, `1.000` is one thousand).
///
/// Returns `None` for blank or non-numeric input.
#[must_use]
pub fn parse_amount(raw: &str, decimal_comma: bool) -> Option<Decimal> {
    let (marker, text) = split_marker(raw.trim());
    if text.is_empty() {
        return None;
    }

    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '€' | '$' | '£' | '\''))
        .collect();
    let (parenthesized, text) = match cleaned.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, cleaned.as_str()),
    };
    let (minus, body) = if let Some(body) = text.strip_prefix('-') {
        (true, body)
    } else if let Some(body) = text.strip_suffix('-') {
        (true, body)
    } else {
        (false, text.strip_prefix('+').unwrap_or(text))
    };

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let value = Decimal::from_str(&normalize_separators(body, decimal_comma)).ok()?;
    let value = if parenthesized == minus { value } else { -value };

    Some(match marker {
        Some(Marker::Dare) => value.abs(),
        Some(Marker::Avere) => -value.abs(),
        None => value,
    })
}

fn split_marker(text: &str) -> (Option<Marker>, &str) {
    let marker = match text.chars().last() {
        Some('D' | 'd') => Marker::Dare,
        Some('A' | 'a') => Marker::Avere,
        _ => return (None, text),
    };
    (Some(marker), text[..text.len() - 1].trim_end())
}

fn normalize_separators(body: &str, decimal_comma: bool) -> String {
    if !decimal_comma {
        return body.replace(',', "");
    }
    if body.contains(',') {
        return body.replace('.', "").replacen(',', ".", 1);
    }
    let mut parts = body.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(fraction), None) if fraction.len() != 3 => body.to_string(),
        _ => body.replace('.', ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("1.234,56", dec!(1234.56))]
    #[case("-1.234,56", dec!(-1234.56))]
    #[case("1.234,56-", dec!(-1234.56))]
    #[case("(1.234,56)", dec!(-1234.56))]
    #[case("1.234,56 A", dec!(-1234.56))]
    #[case("-1.234,56 D", dec!(1234.56))]
    #[case("€ 1.000", dec!(1000))]
    #[case("1.000.000,00", dec!(1000000.00))]
    #[case("1234.5", dec!(1234.5))]
    #[case("0,5", dec!(0.5))]
    #[case("  42  ", dec!(42))]
    fn test_parse_italian_amounts(#[case] raw: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount(raw, true), Some(expected));
    }

    #[rstest]
    #[case("1,234.56", dec!(1234.56))]
    #[case("$ (12.50)", dec!(-12.50))]
    #[case("1'234.5", dec!(1234.5))]
    fn test_parse_dot_decimal_amounts(#[case] raw: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount(raw, false), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("abc")]
    #[case("12,5,3")]
    #[case("1-2")]
    #[case("A")]
    fn test_parse_rejects_non_numeric(#[case] raw: &str) {
        assert_eq!(parse_amount(raw, true), None);
    }
}
