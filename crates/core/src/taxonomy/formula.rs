//! Subtotal formulas.
//!
//! A formula is a signed sum of node ids, optionally prefixed by a label:
//! `"Total Assets = immobilizzazioni + circolante - crediti_soci"`.

use serde::Serialize;

use super::types::NodeId;

/// One signed term of a formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaTerm {
    /// Referenced node.
    pub node: NodeId,
    /// The term is subtracted instead of added.
    pub negated: bool,
}

/// A parsed subtotal formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Formula {
    /// Formula text as declared.
    pub source: String,
    /// Terms in declaration order.
    pub terms: Vec<FormulaTerm>,
}

impl Formula {
    /// Parses a formula.
    ///
    /// Anything before a single `=` is treated as a label and ignored.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the expression is empty,
    /// has a dangling operator, two adjacent terms or an unexpected character.
    pub fn parse(source: &str) -> Result<Self, String> {
        let expression = match source.split_once('=') {
            Some((_, rhs)) if rhs.contains('=') => {
                return Err("more than one '='".to_string());
            }
            Some((_, rhs)) => rhs,
            None => source,
        };

        let mut terms = Vec::new();
        let mut negated = false;
        let mut expect_term = true;
        let mut chars = expression.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            match c {
                c if c.is_whitespace() => {}
                '+' | '-' => {
                    if expect_term && !terms.is_empty() {
                        return Err(format!("unexpected operator '{c}'"));
                    }
                    if expect_term && negated {
                        return Err(format!("unexpected operator '{c}'"));
                    }
                    negated = c == '-';
                    expect_term = true;
                }
                c if is_id_char(c) => {
                    if !expect_term {
                        return Err("missing operator between terms".to_string());
                    }
                    let mut end = start + c.len_utf8();
                    while let Some(&(idx, next)) = chars.peek() {
                        if !is_id_char(next) {
                            break;
                        }
                        end = idx + next.len_utf8();
                        chars.next();
                    }
                    terms.push(FormulaTerm {
                        node: NodeId::new(&expression[start..end]),
                        negated,
                    });
                    negated = false;
                    expect_term = false;
                }
                other => return Err(format!("unexpected character '{other}'")),
            }
        }

        if terms.is_empty() {
            return Err("no terms".to_string());
        }
        if expect_term {
            return Err("dangling operator".to_string());
        }

        Ok(Self {
            source: source.trim().to_string(),
            terms,
        })
    }

    /// Iterates the referenced node ids.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.terms.iter().map(|term| &term.node)
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ids(formula: &Formula) -> Vec<(&str, bool)> {
        formula
            .terms
            .iter()
            .map(|t| (t.node.as_str(), t.negated))
            .collect()
    }

    #[test]
    fn test_parse_sum() {
        let formula = Formula::parse("current + fixed").unwrap();
        assert_eq!(ids(&formula), vec![("current", false), ("fixed", false)]);
    }

    #[test]
    fn test_parse_with_label_and_subtraction() {
        let formula = Formula::parse("Total Assets = A.I + A.II - crediti_soci").unwrap();
        assert_eq!(
            ids(&formula),
            vec![("A.I", false), ("A.II", false), ("crediti_soci", true)]
        );
        assert_eq!(formula.source, "Total Assets = A.I + A.II - crediti_soci");
    }

    #[test]
    fn test_parse_leading_minus() {
        let formula = Formula::parse("-a + b").unwrap();
        assert_eq!(ids(&formula), vec![("a", true), ("b", false)]);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("a +")]
    #[case("a b")]
    #[case("a + + b")]
    #[case("a * b")]
    #[case("x = a = b")]
    #[case("total =")]
    fn test_parse_rejects(#[case] source: &str) {
        assert!(Formula::parse(source).is_err(), "{source:?} should not parse");
    }
}
