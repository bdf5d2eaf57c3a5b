//! Matching rules.
//!
//! Every way a schema can point a record at a node is one variant of the
//! closed [`MatchRule`] type. Rules are compiled once at load time; matching
//! never allocates beyond lowering the description.

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use super::types::NodeId;

/// Record field a text rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    /// The normalized account code.
    Code,
    /// The free-text description.
    Description,
}

/// How a text rule compares.
///
/// Codes are only ever matched by regular expression; keywords apply to
/// descriptions.
#[derive(Debug, Clone)]
pub enum TextMatcher {
    /// Regular expression on the normalized code.
    CodeRegex(Regex),
    /// Lower-cased substring of the lower-cased description.
    DescriptionKeyword(String),
    /// Case-insensitive regular expression on the description.
    DescriptionRegex(Regex),
}

impl TextMatcher {
    /// Record field the matcher looks at.
    #[must_use]
    pub fn field(&self) -> MatchField {
        match self {
            Self::CodeRegex(_) => MatchField::Code,
            Self::DescriptionKeyword(_) | Self::DescriptionRegex(_) => MatchField::Description,
        }
    }

    fn is_match(&self, key: &MatchKey<'_>) -> bool {
        match self {
            Self::CodeRegex(regex) => key.code.is_some_and(|code| regex.is_match(code)),
            Self::DescriptionKeyword(keyword) => key.description_lower.contains(keyword.as_str()),
            Self::DescriptionRegex(regex) => regex.is_match(key.description),
        }
    }
}

/// One share of a split rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Share {
    /// Target node.
    pub node: NodeId,
    /// Fraction of the amount assigned to the node, in `(0, 1]`.
    pub ratio: Decimal,
}

/// A compiled matching rule.
#[derive(Debug, Clone)]
pub enum MatchRule {
    /// Normalized code equals `code`.
    ExactCode {
        /// Normalized code.
        code: String,
        /// Target node.
        node: NodeId,
    },
    /// Normalized code starts with `prefix`.
    PrefixPattern {
        /// Normalized prefix.
        prefix: String,
        /// Target node.
        node: NodeId,
    },
    /// Code regex, or keyword or regex on the description.
    KeywordRegex {
        /// Comparison.
        matcher: TextMatcher,
        /// Target node.
        node: NodeId,
    },
    /// Normalized code equals `code`; the amount is apportioned over `shares`.
    SplitRule {
        /// Normalized code.
        code: String,
        /// Shares, summing to exactly one.
        shares: Vec<Share>,
    },
}

/// What a record is compared against.
#[derive(Debug, Clone)]
pub struct MatchKey<'a> {
    /// Normalized code, if the record has one.
    pub code: Option<&'a str>,
    /// Description as given.
    pub description: &'a str,
    /// Lower-cased description.
    pub description_lower: String,
}

impl<'a> MatchKey<'a> {
    /// Builds a key from a normalized code and a raw description.
    #[must_use]
    pub fn new(code: Option<&'a str>, description: &'a str) -> Self {
        Self {
            code,
            description,
            description_lower: description.to_lowercase(),
        }
    }
}

/// Where a matching rule sends the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation<'r> {
    /// Whole amount to one node.
    Single(&'r NodeId),
    /// Amount apportioned over several nodes.
    Split(&'r [Share]),
}

/// Precedence class among pattern rules; lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum PatternClass {
    Prefix,
    CodeText,
    DescriptionText,
}

impl MatchRule {
    /// Applies the rule to a key.
    #[must_use]
    pub fn apply(&self, key: &MatchKey<'_>) -> Option<Allocation<'_>> {
        match self {
            Self::ExactCode { code, node } => {
                (key.code == Some(code.as_str())).then_some(Allocation::Single(node))
            }
            Self::PrefixPattern { prefix, node } => key
                .code
                .filter(|code| code.starts_with(prefix.as_str()))
                .map(|_| Allocation::Single(node)),
            Self::KeywordRegex { matcher, node } => {
                matcher.is_match(key).then_some(Allocation::Single(node))
            }
            Self::SplitRule { code, shares } => {
                (key.code == Some(code.as_str())).then_some(Allocation::Split(shares))
            }
        }
    }

    /// Whether the rule belongs to the exact tier.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::ExactCode { .. } | Self::SplitRule { .. })
    }

    /// Nodes the rule can assign amounts to.
    #[must_use]
    pub fn targets(&self) -> Vec<&NodeId> {
        match self {
            Self::ExactCode { node, .. }
            | Self::PrefixPattern { node, .. }
            | Self::KeywordRegex { node, .. } => vec![node],
            Self::SplitRule { shares, .. } => shares.iter().map(|share| &share.node).collect(),
        }
    }

    /// Short human-readable description, used in listings and logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::ExactCode { code, .. } => format!("code = {code}"),
            Self::PrefixPattern { prefix, .. } => format!("code starts with {prefix}"),
            Self::KeywordRegex { matcher, .. } => match matcher {
                TextMatcher::CodeRegex(regex) => format!("code matches /{}/", regex.as_str()),
                TextMatcher::DescriptionKeyword(keyword) => {
                    format!("description contains '{keyword}'")
                }
                TextMatcher::DescriptionRegex(regex) => {
                    format!("description matches /{}/", regex.as_str())
                }
            },
            Self::SplitRule { code, shares } => {
                format!("code = {code} split over {} nodes", shares.len())
            }
        }
    }

    pub(crate) fn pattern_class(&self) -> Option<PatternClass> {
        match self {
            Self::PrefixPattern { .. } => Some(PatternClass::Prefix),
            Self::KeywordRegex { matcher, .. } => Some(match matcher.field() {
                MatchField::Code => PatternClass::CodeText,
                MatchField::Description => PatternClass::DescriptionText,
            }),
            Self::ExactCode { .. } | Self::SplitRule { .. } => None,
        }
    }

    pub(crate) fn prefix_len(&self) -> usize {
        match self {
            Self::PrefixPattern { prefix, .. } => prefix.len(),
            _ => 0,
        }
    }
}

/// A rule together with its position in schema declaration order.
#[derive(Debug, Clone)]
pub struct IndexedRule {
    /// Declaration index, stable across loads of the same schema.
    pub index: usize,
    /// The rule.
    pub rule: MatchRule,
}
