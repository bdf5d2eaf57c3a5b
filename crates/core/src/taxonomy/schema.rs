//! Declarative taxonomy definition.
//!
//! This is the on-disk shape, accepted as TOML or JSON. It is only a
//! transport format: [`Taxonomy::load`](super::Taxonomy::load) checks every
//! invariant before anything is usable for matching.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::SchemaError;
use super::types::ExpectedSign;

/// A complete taxonomy definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    /// Taxonomy name, reported with every classification run.
    pub name: String,
    /// Leaf collecting records no rule matches.
    #[serde(default)]
    pub unclassified: Option<String>,
    /// Balance identity roles.
    #[serde(default)]
    pub balance: BalanceDefinition,
    /// Nodes in declaration order.
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
    /// Explicit code-to-node lookup table.
    #[serde(default)]
    pub lookup: Vec<LookupDefinition>,
    /// Ratio splits for mixed-use accounts.
    #[serde(default)]
    pub split: Vec<SplitDefinition>,
}

/// Node ids that take part in the balance identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BalanceDefinition {
    /// Total assets node.
    #[serde(default)]
    pub assets: Option<String>,
    /// Total liabilities node.
    #[serde(default)]
    pub liabilities: Option<String>,
    /// Total equity node.
    #[serde(default)]
    pub equity: Option<String>,
    /// Period revenues node.
    #[serde(default)]
    pub income: Option<String>,
    /// Period costs node.
    #[serde(default)]
    pub expenses: Option<String>,
}

/// One node with its matching rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDefinition {
    /// Unique id.
    pub id: String,
    /// Display label; defaults to the id.
    #[serde(default)]
    pub label: Option<String>,
    /// Parent id.
    #[serde(default)]
    pub parent: Option<String>,
    /// Normal balance side.
    #[serde(default)]
    pub sign: ExpectedSign,
    /// Subtotal cross-check.
    #[serde(default)]
    pub formula: Option<String>,
    /// Formula mismatches are errors rather than warnings.
    #[serde(default)]
    pub critical: bool,
    /// Exact account codes.
    #[serde(default)]
    pub codes: Vec<String>,
    /// Account code prefixes.
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Regular expressions on the normalized code.
    #[serde(default)]
    pub code_patterns: Vec<String>,
    /// Description keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Regular expressions on the description.
    #[serde(default)]
    pub description_patterns: Vec<String>,
}

impl NodeDefinition {
    /// Whether the node declares any matching rule.
    #[must_use]
    pub fn has_rules(&self) -> bool {
        !(self.codes.is_empty()
            && self.prefixes.is_empty()
            && self.code_patterns.is_empty()
            && self.keywords.is_empty()
            && self.description_patterns.is_empty())
    }
}

/// A lookup table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupDefinition {
    /// Account code.
    pub code: String,
    /// Target node.
    pub node: String,
}

/// A split rule for one account code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitDefinition {
    /// Account code.
    pub code: String,
    /// Shares of the amount.
    pub shares: Vec<ShareDefinition>,
}

/// One share of a split rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShareDefinition {
    /// Target node.
    pub node: String,
    /// Fraction of the amount.
    pub ratio: Decimal,
}

/// Serialization format of a taxonomy definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// TOML document.
    Toml,
    /// JSON document.
    Json,
}

impl SchemaFormat {
    /// Picks the format from a file extension; anything but `json` is TOML.
    #[must_use]
    pub fn from_extension(extension: Option<&str>) -> Self {
        match extension {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

impl SchemaDefinition {
    /// Parses a definition in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] on malformed input.
    pub fn parse(source: &str, format: SchemaFormat) -> Result<Self, SchemaError> {
        match format {
            SchemaFormat::Toml => Self::from_toml_str(source),
            SchemaFormat::Json => Self::from_json_str(source),
        }
    }

    /// Parses a TOML definition.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] on malformed TOML or unknown fields.
    pub fn from_toml_str(source: &str) -> Result<Self, SchemaError> {
        toml::from_str(source).map_err(|e| SchemaError::Parse(e.to_string()))
    }

    /// Parses a JSON definition.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] on malformed JSON or unknown fields.
    pub fn from_json_str(source: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(source).map_err(|e| SchemaError::Parse(e.to_string()))
    }
}
