//! Hierarchical CEE taxonomy.
//!
//! This module owns the statement structure every run classifies into:
//! - Node arena with parent ids, in depth-first pre-order
//! - Compiled matching rules and their precedence
//! - Subtotal formulas
//! - Balance identity roles
//! - The built-in CEE schema and the shared snapshot store

pub mod builtin;
pub mod error;
pub mod formula;
pub mod model;
pub mod rule;
pub mod schema;
pub mod store;
pub mod types;


pub use builtin::{BUILTIN_CEE_SCHEMA, builtin_cee};
pub use error::{NotFoundError, SchemaError};
pub use formula::{Formula, FormulaTerm};
pub use model::Taxonomy;
pub use rule::{Allocation, IndexedRule, MatchField, MatchKey, MatchRule, Share, TextMatcher};
pub use schema::{
    BalanceDefinition, LookupDefinition, NodeDefinition, SchemaDefinition, SchemaFormat,
    ShareDefinition, SplitDefinition,
};
pub use store::TaxonomyStore;
pub use types::{BalanceRoles, ExpectedSign, NodeId, TaxonomyNode};
