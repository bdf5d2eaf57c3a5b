//! Built-in CEE taxonomy.

use super::error::SchemaError;
use super::model::Taxonomy;

/// Source of the built-in taxonomy, in TOML.
pub const BUILTIN_CEE_SCHEMA: &str = include_str!("builtin_cee.toml");

/// Loads the built-in CEE taxonomy.
///
/// # Errors
///
/// Only fails if the embedded definition is broken, which the test suite
/// guards against.
pub fn builtin_cee() -> Result<Taxonomy, SchemaError> {
    Taxonomy::from_toml_str(BUILTIN_CEE_SCHEMA)
}
