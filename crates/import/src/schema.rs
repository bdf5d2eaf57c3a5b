//! Taxonomy definition files.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use bilancio_core::taxonomy::{SchemaFormat, Taxonomy, builtin_cee};
use tracing::info;

use crate::error::ImportError;

/// Loads a taxonomy from a TOML or JSON file, or the built-in CEE taxonomy
/// when `path` is `None`.
///
/// The format follows the extension: `.json` is JSON, anything else TOML.
///
/// # Errors
///
/// Returns [`ImportError::Io`] when the file cannot be read and
/// [`ImportError::Schema`] when the definition is rejected.
pub fn load_taxonomy(path: Option<&Path>) -> Result<Taxonomy, ImportError> {
    let Some(path) = path else {
        return Ok(builtin_cee()?);
    };

    let source = fs::read_to_string(path)?;
    let format = SchemaFormat::from_extension(path.extension().and_then(OsStr::to_str));
    let taxonomy = Taxonomy::parse(&source, format)?;
    info!(
        path = %path.display(),
        taxonomy = %taxonomy.name(),
        nodes = taxonomy.len(),
        rules = taxonomy.rules().len(),
        "Taxonomy loaded"
    );
    Ok(taxonomy)
}
