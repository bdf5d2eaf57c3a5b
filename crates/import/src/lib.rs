//! Input adapters for Bilancio.
//!
//! Turns ledger exports into normalized [`InputRecord`]s and taxonomy files
//! into loaded [`Taxonomy`](bilancio_core::Taxonomy) values.
//!
//! - `csv` - delimited exports with Italian number formats
//! - `json` - record arrays
//! - `amount` - amount parsing shared by the adapters
//! - `schema` - taxonomy definition files

pub mod amount;
pub mod csv;
pub mod error;
pub mod json;
pub mod schema;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use bilancio_core::InputRecord;
use serde::Serialize;
use tracing::info;

pub use crate::csv::{CsvOptions, read_csv};
pub use crate::json::read_json;
pub use error::ImportError;
pub use schema::load_taxonomy;

/// Records read from one input, plus the rows that had to be dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportBatch {
    /// Records in file order.
    pub records: Vec<InputRecord>,
    /// Rows that produced no record.
    pub skipped: Vec<SkippedRow>,
}

/// A row dropped during import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based line in the source file.
    pub line: u64,
    /// Why the row was dropped.
    pub reason: String,
}

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Delimited text.
    Csv,
    /// JSON document.
    Json,
}

impl InputFormat {
    /// Picks the adapter for a file from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::UnsupportedFormat`] for spreadsheets, PDFs and
    /// anything else without an adapter.
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ImportError::UnsupportedFormat(extension)),
        }
    }
}

/// Reads an input file, choosing the adapter by extension.
///
/// # Errors
///
/// Returns the adapter's error, [`ImportError::Io`] when the file cannot be
/// opened, or [`ImportError::UnsupportedFormat`].
pub fn read_path(path: &Path, options: &CsvOptions) -> Result<ImportBatch, ImportError> {
    let format = InputFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path)?);
    let batch = match format {
        InputFormat::Csv => read_csv(reader, options)?,
        InputFormat::Json => read_json(reader)?,
    };
    info!(
        path = %path.display(),
        records = batch.records.len(),
        skipped = batch.skipped.len(),
        "Input loaded"
    );
    Ok(batch)
}
