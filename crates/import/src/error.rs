//! Import error types.

use bilancio_core::SchemaError;
use bilancio_shared::AppError;
use thiserror::Error;

/// Errors raised while reading an input file or a schema file.
#[derive(Debug, Error)]
pub enum ImportError {
    /// File could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV stream is malformed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON document is malformed or has the wrong shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is not present in the header.
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    /// The input contains no usable record.
    #[error("No records found in input")]
    NoRecords,

    /// The file extension has no adapter.
    #[error("Unsupported input format: '{0}'")]
    UnsupportedFormat(String),

    /// Schema file was read but rejected.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<ImportError> for AppError {
    fn from(error: ImportError) -> Self {
        match error {
            ImportError::Schema(schema) => schema.into(),
            other => Self::Import(other.to_string()),
        }
    }
}
