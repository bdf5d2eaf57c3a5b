//! JSON record reader.

use std::io::Read;

use bilancio_core::InputRecord;
use serde::Deserialize;
use tracing::debug;

use crate::ImportBatch;
use crate::error::ImportError;

/// Accepted document shapes: a bare array, or an object carrying the array
/// under `records` next to any other metadata.
#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    List(Vec<InputRecord>),
    Wrapped { records: Vec<InputRecord> },
}

/// Reads records from a JSON document.
///
/// Field names follow [`InputRecord`], including the Italian aliases
/// (`codice`, `descrizione`, `valore`, `importo`, `saldo`). Amounts may be
/// numbers or strings.
///
/// # Errors
///
/// Returns [`ImportError::Json`] for malformed documents and
/// [`ImportError::NoRecords`] for an empty record list.
pub fn read_json<R: Read>(reader: R) -> Result<ImportBatch, ImportError> {
    let records = match serde_json::from_reader(reader)? {
        Document::List(records) | Document::Wrapped { records } => records,
    };
    if records.is_empty() {
        return Err(ImportError::NoRecords);
    }
    debug!(records = records.len(), "JSON read complete");
    Ok(ImportBatch {
        records,
        skipped: Vec::new(),
    })
}
