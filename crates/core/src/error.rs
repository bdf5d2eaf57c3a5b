//! Conversions from domain errors into [`AppError`].

use bilancio_shared::AppError;

use crate::record::InvalidRecordError;
use crate::taxonomy::{NotFoundError, SchemaError};

impl From<SchemaError> for AppError {
    fn from(error: SchemaError) -> Self {
        Self::Schema(error.to_string())
    }
}

impl From<NotFoundError> for AppError {
    fn from(error: NotFoundError) -> Self {
        Self::NotFound(error.to_string())
    }
}

impl From<InvalidRecordError> for AppError {
    fn from(error: InvalidRecordError) -> Self {
        Self::Validation(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_maps_to_unprocessable() {
        let error: AppError = SchemaError::Empty.into();
        assert_eq!(error.status_code(), 422);
        assert_eq!(error.error_code(), "SCHEMA_ERROR");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let error: AppError = NotFoundError("attivo.z".to_string()).into();
        assert_eq!(error.status_code(), 404);
        assert!(error.to_string().contains("attivo.z"));
    }

    #[test]
    fn test_invalid_record_maps_to_validation() {
        let error: AppError = InvalidRecordError::MissingIdentity.into();
        assert_eq!(error.status_code(), 400);
    }
}
