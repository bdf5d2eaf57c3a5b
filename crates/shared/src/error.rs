//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Domain crates keep their own precise error enums; at the service and
/// command-line boundary they collapse into one of these categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Requested resource does not exist (e.g. an unknown taxonomy node).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request payload is malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Taxonomy definition was rejected at load time.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Input file could not be read or decoded.
    #[error("Import error: {0}")]
    Import(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) | Self::Import(_) => 400,
            Self::Schema(_) => 422,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Schema(_) => "SCHEMA_ERROR",
            Self::Import(_) => "IMPORT_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the process exit code used by the command-line shell.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::NotFound(_) | Self::Validation(_) => 2,
            Self::Schema(_) => 3,
            Self::Import(_) => 4,
            Self::Internal(_) => 1,
        }
    }
}
