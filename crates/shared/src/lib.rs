//! Shared configuration, errors, and identifiers for Bilancio.
//!
//! This crate provides common types used across all other crates:
//! - Layered application configuration
//! - Application-wide error type with status and error codes
//! - Typed IDs for classification runs

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, ClassifierConfig, ImportConfig, ServerConfig};
pub use error::{AppError, AppResult};
pub use types::RunId;
