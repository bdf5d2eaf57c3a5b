//! Application configuration management.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration that classifies against the built-in CEE taxonomy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Classification engine configuration.
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Input adapter configuration.
    #[serde(default)]
    pub import: ImportConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    16 * 1024 * 1024
}

/// Classification engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Taxonomy definition file (TOML or JSON). `None` selects the built-in
    /// CEE taxonomy.
    #[serde(default)]
    pub schema_path: Option<PathBuf>,
    /// Rounding tolerance for balance checks, in currency units.
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,
    /// Batches with at least this many records are matched in parallel.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            schema_path: None,
            tolerance: default_tolerance(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

fn default_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_parallel_threshold() -> usize {
    256
}

/// Input adapter configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Field delimiter for CSV input.
    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: char,
    /// Whether amounts use the Italian decimal comma (`1.234,56`).
    #[serde(default = "default_decimal_comma")]
    pub decimal_comma: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            csv_delimiter: default_csv_delimiter(),
            decimal_comma: default_decimal_comma(),
        }
    }
}

fn default_csv_delimiter() -> char {
    ';'
}

fn default_decimal_comma() -> bool {
    true
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones overriding earlier ones: `config/default`,
    /// `config/{RUN_MODE}`, then `BILANCIO__SECTION__KEY` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("BILANCIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
