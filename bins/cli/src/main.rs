//! Bilancio command line.
//!
//! Classifies trial-balance files into a reporting taxonomy and inspects
//! taxonomy definitions.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bilancio_shared::{AppConfig, AppError};

#[derive(Debug, Parser)]
#[command(name = "bilancio", version, about = "Reclassify trial balances into CEE financial statements.")]
struct Cli {
    /// Log pipeline progress to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify a CSV or JSON trial balance and write the report as JSON.
    Classify {
        /// Input file (.csv, .txt or .json)
        input: PathBuf,
        /// Taxonomy file (default: configured schema, else built-in CEE)
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Report destination (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
        /// Rounding tolerance for balance checks
        #[arg(long)]
        tolerance: Option<Decimal>,
    },
    /// Inspect taxonomy definitions.
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
}

#[derive(Debug, Subcommand)]
enum SchemaCommands {
    /// Load a taxonomy file and report what it contains.
    Check {
        /// Taxonomy file (.toml or .json)
        path: PathBuf,
    },
    /// Print the node tree of a taxonomy.
    Show {
        /// Taxonomy file (default: configured schema, else built-in CEE)
        #[arg(long)]
        schema: Option<PathBuf>,
    },
    /// Print the built-in CEE taxonomy definition, as a starting point for
    /// custom schemas.
    Builtin,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "bilancio=info"
    } else {
        "bilancio=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(error.downcast_ref::<AppError>().map_or(1, AppError::exit_code))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load().map_err(|e| AppError::Validation(e.to_string()))?;

    match cli.command {
        Commands::Classify {
            input,
            schema,
            output,
            compact,
            tolerance,
        } => commands::classify::run(
            &config,
            &commands::classify::ClassifyArgs {
                input,
                schema,
                output,
                compact,
                tolerance,
            },
        ),
        Commands::Schema { command } => match command {
            SchemaCommands::Check { path } => commands::schema::check(&path),
            SchemaCommands::Show { schema } => {
                commands::schema::show(schema.or(config.classifier.schema_path).as_deref())
            }
            SchemaCommands::Builtin => {
                commands::schema::builtin();
                Ok(())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classify() {
        let cli = Cli::try_parse_from([
            "bilancio",
            "classify",
            "tb.csv",
            "--schema",
            "cee.toml",
            "-o",
            "report.json",
            "--compact",
            "--tolerance",
            "0.5",
        ])
        .unwrap();

        match cli.command {
            Commands::Classify {
                input,
                schema,
                output,
                compact,
                tolerance,
            } => {
                assert_eq!(input, PathBuf::from("tb.csv"));
                assert_eq!(schema, Some(PathBuf::from("cee.toml")));
                assert_eq!(output, Some(PathBuf::from("report.json")));
                assert!(compact);
                assert_eq!(tolerance, Some(Decimal::new(5, 1)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_schema_commands() {
        let cli = Cli::try_parse_from(["bilancio", "-v", "schema", "check", "cee.toml"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Schema {
                command: SchemaCommands::Check { .. }
            }
        ));

        let cli = Cli::try_parse_from(["bilancio", "schema", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Schema {
                command: SchemaCommands::Show { schema: None }
            }
        ));
    }

    #[test]
    fn test_classify_requires_input() {
        assert!(Cli::try_parse_from(["bilancio", "classify"]).is_err());
    }
}
