//! apidoc-config - validate and inspect API documentation configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "apidoc-config", version, about = "Validate and inspect nelmio_api_doc configuration")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate configuration files and print the normalized result
    Validate {
        /// Configuration files, merged in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output format of the normalized configuration
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
        /// Only report problems
        #[arg(long)]
        quiet: bool,
    },
    /// List every option with its default value
    Reference,
    /// Write a configuration file holding every default value
    Example {
        /// Destination file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    // Load .env file if it exists
    if let Err(e) = dotenv::dotenv() {
        // Only warn if the error is not "file not found"
        if !e.to_string().contains("No such file or directory") {
            warn!("Could not load .env file: {}", e);
        }
    }

    init_logging()?;

    let cli = Cli::parse();
    match cli.command {
        Command::Validate { files, format, quiet } => {
            match commands::validate(&files, format, quiet) {
                Ok(output) => print!("{}", output),
                Err(err) => {
                    let (code, message) = commands::describe_failure(&err);
                    error!("Configuration is invalid: {}", message);
                    std::process::exit(code);
                }
            }
        }
        Command::Reference => print!("{}", commands::reference()),
        Command::Example { path } => {
            apidoc_config::ConfigLoader::create_example(&path)?;
            info!("Example configuration written to {}", path.display());
        }
    }

    Ok(())
}

/// Initialize logging based on environment variables
fn init_logging() -> Result<()> {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    // stdout carries the normalized configuration
    match log_format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
    }

    Ok(())
}
