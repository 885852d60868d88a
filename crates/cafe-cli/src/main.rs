//! # cafe-customize
//!
//! Operator tool for the order customization logic.
//!
//! ## Usage
//! ```bash
//! # Check an item definition exported from the document store
//! cafe-customize validate --item latte.json
//!
//! # Price a line: resume a saved selection, drop the milk, add vanilla
//! cafe-customize price --item latte.json --saved line.json \
//!     --toggle milk --choose syrups=vanilla --base-price 4.50
//!
//! # Show (and optionally write) the effective configuration
//! cafe-customize config --write
//! ```
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages
//! - `RUST_LOG=cafe_core=trace` - Show every selection edit
//! - Default: `logging.filter` from the config file

mod cli;
mod commands;
mod config;
mod error;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::PriceRequest;
use crate::config::CliConfig;
use crate::error::CliResult;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.clone(), std::io::stderr)?;
    init_tracing(&config);

    match cli.command {
        Command::Validate { item, saved } => {
            commands::cmd_validate(&config, &item, saved.as_deref())
        }
        Command::Price {
            item,
            saved,
            toggles,
            choices,
            strict,
            base_price,
            quantity,
        } => commands::cmd_price(
            &config,
            &item,
            saved.as_deref(),
            PriceRequest {
                toggles,
                choices,
                strict,
                base_price,
                quantity,
            },
        ),
        Command::Config { write } => commands::cmd_config(&config, cli.config, write),
    }
}

/// Loads the configuration under a provisional subscriber.
///
/// The configured filter is not known until the file is read, so events
/// from the load itself go through `RUST_LOG` or the default filter.
fn load_config<W>(path: Option<PathBuf>, make_writer: W) -> CliResult<CliConfig>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(make_writer)
        .finish();

    tracing::subscriber::with_default(bootstrap, || CliConfig::load(path))
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over the configured filter. Logs go to stderr so
/// stdout stays clean JSON.
fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
