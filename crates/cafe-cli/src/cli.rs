use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// cafe-customize: inspect and price order line customizations.
#[derive(Parser, Debug)]
#[command(name = "cafe-customize")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML config file (defaults to the platform config dir).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a canonical item definition (and optionally a saved line against it).
    Validate {
        /// Canonical item JSON document.
        #[arg(long)]
        item: PathBuf,

        /// Saved line selection JSON document.
        #[arg(long)]
        saved: Option<PathBuf>,
    },

    /// Open a customization, apply edits and print the line to store.
    ///
    /// Ingredient toggles are applied before option choices.
    Price {
        /// Canonical item JSON document.
        #[arg(long)]
        item: PathBuf,

        /// Saved line selection JSON document to resume from.
        #[arg(long)]
        saved: Option<PathBuf>,

        /// Base ingredient key to toggle (repeatable).
        #[arg(long = "toggle", value_name = "KEY")]
        toggles: Vec<String>,

        /// Option to pick or tick, as GROUP=OPTION (repeatable).
        #[arg(long = "choose", value_name = "GROUP=OPTION")]
        choices: Vec<String>,

        /// Reject unknown keys regardless of configuration.
        #[arg(long)]
        strict: bool,

        /// Item base price in major units, to print the unit price.
        #[arg(long)]
        base_price: Option<f64>,

        /// Line quantity used with --base-price.
        #[arg(long, default_value = "1")]
        quantity: i64,
    },

    /// Print the effective configuration.
    Config {
        /// Also write it to the config file.
        #[arg(long)]
        write: bool,
    },
}
