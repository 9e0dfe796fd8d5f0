//! Command-line interface for the CardioGuard service.

use clap::{Parser, Subcommand};

/// Top-level CLI for CardioGuard
#[derive(Parser)]
#[command(
    name = "cardioguard",
    version = "0.1.0",
    about = "Heart-disease classifier serving API"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the HTTP API (prediction, bulk scoring, model info, health)
    Serve {
        /// Bind address, overrides configuration
        #[arg(long)]
        bind: Option<String>,

        /// Models directory, overrides configuration
        #[arg(long)]
        models_dir: Option<String>,
    },

    /// Load the model set and exit; non-zero on any bad artifact
    ValidateModels {
        /// Models directory, overrides configuration
        #[arg(long)]
        models_dir: Option<String>,
    },
}
