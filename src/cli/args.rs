//! CLI argument definitions using clap
//!
//! Commands:
//! - devcamper serve --config <path> [--seed <path>]
//! - devcamper check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DevCamper - bootcamp directory API server
#[derive(Parser, Debug)]
#[command(name = "devcamper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./devcamper.json")]
        config: PathBuf,

        /// JSON file of initial records to load before serving
        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// Validate a configuration file and print the effective configuration
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./devcamper.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
