//! CLI module for DevCamper
//!
//! Provides command-line interface for:
//! - serve: Load config and seed data, then serve the HTTP API
//! - check-config: Validate and print the effective configuration

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{check_config, load_seed, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
