//! CLI command implementations
//!
//! `serve` loads configuration, installs logging, builds the database
//! (optionally seeded) and runs the HTTP server on a tokio runtime.

use std::fs;
use std::path::Path;

use tracing::info;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use crate::config::AppConfig;
use crate::http_server::{AppState, HttpServer};
use crate::logging;
use crate::models::user::hash_seed_passwords;
use crate::store::{Database, SeedData};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, seed } => serve(&config, seed.as_deref()),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Read a seed file; plaintext user passwords are hashed on the way in
pub fn load_seed(path: &Path) -> CliResult<SeedData> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::seed_failed(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let mut seed: SeedData = serde_json::from_str(&content)
        .map_err(|e| CliError::seed_failed(format!("Invalid seed JSON: {}", e)))?;

    seed.users = hash_seed_passwords(seed.users)
        .map_err(|e| CliError::seed_failed(e.to_string()))?;
    Ok(seed)
}

/// Start the API server and block until shutdown
pub fn serve(config_path: &Path, seed_path: Option<&Path>) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    logging::init(&config.logging);

    let seed = seed_path.map(load_seed).transpose()?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let db = Database::new();
        if let Some(seed) = seed {
            db.seed(seed)
                .await
                .map_err(|e| CliError::seed_failed(e.to_string()))?;
        }

        info!(environment = ?config.environment, "starting devcamper");
        let server = HttpServer::new(AppState::new(config, db));
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Validate a configuration file and print it as JSON
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    let rendered = serde_json::to_string_pretty(&redacted(&config))
        .map_err(|e| CliError::io_error(format!("JSON error: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

/// Copy of the configuration safe to print
fn redacted(config: &AppConfig) -> AppConfig {
    let mut shown = config.clone();
    if !shown.jwt.secret.is_empty() {
        shown.jwt.secret = "********".to_string();
    }
    shown
}
