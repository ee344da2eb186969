//! # Logging
//!
//! Global `tracing` subscriber. `RUST_LOG` wins over the configured
//! level when it is set.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `devcamper=debug,tower_http=info`
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed (tests,
/// embedding binaries); that is not an error.
pub fn init(config: &LoggingConfig) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let subscriber = Registry::default().with(env_filter);

    let installed = if config.json {
        subscriber
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .try_init()
            .is_ok()
    } else {
        subscriber
            .with(fmt::layer().with_target(false).compact())
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::info!(level = %config.level, json = config.json, "logging initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json);
    }

    #[test]
    fn test_second_init_is_harmless() {
        let config = LoggingConfig::default();
        init(&config);
        assert!(!init(&config));
    }
}
