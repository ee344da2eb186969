//! # Application Configuration
//!
//! Loaded from a JSON file, then overridden from the environment
//! (`PORT`, `APP_ENV`, `JWT_SECRET`), then validated.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::JwtConfig;
use crate::geo::ZipcodeEntry;
use crate::http_server::HttpServerConfig;
use crate::logging::LoggingConfig;

/// Secret used when none is configured; refused in production
pub const DEV_JWT_SECRET: &str = "devcamper-development-secret";

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid environment variable {name}: {reason}")]
    Env { name: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Deployment mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }

    pub fn is_development(&self) -> bool {
        *self == Environment::Development
    }
}

/// JWT settings as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtSettings {
    #[serde(default)]
    pub secret: String,

    /// Token lifetime in days
    #[serde(default = "default_expire_days")]
    pub expire_days: i64,

    #[serde(default = "default_issuer")]
    pub issuer: String,
}

fn default_expire_days() -> i64 {
    30
}

fn default_issuer() -> String {
    "devcamper".to_string()
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expire_days: default_expire_days(),
            issuer: default_issuer(),
        }
    }
}

impl JwtSettings {
    /// Signing configuration; falls back to the development secret when unset
    pub fn to_jwt_config(&self) -> JwtConfig {
        let secret = if self.secret.is_empty() {
            DEV_JWT_SECRET.to_string()
        } else {
            self.secret.clone()
        };
        JwtConfig {
            secret,
            access_token_ttl: chrono::Duration::days(self.expire_days),
            issuer: self.issuer.clone(),
            audience: self.issuer.clone(),
        }
    }
}

/// Fixed-window limiter settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_max_requests() -> u32 {
    100
}

fn default_window_secs() -> u64 {
    600
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub jwt: JwtSettings,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Zipcode table for the built-in geocoder
    #[serde(default)]
    pub geocoder: HashMap<String, ZipcodeEntry>,
}

impl AppConfig {
    /// Load from a JSON file with process environment overrides;
    /// a missing file yields the defaults
    pub fn load(path: &Path) -> ConfigResult<Self> {
        Self::load_with_env(path, |name| std::env::var(name).ok())
    }

    pub fn load_with_env<F>(path: &Path, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            AppConfig::default()
        };

        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::Env {
                name: "PORT".to_string(),
                reason: format!("'{}' is not a port number", port),
            })?;
        }
        if let Some(env) = lookup("APP_ENV") {
            self.environment = Environment::parse(&env).ok_or_else(|| ConfigError::Env {
                name: "APP_ENV".to_string(),
                reason: format!("unknown environment '{}'", env),
            })?;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.jwt.secret = secret;
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be > 0".into()));
        }
        if self.server.body_limit_bytes == 0 {
            return Err(ConfigError::Invalid("server.body_limit_bytes must be > 0".into()));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.request_timeout_secs must be > 0".into(),
            ));
        }
        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.max_requests and rate_limit.window_secs must be > 0".into(),
            ));
        }
        if self.jwt.expire_days <= 0 {
            return Err(ConfigError::Invalid("jwt.expire_days must be > 0".into()));
        }
        if self.environment == Environment::Production && self.jwt.secret.is_empty() {
            return Err(ConfigError::Invalid(
                "jwt.secret (or JWT_SECRET) is required in production".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window_secs, 600);
        assert!(config.environment.is_development());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "server": {{"port": 5000}},
                "geocoder": {{"02118": {{"latitude": 42.3, "longitude": -71.0, "city": "Boston", "state": "MA"}}}}
            }}"#
        )
        .unwrap();

        let config = AppConfig::load_with_env(file.path(), |_| None).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.geocoder["02118"].country, "US");
        assert_eq!(config.jwt.expire_days, 30);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_with_env(&dir.path().join("absent.json"), |_| None).unwrap();
        assert_eq!(config.rate_limit, RateLimitConfig::default());
    }

    #[test]
    fn test_invalid_json_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            AppConfig::load_with_env(file.path(), |_| None),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(|name| match name {
                "PORT" => Some("8080".to_string()),
                "APP_ENV" => Some("production".to_string()),
                "JWT_SECRET" => Some("s3cret".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.jwt.to_jwt_config().secret, "s3cret");
        assert!(config.validate().is_ok());

        let bad = AppConfig::default().apply_env(|name| (name == "PORT").then(|| "x".to_string()));
        assert!(matches!(bad, Err(ConfigError::Env { .. })));
    }

    #[test]
    fn test_production_requires_secret() {
        let config = AppConfig {
            environment: Environment::Production,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
