//! Shared state handed to every handler.

use std::sync::Arc;

use super::middleware::RateLimiter;
use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::geo::TableGeocoder;
use crate::store::Database;

/// Application state
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub geocoder: TableGeocoder,
    pub limiter: RateLimiter,
    pub config: AppConfig,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig, db: Database) -> Self {
        Self {
            db,
            jwt: JwtManager::new(config.jwt.to_jwt_config()),
            geocoder: TableGeocoder::new(config.geocoder.clone()),
            limiter: RateLimiter::new(config.rate_limit),
            config,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}
