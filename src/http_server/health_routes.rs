//! Health check route.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use super::state::SharedState;
use crate::config::Environment;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: Environment,
}

pub fn health_routes() -> Router<SharedState> {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment,
    };

    (StatusCode::OK, Json(response))
}
