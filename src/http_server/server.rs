//! # HTTP Server
//!
//! Assembles the resource routers under `/api/v1`, applies the request
//! guards, and serves until Ctrl-C.

use std::net::SocketAddr;
use std::time::Duration;

use axum::middleware::from_fn_with_state;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::auth_routes::auth_routes;
use super::bootcamp_routes::bootcamp_routes;
use super::config::HttpServerConfig;
use super::course_routes::course_routes;
use super::health_routes::health_routes;
use super::middleware::{rate_limit, with_security_headers};
use super::review_routes::review_routes;
use super::state::{AppState, SharedState};
use super::user_routes::user_routes;

/// Prefix of every resource route
pub const API_PREFIX: &str = "/api/v1";

/// HTTP server for the bootcamp directory API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let config = state.config.server.clone();
        let router = build_router(state.shared());
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until Ctrl-C
    pub async fn start(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        let addr = listener.local_addr()?;

        info!(%addr, "server listening");
        info!("API available at http://{}{}", addr, API_PREFIX);

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        info!("server stopped");
        Ok(())
    }
}

fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Build the complete router over shared state
pub fn build_router(state: SharedState) -> Router {
    let server = &state.config.server;

    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/bootcamps", bootcamp_routes())
        .nest("/courses", course_routes())
        .nest("/reviews", review_routes())
        .nest("/users", user_routes());

    let router = Router::new()
        .merge(health_routes())
        .nest(API_PREFIX, api)
        .layer(from_fn_with_state(state.clone(), rate_limit))
        .layer(RequestBodyLimitLayer::new(server.body_limit_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)));

    let router = with_security_headers(router).layer(cors_layer(server));

    let router = if state.config.environment.is_development() {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
