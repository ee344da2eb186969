//! # Middleware
//!
//! Fixed-window request limiter keyed by client IP, and the security
//! headers attached to every response.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::sync::Mutex;
use tower_http::set_header::SetResponseHeaderLayer;

use super::errors::ApiError;
use super::state::SharedState;
use crate::config::RateLimitConfig;

/// Outcome of one limiter check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited,
}

/// Fixed-window counter per client
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    /// client -> (count, window_start)
    windows: Mutex<HashMap<String, (u32, Instant)>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.config.max_requests
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.config.window_secs)
    }

    /// Count one request from `client` at `now`
    pub async fn check_at(&self, client: &str, now: Instant) -> Decision {
        let window = self.window();
        let mut windows = self.windows.lock().await;

        // Drop stale windows before the table grows without bound
        if windows.len() > 10_000 {
            windows.retain(|_, (_, start)| now.duration_since(*start) < window);
        }

        let entry = windows.entry(client.to_string()).or_insert((0, now));
        if now.duration_since(entry.1) >= window {
            *entry = (0, now);
        }

        if entry.0 >= self.config.max_requests {
            return Decision::Limited;
        }
        entry.0 += 1;
        Decision::Allowed {
            remaining: self.config.max_requests - entry.0,
        }
    }

    pub async fn check(&self, client: &str) -> Decision {
        self.check_at(client, Instant::now()).await
    }
}

fn client_key(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Reject clients over their request budget with 429
pub async fn rate_limit(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    let client = client_key(&req);
    match state.limiter.check(&client).await {
        Decision::Limited => ApiError::RateLimited.into_response(),
        Decision::Allowed { remaining } => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert(
                HeaderName::from_static("ratelimit-limit"),
                HeaderValue::from(state.limiter.max_requests()),
            );
            headers.insert(
                HeaderName::from_static("ratelimit-remaining"),
                HeaderValue::from(remaining),
            );
            response
        }
    }
}

/// Add `X-Content-Type-Options`, `X-Frame-Options` and `Referrer-Policy`
pub fn with_security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
}
