//! # HTTP Server Module
//!
//! REST surface of the bootcamp directory.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/v1/auth/*` - Registration, login, current user
//! - `/api/v1/bootcamps/*` - Bootcamps, nested courses and reviews, radius search
//! - `/api/v1/courses/*` - Courses
//! - `/api/v1/reviews/*` - Reviews
//! - `/api/v1/users/*` - Account management (admin)

pub mod auth_routes;
pub mod bootcamp_routes;
pub mod config;
pub mod course_routes;
pub mod errors;
pub mod extract;
pub mod guard;
pub mod health_routes;
pub mod middleware;
pub mod response;
pub mod review_routes;
pub mod server;
pub mod state;
pub mod user_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use guard::authenticate;
pub use middleware::RateLimiter;
pub use server::{build_router, HttpServer, API_PREFIX};
pub use state::{AppState, SharedState};
