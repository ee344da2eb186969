//! # HTTP API Errors
//!
//! The one error type every handler returns. Subsystem errors convert
//! into it and render as `{ "success": false, "error", "code" }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::AuthError;
use crate::geo::GeoError;
use crate::models::ModelError;
use crate::query::ValidationError;
use crate::store::StoreError;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Bad list query parameters
    #[error("{0}")]
    Query(#[from] ValidationError),

    /// Bad request body
    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("{0}")]
    Geo(#[from] GeoError),

    /// Request not acceptable for a reason outside the models
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Too many requests, please try again later")]
    RateLimited,

    // ==================
    // Auth Errors
    // ==================
    #[error("{0}")]
    Auth(#[from] AuthError),

    // ==================
    // Server Errors (5xx)
    // ==================
    #[error("Server Error")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// 404 for an id that does not resolve to a record
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::NotFound(format!("{} not found with id of {}", resource, id))
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Query(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Model(e) => status(e.status_code()),
            ApiError::Geo(e) => status(e.status_code()),
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Auth(e) => status(e.status_code()),
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: u16,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            success: false,
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let query = ValidationError::InvalidField {
            param: "$where".into(),
        };
        assert_eq!(ApiError::from(query).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(ModelError::duplicate("name")).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::not_found("Bootcamp", "x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::RateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::from(StoreError::Timeout).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_propagation() {
        let err = ApiError::from(AuthError::NotOwner);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        let err = ApiError::from(AuthError::AuthenticationRequired);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_store_details_not_exposed() {
        let err = ApiError::from(StoreError::Internal("disk path /var/db".into()));
        let body = ErrorResponse::from(&err);
        assert_eq!(body.error, "Server Error");
        assert_eq!(body.code, 500);
        assert!(!body.success);
    }
}
