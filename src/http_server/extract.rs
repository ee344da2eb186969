//! Request extractors shared by the route modules.

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde_json::Value;
use uuid::Uuid;

use super::errors::{ApiError, ApiResult};
use crate::models::sanitize_body;
use crate::query::{translate, QueryDescriptor, RawParams};

/// JSON body, sanitized before any handler sees it
#[derive(Debug)]
pub struct SanitizedJson(pub Value);

#[async_trait]
impl<S> FromRequest<S> for SanitizedJson
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(SanitizedJson(sanitize_body(body)?))
    }
}

/// Resource ids are UUIDs; anything else cannot exist
pub fn resource_id(raw: &str) -> ApiResult<&str> {
    Uuid::parse_str(raw)
        .map(|_| raw)
        .map_err(|_| ApiError::NotFound("Resource not found".to_string()))
}

/// Translate the raw query-string pairs of a list request
pub fn list_query(pairs: Vec<(String, String)>) -> ApiResult<QueryDescriptor> {
    Ok(translate(&RawParams::from_pairs(pairs))?)
}
