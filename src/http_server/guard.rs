//! # Route Protection
//!
//! Resolves the bearer token on a request to the calling user. The role
//! is read from the stored user, so role changes apply to live tokens.

use axum::http::HeaderMap;
use tracing::debug;

use super::errors::ApiResult;
use super::state::AppState;
use crate::auth::{bearer_token, AuthError, CurrentUser};
use crate::models::user::role_of;
use crate::store::Collection;

/// Authenticate the caller of a protected route
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> ApiResult<CurrentUser> {
    let token = bearer_token(headers)?;
    let claims = state.jwt.validate_token(token)?;

    let user = state
        .db
        .users
        .get(&claims.sub)
        .await?
        .ok_or(AuthError::AuthenticationRequired)?;

    let current = CurrentUser::new(claims.sub, role_of(&user));
    debug!(user = %current.id, role = %current.role, "authenticated");
    Ok(current)
}

/// Owner id stored on a record
pub fn record_owner(record: &serde_json::Value) -> Option<&str> {
    record.get("user").and_then(serde_json::Value::as_str)
}
