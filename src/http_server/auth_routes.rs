//! Auth HTTP Routes
//!
//! Registration, login and the current-user lookup under `/api/v1/auth`.

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::errors::{ApiError, ApiResult};
use super::extract::SanitizedJson;
use super::guard::authenticate;
use super::response;
use super::state::SharedState;
use crate::auth::crypto::verify_password;
use crate::auth::AuthError;
use crate::models::user::{find_by_email, role_of};
use crate::models::{public_view, LoginInput, ModelError, Mode, UserInput};
use crate::store::Collection;

/// Auth routes, nested under `/auth`
pub fn auth_routes() -> Router<SharedState> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/me", get(me_handler))
}

fn issue_token(state: &SharedState, user: &Value) -> ApiResult<Json<Value>> {
    let id = user
        .get("_id")
        .and_then(Value::as_str)
        .ok_or(AuthError::TokenGenerationFailed)?;
    let token = state.jwt.generate_access_token(id, role_of(user))?;
    Ok(response::token(token))
}

// ==================
// Handlers
// ==================

/// Register handler
async fn register_handler(
    State(state): State<SharedState>,
    SanitizedJson(body): SanitizedJson,
) -> ApiResult<Json<Value>> {
    let input = UserInput::from_body(body)?;
    input.validate(Mode::Create, false)?;
    if let Some(email) = input.email.as_deref() {
        if find_by_email(&state.db.users, email).await?.is_some() {
            return Err(ModelError::duplicate("email").into());
        }
    }

    let user = state.db.users.insert(input.into_document(Utc::now())?).await?;
    info!(id = ?user.get("_id"), role = %role_of(&user), "user registered");
    issue_token(&state, &user)
}

/// Login handler
async fn login_handler(
    State(state): State<SharedState>,
    SanitizedJson(body): SanitizedJson,
) -> ApiResult<Json<Value>> {
    let input = LoginInput::from_body(body)?;

    let user = find_by_email(&state.db.users, &input.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    let hash = user
        .get("password")
        .and_then(Value::as_str)
        .ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(&input.password, hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    issue_token(&state, &user)
}

/// Current user handler
async fn me_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let current = authenticate(&state, &headers).await?;
    let user = state
        .db
        .users
        .get(&current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &current.id))?;
    Ok(response::data(public_view(user)))
}
