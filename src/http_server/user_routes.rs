//! # User Routes
//!
//! Admin-only account management under `/api/v1/users`. Password
//! hashes never leave this module.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;

use super::errors::{ApiError, ApiResult};
use super::extract::{list_query, resource_id, SanitizedJson};
use super::guard::authenticate;
use super::response;
use super::state::{AppState, SharedState};
use crate::auth::{CurrentUser, Role};
use crate::models::user::find_by_email;
use crate::models::{public_view, ModelError, Mode, UserInput, HIDDEN_FIELDS};
use crate::query::{execute, QueryDescriptor, ResultEnvelope, ValidationError};
use crate::store::Collection;

/// User routes, nested under `/users`
pub fn user_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

async fn admin(state: &AppState, headers: &HeaderMap) -> ApiResult<CurrentUser> {
    let user = authenticate(state, headers).await?;
    user.authorize(&[Role::Admin])?;
    Ok(user)
}

/// Hidden fields may not be filtered or sorted on
fn reject_hidden_fields(descriptor: &QueryDescriptor) -> ApiResult<()> {
    let touches = |field: &str| {
        HIDDEN_FIELDS
            .iter()
            .any(|hidden| field == *hidden || field.starts_with(&format!("{}.", hidden)))
    };

    let filtered = descriptor.filter().iter().map(|(field, _)| field.as_str());
    let sorted = descriptor.sort().iter().map(|key| key.field.as_str());
    match filtered.chain(sorted).find(|field| touches(*field)) {
        Some(field) => Err(ValidationError::InvalidField {
            param: field.to_string(),
        }
        .into()),
        None => Ok(()),
    }
}

async fn find_user(state: &AppState, id: &str) -> ApiResult<Value> {
    let id = resource_id(id)?;
    state
        .db
        .users
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))
}

// ==================
// Handlers
// ==================

async fn list_users(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<ResultEnvelope>> {
    admin(&state, &headers).await?;
    let descriptor = list_query(pairs)?;
    reject_hidden_fields(&descriptor)?;

    let mut envelope = execute(&descriptor, &state.db.users, None).await?;
    envelope.data = envelope.data.into_iter().map(public_view).collect();
    Ok(Json(envelope))
}

async fn get_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    admin(&state, &headers).await?;
    let user = find_user(&state, &id).await?;
    Ok(response::data(public_view(user)))
}

async fn create_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    SanitizedJson(body): SanitizedJson,
) -> ApiResult<(StatusCode, Json<Value>)> {
    admin(&state, &headers).await?;

    let input = UserInput::from_body(body)?;
    input.validate(Mode::Create, true)?;
    if let Some(email) = input.email.as_deref() {
        if find_by_email(&state.db.users, email).await?.is_some() {
            return Err(ModelError::duplicate("email").into());
        }
    }

    let stored = state.db.users.insert(input.into_document(Utc::now())?).await?;
    Ok(response::created(public_view(stored)))
}

async fn update_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    SanitizedJson(body): SanitizedJson,
) -> ApiResult<Json<Value>> {
    admin(&state, &headers).await?;
    find_user(&state, &id).await?;

    let input = UserInput::from_body(body)?;
    input.validate(Mode::Update, true)?;
    if let Some(email) = input.email.as_deref() {
        let holder = find_by_email(&state.db.users, email).await?;
        if holder.is_some_and(|u| u.get("_id").and_then(Value::as_str) != Some(id.as_str())) {
            return Err(ModelError::duplicate("email").into());
        }
    }

    let updated = state
        .db
        .users
        .update(&id, Value::Object(input.into_patch()?))
        .await?
        .ok_or_else(|| ApiError::not_found("User", &id))?;
    Ok(response::data(public_view(updated)))
}

async fn delete_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    admin(&state, &headers).await?;
    let id = resource_id(&id)?;
    if !state.db.users.delete(id).await? {
        return Err(ApiError::not_found("User", id));
    }
    Ok(response::deleted())
}
