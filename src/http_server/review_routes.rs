//! # Review Routes
//!
//! `/api/v1/reviews` and `/api/v1/bootcamps/:id/reviews`.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;

use super::bootcamp_routes::find_bootcamp;
use super::errors::{ApiError, ApiResult};
use super::extract::{list_query, resource_id, SanitizedJson};
use super::guard::{authenticate, record_owner};
use super::response;
use super::state::{AppState, SharedState};
use crate::auth::Role;
use crate::models::review::{already_reviewed, refresh_average_rating};
use crate::models::{ModelError, Mode, ReviewInput};
use crate::query::{execute, populate, Filter, PopulateSpec, ResultEnvelope};
use crate::store::{Collection, FindQuery, MemoryCollection};

/// Review routes, nested under `/reviews`
pub fn review_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_reviews))
        .route(
            "/:id",
            get(get_review).put(update_review).delete(delete_review),
        )
}

fn bootcamp_summary(state: &AppState) -> PopulateSpec<'_, MemoryCollection> {
    PopulateSpec::parent(&state.db.bootcamps, "bootcamp").select(["name", "description"])
}

async fn find_review(state: &AppState, id: &str) -> ApiResult<Value> {
    let id = resource_id(id)?;
    state
        .db
        .reviews
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review", id))
}

async fn refresh(state: &AppState, review: &Value) -> ApiResult<()> {
    if let Some(bootcamp_id) = review.get("bootcamp").and_then(Value::as_str) {
        refresh_average_rating(&state.db.reviews, &state.db.bootcamps, bootcamp_id).await?;
    }
    Ok(())
}

// ==================
// Handlers
// ==================

async fn list_reviews(
    State(state): State<SharedState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<ResultEnvelope>> {
    let descriptor = list_query(pairs)?;
    let envelope = execute(&descriptor, &state.db.reviews, Some(&bootcamp_summary(&state))).await?;
    Ok(Json(envelope))
}

pub(super) async fn list_bootcamp_reviews(
    State(state): State<SharedState>,
    Path(bootcamp_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let bootcamp_id = resource_id(&bootcamp_id)?;
    let filter = Filter::new().equals("bootcamp", bootcamp_id);
    let reviews = state.db.reviews.find(FindQuery::new(&filter)).await?;
    Ok(response::list(reviews))
}

async fn get_review(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let review = find_review(&state, &id).await?;
    let mut populated = populate(&bootcamp_summary(&state), vec![review]).await?;
    Ok(response::data(populated.pop().unwrap_or_default()))
}

pub(super) async fn create_review(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(bootcamp_id): Path<String>,
    SanitizedJson(body): SanitizedJson,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let user = authenticate(&state, &headers).await?;
    user.authorize(&[Role::User, Role::Admin])?;
    find_bootcamp(&state, &bootcamp_id).await?;

    let input = ReviewInput::from_body(body)?;
    input.validate(Mode::Create)?;
    if already_reviewed(&state.db.reviews, &bootcamp_id, &user.id).await? {
        return Err(ModelError::duplicate("review").into());
    }

    let doc = input.into_document(&bootcamp_id, &user.id, Utc::now())?;
    let stored = state.db.reviews.insert(doc).await?;
    refresh(&state, &stored).await?;
    Ok(response::created(stored))
}

async fn update_review(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    SanitizedJson(body): SanitizedJson,
) -> ApiResult<Json<Value>> {
    let user = authenticate(&state, &headers).await?;
    let existing = find_review(&state, &id).await?;
    user.ensure_owner(record_owner(&existing))?;

    let input = ReviewInput::from_body(body)?;
    input.validate(Mode::Update)?;
    let updated = state
        .db
        .reviews
        .update(&id, Value::Object(input.into_patch()?))
        .await?
        .ok_or_else(|| ApiError::not_found("Review", &id))?;

    refresh(&state, &updated).await?;
    Ok(response::data(updated))
}

async fn delete_review(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let user = authenticate(&state, &headers).await?;
    let existing = find_review(&state, &id).await?;
    user.ensure_owner(record_owner(&existing))?;

    state.db.reviews.delete(&id).await?;
    refresh(&state, &existing).await?;
    Ok(response::deleted())
}
