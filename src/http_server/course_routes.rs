//! # Course Routes
//!
//! `/api/v1/courses` and `/api/v1/bootcamps/:id/courses`.

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
use crate::models::course::refresh_average_cost;
use crate::models::{CourseInput, Mode};
use crate::query::{execute, populate, Filter, PopulateSpec, ResultEnvelope};
use crate::store::{Collection, FindQuery, MemoryCollection};

/// Course routes, nested under `/courses`
pub fn course_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_courses))
        .route(
            "/:id",
            get(get_course).put(update_course).delete(delete_course),
        )
}

fn bootcamp_summary(state: &AppState) -> PopulateSpec<'_, MemoryCollection> {
    PopulateSpec::parent(&state.db.bootcamps, "bootcamp").select(["name", "description"])
}

async fn find_course(state: &AppState, id: &str) -> ApiResult<Value> {
    let id = resource_id(id)?;
    state
        .db
        .courses
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course", id))
}

fn bootcamp_of(course: &Value) -> Option<String> {
    course
        .get("bootcamp")
        .and_then(Value::as_str)
        .map(str::to_string)
}

// ==================
// Handlers
// ==================

async fn list_courses(
    State(state): State<SharedState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<ResultEnvelope>> {
    let descriptor = list_query(pairs)?;
    let envelope = execute(&descriptor, &state.db.courses, Some(&bootcamp_summary(&state))).await?;
    Ok(Json(envelope))
}

pub(super) async fn list_bootcamp_courses(
    State(state): State<SharedState>,
    Path(bootcamp_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let bootcamp_id = resource_id(&bootcamp_id)?;
    let filter = Filter::new().equals("bootcamp", bootcamp_id);
    let courses = state.db.courses.find(FindQuery::new(&filter)).await?;
    Ok(response::list(courses))
}

async fn get_course(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let course = find_course(&state, &id).await?;
    let mut populated = populate(&bootcamp_summary(&state), vec![course]).await?;
    Ok(response::data(populated.pop().unwrap_or_default()))
}

pub(super) async fn create_course(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(bootcamp_id): Path<String>,
    SanitizedJson(body): SanitizedJson,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let user = authenticate(&state, &headers).await?;
    user.authorize(&[Role::Publisher, Role::Admin])?;

    let bootcamp = find_bootcamp(&state, &bootcamp_id).await?;
    user.ensure_owner(record_owner(&bootcamp))?;

    let input = CourseInput::from_body(body)?;
    input.validate(Mode::Create)?;
    let doc = input.into_document(&bootcamp_id, &user.id, Utc::now())?;
    let stored = state.db.courses.insert(doc).await?;

    refresh_average_cost(&state.db.courses, &state.db.bootcamps, &bootcamp_id).await?;
    Ok(response::created(stored))
}

async fn update_course(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    SanitizedJson(body): SanitizedJson,
) -> ApiResult<Json<Value>> {
    let user = authenticate(&state, &headers).await?;
    let existing = find_course(&state, &id).await?;
    user.ensure_owner(record_owner(&existing))?;

    let input = CourseInput::from_body(body)?;
    input.validate(Mode::Update)?;
    let updated = state
        .db
        .courses
        .update(&id, Value::Object(input.into_patch()?))
        .await?
        .ok_or_else(|| ApiError::not_found("Course", &id))?;

    if let Some(bootcamp_id) = bootcamp_of(&updated) {
        refresh_average_cost(&state.db.courses, &state.db.bootcamps, &bootcamp_id).await?;
    }
    Ok(response::data(updated))
}

async fn delete_course(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let user = authenticate(&state, &headers).await?;
    let existing = find_course(&state, &id).await?;
    user.ensure_owner(record_owner(&existing))?;

    state.db.courses.delete(&id).await?;
    if let Some(bootcamp_id) = bootcamp_of(&existing) {
        refresh_average_cost(&state.db.courses, &state.db.bootcamps, &bootcamp_id).await?;
    }
    Ok(response::deleted())
}
