//! # Bootcamp Routes
//!
//! `/api/v1/bootcamps`, including the nested course and review routes
//! and the radius search.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::course_routes::{create_course, list_bootcamp_courses};
use super::errors::{ApiError, ApiResult};
use super::extract::{list_query, resource_id, SanitizedJson};
use super::guard::{authenticate, record_owner};
use super::response;
use super::review_routes::{create_review, list_bootcamp_reviews};
use super::state::{AppState, SharedState};
use crate::auth::Role;
use crate::geo::{radius_radians, within_radius, GeoPoint, Geocoder};
use crate::models::bootcamp::{delete_with_dependents, name_taken};
use crate::models::{BootcampInput, ModelError, Mode};
use crate::query::{execute, Filter, PopulateSpec, ResultEnvelope};
use crate::store::{Collection, FindQuery};

/// Bootcamp routes, nested under `/bootcamps`
pub fn bootcamp_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_bootcamps).post(create_bootcamp))
        .route("/radius/:zipcode/:distance", get(bootcamps_in_radius))
        .route(
            "/:id",
            get(get_bootcamp).put(update_bootcamp).delete(delete_bootcamp),
        )
        .route(
            "/:id/courses",
            get(list_bootcamp_courses).post(create_course),
        )
        .route(
            "/:id/reviews",
            get(list_bootcamp_reviews).post(create_review),
        )
}

/// Load a bootcamp or fail with 404
pub(super) async fn find_bootcamp(state: &AppState, id: &str) -> ApiResult<Value> {
    let id = resource_id(id)?;
    state
        .db
        .bootcamps
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bootcamp", id))
}

// ==================
// Handlers
// ==================

async fn list_bootcamps(
    State(state): State<SharedState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<ResultEnvelope>> {
    let descriptor = list_query(pairs)?;
    let courses = PopulateSpec::children("courses", &state.db.courses, "bootcamp");
    let envelope = execute(&descriptor, &state.db.bootcamps, Some(&courses)).await?;
    Ok(Json(envelope))
}

async fn get_bootcamp(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let bootcamp = find_bootcamp(&state, &id).await?;
    Ok(response::data(bootcamp))
}

async fn create_bootcamp(
    State(state): State<SharedState>,
    headers: HeaderMap,
    SanitizedJson(body): SanitizedJson,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let user = authenticate(&state, &headers).await?;
    user.authorize(&[Role::Publisher, Role::Admin])?;

    // Publishers may own one bootcamp
    if !user.is_admin() {
        let owned = Filter::new().equals("user", user.id.as_str());
        if state.db.bootcamps.count(&owned).await? > 0 {
            return Err(ApiError::BadRequest(format!(
                "The user with ID {} has already published a bootcamp",
                user.id
            )));
        }
    }

    let input = BootcampInput::from_body(body)?;
    input.validate(Mode::Create)?;
    if let Some(name) = input.name.as_deref() {
        if name_taken(&state.db.bootcamps, name, None).await? {
            return Err(ModelError::duplicate("name").into());
        }
    }

    let address = input.address.clone().unwrap_or_default();
    let location = state.geocoder.geocode(&address).await?;
    let doc = input.into_document(&user.id, location, Utc::now())?;
    let stored = state.db.bootcamps.insert(doc).await?;

    info!(id = ?stored.get("_id"), owner = %user.id, "bootcamp created");
    Ok(response::created(stored))
}

async fn update_bootcamp(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    SanitizedJson(body): SanitizedJson,
) -> ApiResult<Json<Value>> {
    let user = authenticate(&state, &headers).await?;
    let existing = find_bootcamp(&state, &id).await?;
    user.ensure_owner(record_owner(&existing))?;

    let input = BootcampInput::from_body(body)?;
    input.validate(Mode::Update)?;
    if let Some(name) = input.name.as_deref() {
        if name_taken(&state.db.bootcamps, name, Some(id.as_str())).await? {
            return Err(ModelError::duplicate("name").into());
        }
    }

    let address = input.address.clone();
    let mut patch = input.into_patch()?;
    if let Some(address) = address {
        let location = state.geocoder.geocode(&address).await?;
        patch.insert(
            "location".to_string(),
            serde_json::to_value(location).map_err(ModelError::from)?,
        );
    }

    let updated = state
        .db
        .bootcamps
        .update(&id, Value::Object(patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Bootcamp", &id))?;
    Ok(response::data(updated))
}

async fn delete_bootcamp(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let user = authenticate(&state, &headers).await?;
    let existing = find_bootcamp(&state, &id).await?;
    user.ensure_owner(record_owner(&existing))?;

    let db = &state.db;
    if !delete_with_dependents(&db.bootcamps, &db.courses, &db.reviews, &id).await? {
        return Err(ApiError::not_found("Bootcamp", &id));
    }
    Ok(response::deleted())
}

async fn bootcamps_in_radius(
    State(state): State<SharedState>,
    Path((zipcode, distance)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let radians = radius_radians(&distance)?;
    let center = state.geocoder.geocode(&zipcode).await?.point();

    let everything = Filter::new();
    let bootcamps = state.db.bootcamps.find(FindQuery::new(&everything)).await?;
    let inside: Vec<Value> = bootcamps
        .into_iter()
        .filter(|b| GeoPoint::from_record(b).is_some_and(|p| within_radius(&center, &p, radians)))
        .collect();

    Ok(response::list(inside))
}
