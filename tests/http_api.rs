//! HTTP API Tests
//!
//! Drives the full router in-process:
//! - Health and list envelopes
//! - Query validation errors as 400 bodies
//! - Unknown ids as 404
//! - Register, login and role-gated writes
//! - Radius search through the geocoder table

use std::collections::HashMap;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use devcamper::config::AppConfig;
use devcamper::geo::ZipcodeEntry;
use devcamper::http_server::{build_router, AppState};
use devcamper::store::{Database, SeedData};
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Helper Functions
// =============================================================================

const CAMP_A: &str = "5d713995-b721-4e2b-9c63-1a1f5a8f6a01";
const CAMP_B: &str = "5d713a66-ec8c-4a31-8b2f-6c1a7b9e2b02";
const CAMP_C: &str = "5d725a03-7c0a-4c34-b7e8-2d8f1f9c8c03";

fn geocoder_table() -> HashMap<String, ZipcodeEntry> {
    HashMap::from([
        (
            "02118".to_string(),
            ZipcodeEntry {
                latitude: 42.3359,
                longitude: -71.0726,
                city: "Boston".to_string(),
                state: "MA".to_string(),
                country: "US".to_string(),
            },
        ),
        (
            "02215".to_string(),
            ZipcodeEntry {
                latitude: 42.3480,
                longitude: -71.1010,
                city: "Boston".to_string(),
                state: "MA".to_string(),
                country: "US".to_string(),
            },
        ),
    ])
}

fn seed() -> SeedData {
    let camp = |id: &str, name: &str, cost: u64, lng: f64, lat: f64| {
        json!({
            "_id": id,
            "name": name,
            "averageCost": cost,
            "careers": ["Web Development"],
            "location": {"type": "Point", "coordinates": [lng, lat]},
            "createdAt": "2026-01-01T00:00:00.000Z"
        })
    };
    SeedData {
        bootcamps: vec![
            camp(CAMP_A, "Devworks Bootcamp", 1000, -71.0726, 42.3359),
            camp(CAMP_B, "ModernTech Bootcamp", 2500, -71.1010, 42.3480),
            camp(CAMP_C, "Codemasters", 1800, -122.4194, 37.7749),
        ],
        ..SeedData::default()
    }
}

async fn app() -> Router {
    let mut config = AppConfig::default();
    config.geocoder = geocoder_table();

    let db = Database::new();
    db.seed(seed()).await.unwrap();
    build_router(AppState::new(config, db).shared())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn register(app: &Router, email: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "name": "Test User",
            "email": email,
            "password": "123456",
            "role": role
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

fn new_bootcamp(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Full stack web development",
        "address": "233 Bay State Rd Boston MA 02215",
        "careers": ["Web Development", "UI/UX"]
    })
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_list_envelope() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/bootcamps?averageCost%5Blte%5D=2000&sort=name&limit=1&select=name",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    assert_eq!(body["pagination"], json!({"next": {"page": 2, "limit": 1}}));
    assert_eq!(body["data"][0]["name"], "Codemasters");
    assert_eq!(body["data"][0]["courses"], json!([]));
    assert!(body["data"][0].get("averageCost").is_none());
}

#[tokio::test]
async fn test_invalid_page_is_bad_request() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/v1/bootcamps?page=abc", None, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("page"));
}

#[tokio::test]
async fn test_unknown_operator_is_bad_request() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/courses?tuition%5Bregex%5D=1",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_get_by_id() {
    let app = app().await;

    let uri = format!("/api/v1/bootcamps/{}", CAMP_B);
    let (status, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "ModernTech Bootcamp");

    let (status, body) = send(&app, Method::GET, "/api/v1/bootcamps/not-an-id", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let missing = format!("/api/v1/bootcamps/{}", uuid_nil());
    let (status, _) = send(&app, Method::GET, &missing, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn uuid_nil() -> &'static str {
    "00000000-0000-0000-0000-000000000000"
}

#[tokio::test]
async fn test_radius_search() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/bootcamps/radius/02118/10",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/bootcamps/radius/99999/10",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Auth and Writes
// =============================================================================

#[tokio::test]
async fn test_write_requires_token() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/bootcamps",
        None,
        Some(new_bootcamp("Anonymous Camp")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_user_role_cannot_create_bootcamp() {
    let app = app().await;
    let token = register(&app, "plain@example.com", "user").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/bootcamps",
        Some(&token),
        Some(new_bootcamp("Plain Camp")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_publisher_creates_bootcamp() {
    let app = app().await;
    register(&app, "publisher@example.com", "publisher").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"email": "Publisher@Example.com", "password": "123456"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/bootcamps",
        Some(&token),
        Some(new_bootcamp("Boston Code Camp")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["slug"], "boston-code-camp");
    assert_eq!(body["data"]["location"]["city"], "Boston");
    assert_eq!(body["data"]["location"]["zipcode"], "02215");

    // One bootcamp per publisher
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/bootcamps",
        Some(&token),
        Some(new_bootcamp("Second Camp")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_password_rejected() {
    let app = app().await;
    register(&app, "someone@example.com", "user").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"email": "someone@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_me_hides_password() {
    let app = app().await;
    let token = register(&app, "me@example.com", "user").await;

    let (status, body) = send(&app, Method::GET, "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "me@example.com");
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = app().await;
    register(&app, "twice@example.com", "user").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({"name": "Again", "email": "twice@example.com", "password": "123456"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_operator_keys_in_body_rejected() {
    let app = app().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({"email": {"$gt": ""}, "password": "123456"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Derived Aggregates
// =============================================================================

#[tokio::test]
async fn test_courses_keep_average_cost() {
    let app = app().await;
    let token = register(&app, "owner@example.com", "publisher").await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/v1/bootcamps",
        Some(&token),
        Some(new_bootcamp("Tuition Camp")),
    )
    .await;
    let camp_id = body["data"]["_id"].as_str().unwrap().to_string();
    let courses_uri = format!("/api/v1/bootcamps/{}/courses", camp_id);

    for (title, tuition) in [("Front End", 10000.0), ("Back End", 13000.0)] {
        let (status, _) = send(
            &app,
            Method::POST,
            &courses_uri,
            Some(&token),
            Some(json!({
                "title": title,
                "description": "Twelve weeks of practice",
                "weeks": "12",
                "tuition": tuition,
                "minimumSkill": "beginner"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&app, Method::GET, &format!("/api/v1/bootcamps/{}", camp_id), None, None).await;
    assert_eq!(body["data"]["averageCost"], 11500);

    let (_, body) = send(&app, Method::GET, &courses_uri, None, None).await;
    assert_eq!(body["count"], 2);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/courses?sort=title&select=title",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["title"], "Back End");
    assert_eq!(body["data"][0]["bootcamp"]["name"], "Tuition Camp");
}

#[tokio::test]
async fn test_one_review_per_user() {
    let app = app().await;
    let token = register(&app, "reviewer@example.com", "user").await;
    let uri = format!("/api/v1/bootcamps/{}/reviews", CAMP_A);
    let review = json!({"title": "Great", "text": "Learned a lot", "rating": 8});

    let (status, _) = send(&app, Method::POST, &uri, Some(&token), Some(review.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, Method::POST, &uri, Some(&token), Some(review)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, Method::GET, &format!("/api/v1/bootcamps/{}", CAMP_A), None, None).await;
    assert_eq!(body["data"]["averageRating"], 8.0);
}
