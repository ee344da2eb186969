//! Success bodies for non-list responses.

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// `{ success: true, data }`
pub fn data(value: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": value }))
}

/// 201 with `{ success: true, data }`
pub fn created(value: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, data(value))
}

/// `{ success: true, data: {} }`
pub fn deleted() -> Json<Value> {
    data(json!({}))
}

/// `{ success: true, count, data }` for unpaginated lists
pub fn list(values: Vec<Value>) -> Json<Value> {
    Json(json!({ "success": true, "count": values.len(), "data": values }))
}

/// `{ success: true, token }`
pub fn token(token: String) -> Json<Value> {
    Json(json!({ "success": true, "token": token }))
}
