use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use validator::ValidationErrors;

/// 400 body listing every failed field, keyed by field name.
pub fn into_response(errors: ValidationErrors) -> (StatusCode, Json<Value>) {
    tracing::warn!("Rejected invalid payload: {errors}");
    (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors })))
}
