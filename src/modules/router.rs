use super::image;
use crate::types::Context;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "message": "Welcome to the Image Conversion API" })),
    )
}

async fn openapi() -> impl IntoResponse {
    Json(image::ApiDoc::openapi())
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(health_check))
        .route("/openapi.json", get(openapi))
        .nest("/image", image::get_router())
}
