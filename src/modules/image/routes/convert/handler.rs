use super::service::service;
use super::types::{request, response};
use crate::types::Context;
use axum::{extract::State, response::IntoResponse};
use axum_typed_multipart::TypedMultipart;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/image/convert",
    tag = "image",
    summary = "Convert image",
    description = "Convert an uploaded image to PNG or SVG. Background removal is applied only when the configured converter backend provides it",
    request_body(
        content = request::Form,
        content_type = "multipart/form-data",
        description = "Image file and the target format"
    ),
    responses(
        (
            status = 200,
            description = "Image converted successfully",
            content_type = "application/octet-stream",
            body = response::ConvertedImage
        ),
        (status = 400, description = "Invalid input data"),
        (status = 413, description = "Uploaded file exceeds 10MiB"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn handler(
    State(ctx): State<Arc<Context>>,
    TypedMultipart(body): TypedMultipart<request::Body>,
) -> impl IntoResponse {
    service(ctx, body).await
}
