mod convert;

use crate::types::Context;
use axum::routing::Router;
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(convert::handler::handler),
    tags((name = "image", description = "Image format conversion and background removal"))
)]
pub struct ApiDoc;

pub fn get_router() -> Router<Arc<Context>> {
    Router::new().merge(convert::get_router())
}
