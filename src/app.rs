use crate::{modules, types::Context};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    Router,
};
use std::{io, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors, trace};

// Multipart framing on top of the 10MiB file part.
const MAX_BODY_BYTES: usize = 11 * 1024 * 1024;

pub fn router(ctx: Arc<Context>) -> Router {
    Router::new()
        .nest("/api", modules::get_router())
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(trace::TraceLayer::new_for_http())
                .layer(
                    cors::CorsLayer::new()
                        .allow_methods([Method::OPTIONS, Method::GET, Method::POST])
                        .allow_headers([header::CONTENT_TYPE])
                        .allow_origin(cors::Any),
                ),
        )
}

pub struct App {
    ctx: Arc<Context>,
    router: Router,
}

impl App {
    pub fn new(ctx: Arc<Context>) -> Self {
        let router = router(ctx.clone());

        Self { ctx, router }
    }

    pub async fn serve(self) -> io::Result<()> {
        let listener = TcpListener::bind(format!("{}:{}", self.ctx.app.host, self.ctx.app.port)).await?;

        tracing::info!(
            "App is running on {}:{} ({}, {:?})",
            self.ctx.app.host,
            self.ctx.app.port,
            self.ctx.app.url,
            self.ctx.app.environment
        );

        axum::serve(listener, self.router).await
    }
}
