mod app;
mod modules;
mod types;
mod utils;

use crate::{
    app::App,
    types::{Config, Context, ToContext},
};
use std::{process, sync::Arc};
use tracing_subscriber::prelude::*;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let ctx: Arc<Context> = match Config::from_env() {
        Ok(config) => match config.to_context().await {
            Ok(ctx) => Arc::new(ctx),
            Err(err) => {
                tracing::error!("Failed to build application context: {}", err);
                process::exit(1);
            }
        },
        Err(err) => {
            tracing::error!("Invalid configuration: {}", err);
            process::exit(1);
        }
    };

    if let Err(err) = App::new(ctx).serve().await {
        tracing::error!("Server stopped: {:?}", err);
        process::exit(1);
    }
}
