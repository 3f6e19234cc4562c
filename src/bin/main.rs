#![warn(clippy::all)]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tracing::{event, info, trace_span, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::Registry;

use recipe_api::api::{create_router, AppState};
use recipe_api::config::ServerConfig;
use recipe_api::database::connection::establish_pooled_connection;
use recipe_api::repository::database_repository::DatabaseRepository;
use recipe_api::serializers::recipe::RecipeSerializer;

fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load();

    let stdout_log = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .pretty();
    let subscriber = Registry::default()
        .with(stdout_log)
        .with(config.log_level);

    tracing::subscriber::set_global_default(subscriber)
        .context("Unable to set global subscriber")?;

    start(config)
}

fn start(config: ServerConfig) -> anyhow::Result<()> {
    let state = {
        let span = trace_span!("starting main");
        let _guard = span.enter();

        event!(Level::TRACE, "establishing pooled connection");
        let pool = establish_pooled_connection(&config.database)
            .context("Unable to open the database")?;

        AppState::new(
            Arc::new(DatabaseRepository::new(pool)),
            RecipeSerializer::new(config.ingredient_write_mode),
        )
    };

    let rt = Runtime::new().context("Unable to create Runtime")?;
    rt.block_on(serve(config.bind_address, state))
}

async fn serve(address: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Unable to bind {address}"))?;

    info!(%address, mode = ?state.recipes.mode(), "Listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
