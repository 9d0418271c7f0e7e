use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

mod animation;
mod api;
mod catalog;
mod config;
mod error;
mod service;
mod speech;
mod websocket;

use crate::api::AppState;
use crate::catalog::Catalog;
use crate::config::load_app_config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_logging();

    info!(
        "Starting companion service v{}",
        env!("CARGO_PKG_VERSION")
    );

    let app_config = load_app_config()?;
    info!(
        host = %app_config.server.host,
        port = app_config.server.port,
        tick_ms = app_config.companion.tick_ms,
        "Configuration loaded"
    );

    let catalog = Arc::new(Catalog::builtin()?);
    catalog.warn_dangling();
    info!(
        poses = catalog.poses.len(),
        replies = catalog.replies.len(),
        "Companion catalog loaded"
    );

    let state = Arc::new(AppState::new(catalog, Arc::new(app_config.companion)));
    let ws_manager = state.ws_manager.clone();
    let app = api::router(state);

    // Start the server
    let addr = app_config.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ws_manager.close_all();
    info!("Companion service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("companion_service=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
