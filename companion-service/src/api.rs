//! HTTP API for the companion service.
//!
//! - `/health` for liveness and session counts
//! - `/api/poses` for the pose table the client renders from
//! - `/ws` for companion sessions

use axum::{
    Json, Router,
    extract::{Path, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::catalog::{Catalog, PoseDescriptor};
use crate::config::CompanionConfig;
use crate::websocket::{WebSocketManager, handle_ws_connection};

/// Application state
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub config: Arc<CompanionConfig>,
    pub ws_manager: Arc<WebSocketManager>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, config: Arc<CompanionConfig>) -> Self {
        Self {
            catalog,
            config,
            ws_manager: Arc::new(WebSocketManager::new()),
            start_time: Instant::now(),
        }
    }
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/poses", get(list_poses_handler))
        .route("/poses/{name}", get(get_pose_handler));

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Health ===

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        active_sessions: state.ws_manager.connection_count(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
    active_sessions: usize,
}

// === Poses ===

async fn list_poses_handler(State(state): State<Arc<AppState>>) -> Json<Vec<PoseDescriptor>> {
    Json(state.catalog.poses.iter().cloned().collect())
}

/// Unknown names resolve to idle, like every other pose lookup
async fn get_pose_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Json<PoseDescriptor> {
    Json(state.catalog.poses.lookup(&name).clone())
}

// === WebSocket ===

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(move |socket| {
        handle_ws_connection(
            socket,
            state.ws_manager.clone(),
            state.catalog.clone(),
            state.config.clone(),
        )
    })
}
