//! HTTP route definitions
//!
//! The HTTP surface is deliberately small: the websocket upgrade, a health
//! probe, and the static origin serving the host and controller pages. The
//! controller entry point is parameterized by query string
//! (`?room=<id>&player=<1|2>`), which the pages read client-side.

use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::app::AppState;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    active_rooms: usize,
    connected_controllers: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        active_rooms: state.rooms.room_count(),
        connected_controllers: state.rooms.controller_count(),
    })
}
