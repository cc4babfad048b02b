//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::http::events::capture_events;
use crate::http::handlers::{
    cancel_capture, capture_message, capture_snapshot, health, pause_capture, start_capture,
};
use crate::state::ApiState;

/// Create the router.
///
/// ```text
/// /api/capture
///   GET    /snapshot  - Current record
///   POST   /start     - Start now or arm a schedule
///   POST   /pause     - Pause the running capture
///   POST   /cancel    - Cancel and clear
///   POST   /message   - Raw tagged request
///   GET    /events    - Server-sent change notifications
///
/// /health
/// ```
pub fn create_router(state: Arc<ApiState>) -> Router {
    let capture_routes = Router::new()
        .route("/snapshot", get(capture_snapshot))
        .route("/start", post(start_capture))
        .route("/pause", post(pause_capture))
        .route("/cancel", post(cancel_capture))
        .route("/message", post(capture_message))
        .route("/events", get(capture_events))
        .with_state(state.clone());

    Router::new()
        .nest("/api/capture", capture_routes)
        .route("/health", get(health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
