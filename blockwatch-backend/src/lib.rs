pub mod config;
mod routes;

use axum::{Router, http::StatusCode, routing::get};
use blockwatch_core::{RconCollector, SaveCollector};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub struct AppState {
    /// `None` when rcon is disabled
    pub rcon: Option<RconCollector>,
    pub save: SaveCollector,
}

/// Create the application router with the given collectors and configuration
pub fn create_app(state: Arc<AppState>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/snapshot", get(routes::snapshot))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
