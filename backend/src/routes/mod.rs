//! Route definitions for the stock replenishment service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/replenishment", replenishment_routes())
}

/// Replenishment routes
fn replenishment_routes() -> Router<AppState> {
    Router::new()
        .route("/run", post(handlers::run_now))
        .route("/policies", get(handlers::get_policies))
}
