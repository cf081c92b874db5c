pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::chat::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/upload", post(handlers::handle_upload))
        .route("/api/v1/chat", post(handlers::handle_chat))
        .route(
            "/api/v1/conversations/:id/versions",
            get(handlers::handle_get_versions),
        )
        .route(
            "/api/v1/conversations/:id/revert/:version",
            post(handlers::handle_revert),
        )
        .with_state(state)
}
