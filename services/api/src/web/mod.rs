pub mod dto;
pub mod extract;
pub mod http_error;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, patch},
    Router,
};
use std::sync::Arc;

pub use rest::ApiDoc;
pub use state::AppState;

/// Routes for the goal resource, mounted under `/api/goals`.
pub fn goal_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(rest::list_goals_handler).post(rest::create_goal_handler))
        .route("/current", get(rest::get_current_goal_handler))
        .route(
            "/{id}",
            get(rest::get_goal_handler)
                .put(rest::update_goal_handler)
                .delete(rest::delete_goal_handler),
        )
        .route("/{id}/status", patch(rest::patch_goal_status_handler))
        .route("/{id}/progress", patch(rest::patch_goal_progress_handler))
}

/// Builds the API router with its state applied.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(rest::health_handler))
        .nest("/api/goals", goal_routes())
        .with_state(state)
}
