//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::http_error::HttpError;
use goal_tracker_core::ports::{GoalRepository, PortError};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub goals: Arc<dyn GoalRepository>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(goals: Arc<dyn GoalRepository>, config: Arc<Config>) -> Self {
        Self { goals, config }
    }

    /// Turns a port failure into an HTTP error, honoring the environment's
    /// error-detail policy.
    pub fn fail(&self, context: &str, err: PortError) -> HttpError {
        HttpError::from_port(context, err, self.config.exposes_error_details())
    }
}
