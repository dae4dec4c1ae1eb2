//! services/api/src/error.rs
//!
//! Errors that stop the goal tracker service from starting or serving.
//! Per-request failures are rendered as `HttpError` instead and never reach here.

use crate::config::ConfigError;
use axum::http::header::InvalidHeaderValue;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The goal store could not be reached.
    #[error("Goal store unavailable: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Could not apply database migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// `CORS_ALLOWED_ORIGIN` is not usable as a header value.
    #[error("Invalid CORS origin '{origin}': {source}")]
    CorsOrigin {
        origin: String,
        #[source]
        source: InvalidHeaderValue,
    },

    /// Binding or serving on the listen socket failed.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
