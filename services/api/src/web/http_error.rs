//! services/api/src/web/http_error.rs
//!
//! Converts port failures into JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use goal_tracker_core::ports::PortError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Debug rendering of the failure. Only sent in development.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl HttpError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                code: None,
                message: None,
                details: None,
            },
        }
    }

    /// Maps a port failure for the operation named by `context` (e.g.
    /// "Failed to update goal"). Store diagnostics are echoed to the caller;
    /// the debug rendering only when `expose_details` is set.
    pub fn from_port(context: &str, err: PortError, expose_details: bool) -> Self {
        let details = expose_details.then(|| format!("{:?}", err));
        match err {
            PortError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Goal not found"),
            PortError::Invalid(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            PortError::Database { code, message } => {
                error!(?code, %message, "{}", context);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ErrorBody {
                        error: context.to_string(),
                        code,
                        message: Some(message),
                        details,
                    },
                }
            }
            PortError::Unexpected(message) => {
                error!(%message, "{}", context);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ErrorBody {
                        error: context.to_string(),
                        code: None,
                        message: Some(message),
                        details,
                    },
                }
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_and_invalid_map_to_client_errors() {
        let err = HttpError::from_port("Failed", PortError::NotFound("x".into()), true);
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert!(err.body.details.is_none());

        let err = HttpError::from_port("Failed", PortError::Invalid("bad".into()), false);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error, "bad");
    }

    #[test]
    fn store_errors_echo_code_and_hide_details_outside_development() {
        let store = || PortError::Database {
            code: Some("23514".into()),
            message: "check constraint violated".into(),
        };

        let hidden = HttpError::from_port("Failed to create goal", store(), false);
        assert_eq!(hidden.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(hidden.body.error, "Failed to create goal");
        assert_eq!(hidden.body.code.as_deref(), Some("23514"));
        assert_eq!(hidden.body.message.as_deref(), Some("check constraint violated"));
        assert!(hidden.body.details.is_none());

        let shown = HttpError::from_port("Failed to create goal", store(), true);
        assert!(shown.body.details.unwrap().contains("Database"));
    }
}
