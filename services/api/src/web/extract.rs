//! services/api/src/web/extract.rs
//!
//! A JSON body extractor whose rejections use the same error body as every
//! other goal API failure.

use crate::web::http_error::HttpError;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

/// `Json<T>`, but a malformed or mistyped body is a 400 `ErrorBody`.
/// Content-type and size rejections keep axum's status code.
#[derive(Debug)]
pub struct GoalJson<T>(pub T);

impl<T, S> FromRequest<S> for GoalJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!("Rejected request body: {}", rejection.body_text());
                Err(rejection_to_http(rejection))
            }
        }
    }
}

fn rejection_to_http(rejection: JsonRejection) -> HttpError {
    let status = match &rejection {
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
            StatusCode::BAD_REQUEST
        }
        other => other.status(),
    };
    HttpError::new(status, rejection.body_text())
}
