//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use farmhub_domain::error::FarmHubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps errors to an HTTP response with the appropriate status code.
pub enum ApiError {
    /// A domain or storage error.
    Domain(FarmHubError),
    /// The request itself was malformed (bad id, bad enum token).
    BadRequest(String),
}

impl From<FarmHubError> for ApiError {
    fn from(err: FarmHubError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Domain(err) => match &err {
                FarmHubError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
                FarmHubError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
                FarmHubError::ManualOverride(err) => (StatusCode::CONFLICT, err.to_string()),
                FarmHubError::StateConflict(err) => (StatusCode::CONFLICT, err.to_string()),
                FarmHubError::Storage(err) => {
                    tracing::error!(error = %err, "storage error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
