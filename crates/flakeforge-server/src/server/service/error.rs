//! Error responses for the HTTP service.
//!
//! Clock drift maps to `503 Service Unavailable` with `Retry-After`, since the
//! worker recovers on its own once the wall clock catches up. Anything else is
//! a `500`. Bodies are always `{"error": "<message>"}`.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The generator refused to issue an ID.
    #[error("id generation failed: {0}")]
    Generation(#[from] flakeforge::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Generation(flakeforge::Error::ClockDrift { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(error = %self, %status, "request failed");

        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from_static("1"));
        }
        response
    }
}
