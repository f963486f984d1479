//! Handler error type.
//!
//! Every variant renders as JSON `{"error": "..."}`. Upstream failures name
//! the problem; anything internal is logged and reported generically.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("upstream request failed: {0}")]
    Upstream(String),
    #[error("upstream request timed out")]
    UpstreamTimeout,
    #[error("request body could not be read: {0}")]
    RequestBody(String),
}

impl ServerError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::RequestBody(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            Self::Upstream(_) => "API server unavailable",
            Self::UpstreamTimeout => "API server did not respond in time",
            Self::RequestBody(_) => "Request body too large",
            Self::Config(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Response for a panicked handler.
#[must_use]
pub fn internal_error_response() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": INTERNAL_ERROR_MESSAGE }))).into_response()
}
