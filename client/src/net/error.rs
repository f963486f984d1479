//! Normalized API error type.
//!
//! Every failure the API client surfaces is one of these variants, whatever
//! transport produced it. Transport internals never reach the message text.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde::Deserialize;

/// Error surfaced by [`super::api::ApiClient`] calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure (network unreachable, opaque/blocked CORS).
    #[error("Unable to reach the server. Check that the backend is running and reachable.")]
    Connection,

    /// The request exceeded its timeout and was aborted.
    #[error("the server did not answer in time")]
    Timeout,

    /// The server rejected the CSRF token again after one fresh acquisition,
    /// or the bootstrap endpoint returned no token.
    #[error("request rejected: CSRF token invalid")]
    Csrf,

    /// Any other non-2xx response.
    #[error("{message}")]
    Api { message: String, status: u16, code: Option<String> },

    /// A 2xx response whose body could not be decoded into the expected type.
    #[error("unexpected response from server: {0}")]
    Decode(String),

    /// The request body could not be serialized.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Human-readable message suitable for display.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status, when the failure came from an HTTP response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Csrf => Some(403),
            _ => None,
        }
    }

    /// Stable machine-readable code; server-provided codes win for `Api`.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Connection => "E_CONNECTION",
            Self::Timeout => "E_TIMEOUT",
            Self::Csrf => "E_CSRF",
            Self::Api { code: Some(code), .. } => code.as_str(),
            Self::Api { code: None, .. } => "E_API",
            Self::Decode(_) => "E_DECODE",
            Self::InvalidRequest(_) => "E_INVALID_REQUEST",
        }
    }

    /// Build the normalized error for a non-2xx response.
    ///
    /// The message comes from the JSON body's `message` (then `error`) field
    /// and falls back to the status line.
    #[must_use]
    pub fn from_response(status: u16, status_text: &str, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).ok();
        let code = parsed.as_ref().and_then(|b| b.code.clone());
        let message = parsed
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| status_line(status, status_text));
        Self::Api { message, status, code }
    }
}

fn status_line(status: u16, status_text: &str) -> String {
    let text = status_text.trim();
    if text.is_empty() { status.to_string() } else { format!("{status} {text}") }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default, deserialize_with = "string_or_none")]
    message: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    error: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    code: Option<String>,
}

/// Accept strings, stringify numbers, ignore everything else.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
