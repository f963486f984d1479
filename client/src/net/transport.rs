//! Transport seam between the API client and the network.
//!
//! DESIGN
//! ======
//! A `Transport` performs exactly one HTTP exchange: no auth headers, no CSRF
//! bookkeeping, no retries. Everything session-related lives in
//! [`super::api::ApiClient`], which keeps that logic identical across the
//! browser (`gloo-net`), native (`reqwest`), and test transports.
//!
//! Futures are not required to be `Send`: the browser runtime is
//! single-threaded and `gloo-net` futures hold JS handles.

use std::time::Duration;

use async_trait::async_trait;

/// HTTP methods the API client issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Whether the method changes server state and therefore needs a CSRF token.
    #[must_use]
    pub fn is_mutating(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch | Self::Delete)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// One part of a multipart form body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file_name: String, mime: String, bytes: Vec<u8> },
}

/// Multipart form body. The transport picks the boundary, so requests that
/// carry one never set `Content-Type` themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormData {
    pub parts: Vec<FormPart>,
}

impl FormData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text { name: name.into(), value: value.into() });
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        });
        self
    }
}

/// Request body variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    /// Serialized JSON text.
    Json(String),
    Form(FormData),
}

/// A fully prepared request, ready to hand to a [`Transport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Response as seen by the API client: status line, headers, and body text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Failures below the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Network unreachable, DNS failure, blocked or opaque cross-origin response.
    #[error("connection failed: {0}")]
    Connection(String),
    /// The request did not complete within its timeout and was aborted.
    #[error("request timed out")]
    Timeout,
}

/// Performs a single HTTP exchange.
#[async_trait(?Send)]
pub trait Transport {
    /// Send `request` with credentials (cookies) included and return the
    /// response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no HTTP response was obtained.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
