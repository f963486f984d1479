//! `/api/*` reverse proxy to the backend.
//!
//! DESIGN
//! ======
//! The request is forwarded with its method, path, query, body, and
//! end-to-end headers (cookies and `X-CSRF-Token` included); the response
//! comes back the same way, status untouched. Bodies are buffered: API
//! payloads are small and buffering keeps the upstream call a single
//! `reqwest` exchange.

#[cfg(test)]
#[path = "proxy_test.rs"]
mod proxy_test;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::header::{CONNECTION, CONTENT_LENGTH, HOST};
use axum::http::{HeaderMap, HeaderName};
use axum::response::Response;

use crate::error::ServerError;
use crate::state::AppState;

/// Largest request body forwarded upstream (multipart uploads included).
pub const MAX_PROXY_BODY_BYTES: usize = 25 * 1024 * 1024;

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

pub async fn forward(State(state): State<AppState>, request: Request) -> Result<Response, ServerError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts.uri.path_and_query().map_or_else(|| parts.uri.path(), |pq| pq.as_str());
    let url = format!("{}{path_and_query}", state.config.api_url);
    let body = to_bytes(body, MAX_PROXY_BODY_BYTES).await.map_err(|e| ServerError::RequestBody(e.to_string()))?;

    let mut headers = end_to_end(&parts.headers);
    headers.remove(HOST);
    headers.remove(CONTENT_LENGTH);
    if let Some(host) = parts.headers.get(HOST) {
        headers.insert(X_FORWARDED_HOST, host.clone());
    }

    tracing::debug!(method = %parts.method, %url, "proxying api request");
    let upstream = state
        .http
        .request(parts.method, url.as_str())
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(upstream_error)?;

    let status = upstream.status();
    let mut headers = end_to_end(upstream.headers());
    headers.remove(CONTENT_LENGTH);
    let bytes = upstream.bytes().await.map_err(upstream_error)?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// `headers` minus hop-by-hop headers, including any named in `Connection`.
#[must_use]
pub fn end_to_end(headers: &HeaderMap) -> HeaderMap {
    let named: Vec<String> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let mut kept = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let lower = name.as_str();
        if HOP_BY_HOP.contains(&lower) || named.iter().any(|n| n == lower) {
            continue;
        }
        kept.append(name.clone(), value.clone());
    }
    kept
}

fn upstream_error(err: reqwest::Error) -> ServerError {
    if err.is_timeout() { ServerError::UpstreamTimeout } else { ServerError::Upstream(err.to_string()) }
}

