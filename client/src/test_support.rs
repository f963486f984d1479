//! Scripted transport and storage doubles shared by unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::net::transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

/// Transport that answers from a closure and records every request.
///
/// Each send yields to the runtime once before answering so concurrent
/// callers interleave the way they would over a real network.
pub(crate) struct ScriptedTransport {
    handler: Handler,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        Self { handler: Box::new(handler), requests: Mutex::new(Vec::new()) }
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of requests sent with `method` to a URL ending in `path`.
    pub(crate) fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.url.ends_with(path))
            .count()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        tokio::task::yield_now().await;
        (self.handler)(&request)
    }
}

pub(crate) fn json(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        status_text: status_text(status).to_owned(),
        headers: vec![("content-type".to_owned(), "application/json".to_owned())],
        body: body.to_owned(),
    }
}

pub(crate) fn with_csrf(mut response: HttpResponse, token: &str) -> HttpResponse {
    response.headers.push(("x-csrf-token".to_owned(), token.to_owned()));
    response
}

pub(crate) fn no_content() -> HttpResponse {
    HttpResponse { status: 204, status_text: "No Content".to_owned(), headers: Vec::new(), body: String::new() }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}
