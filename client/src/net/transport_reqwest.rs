//! Native transport over `reqwest`, used by the CLI.
//!
//! A cookie store stands in for the browser's `credentials: include`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::transport::{Body, FormData, FormPart, HttpRequest, HttpResponse, Method, Transport, TransportError};

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// `reqwest`-backed transport with a cookie jar.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.http.request(method, &request.url).timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(Body::Json(text)) => builder.body(text),
            Some(Body::Form(form)) => builder.multipart(to_multipart(form)?),
            None => builder,
        };

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_owned(), v.to_owned())))
            .collect();
        let body = response.text().await.map_err(map_error)?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            headers,
            body,
        })
    }
}

fn to_multipart(form: FormData) -> Result<Form, TransportError> {
    let mut multipart = Form::new();
    for part in form.parts {
        multipart = match part {
            FormPart::Text { name, value } => multipart.text(name, value),
            FormPart::File { name, file_name, mime, bytes } => {
                let file = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime)
                    .map_err(|e| TransportError::Connection(e.to_string()))?;
                multipart.part(name, file)
            }
        };
    }
    Ok(multipart)
}

fn map_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() { TransportError::Timeout } else { TransportError::Connection(err.to_string()) }
}
