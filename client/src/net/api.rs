//! REST client for the survey backend.
//!
//! ARCHITECTURE
//! ============
//! `ApiClient` is the single point of contact with the backend. It owns the
//! in-memory auth and CSRF tokens, builds headers, unwraps the `{data, message}`
//! envelope, and normalizes every failure into [`ApiError`]. The network itself
//! is behind the [`Transport`] seam.
//!
//! CSRF LIFECYCLE
//! ==============
//! Mutating requests acquire a token from the bootstrap endpoint before their
//! first send; acquisitions are serialized behind an async gate, and callers
//! that queued while a bootstrap was in flight take its outcome, success or
//! failure, instead of sending their own. Every
//! successful response may rotate the token. A 403 mentioning `CSRF` drops the
//! token and, for mutating requests, allows exactly one retry (see
//! [`CsrfPhase`]).
//!
//! TRADE-OFFS
//! ==========
//! Envelope unwrapping sniffs for a `data` key. Endpoints whose payload has a
//! legitimate top-level `data` field must opt out with [`ApiRequest::raw`].

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::csrf::{self, CSRF_REQUEST_HEADER, CsrfPhase};
use super::error::ApiError;
use super::transport::{Body, FormData, HttpRequest, HttpResponse, Method, Transport, TransportError};

pub const DEFAULT_BASE_URL: &str = "/api";
pub const DEFAULT_CSRF_PATH: &str = "/health";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const AUTH_SCOPE_PREFIX: &str = "/auth/";
const CLIENT_MARKER_HEADER: &str = "X-Requested-With";
const CLIENT_MARKER_VALUE: &str = "XMLHttpRequest";
const JSON_CONTENT_TYPE: &str = "application/json";

// =============================================================================
// CONFIG
// =============================================================================

/// Where the backend lives and how long a request may take.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    /// Prefix for every endpoint, without trailing slash (e.g. `/api`).
    pub base_url: String,
    /// Bootstrap endpoint whose success response carries `x-csrf-token`.
    pub csrf_path: String,
    /// Per-request timeout, enforced by the transport.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            csrf_path: DEFAULT_CSRF_PATH.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    #[must_use]
    pub fn with_csrf_path(mut self, csrf_path: impl Into<String>) -> Self {
        self.csrf_path = normalize_endpoint(&csrf_path.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// A request as callers describe it: method, endpoint, optional body, extra headers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
    method: Method,
    endpoint: String,
    body: Option<Body>,
    headers: Vec<(String, String)>,
    unwrap_envelope: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, endpoint: &str) -> Self {
        Self {
            method,
            endpoint: normalize_endpoint(endpoint),
            body: None,
            headers: Vec::new(),
            unwrap_envelope: true,
        }
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let text = serde_json::to_string(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.body = Some(Body::Json(text));
        Ok(self)
    }

    /// Attach a multipart form body.
    #[must_use]
    pub fn form(mut self, form: FormData) -> Self {
        self.body = Some(Body::Form(form));
        self
    }

    /// Add a header; it overrides a default header of the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Return the response body as-is instead of unwrapping `data`.
    #[must_use]
    pub fn raw(mut self) -> Self {
        self.unwrap_envelope = false;
        self
    }

    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn is_form(&self) -> bool {
        matches!(self.body, Some(Body::Form(_)))
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with('/') { endpoint.to_owned() } else { format!("/{endpoint}") }
}

/// Login and registration happen before any session exists, so `/auth/*`
/// calls do not wait for a CSRF token.
pub(crate) fn is_auth_scoped(endpoint: &str) -> bool {
    endpoint.starts_with(AUTH_SCOPE_PREFIX)
}

/// Return `data` from an envelope object, or the body unchanged.
pub(crate) fn unwrap_envelope(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        if let Some(data) = map.remove("data") {
            return data;
        }
    }
    value
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client holding the session's auth token and CSRF token.
pub struct ApiClient<T> {
    transport: T,
    config: ApiConfig,
    auth_token: Mutex<Option<String>>,
    csrf_token: Mutex<Option<String>>,
    csrf_gate: futures::lock::Mutex<()>,
    last_bootstrap: Mutex<Bootstrap>,
}

/// Outcome of the most recent CSRF bootstrap, numbered so queued callers can
/// tell whether one settled while they waited.
#[derive(Debug, Default)]
struct Bootstrap {
    epoch: u64,
    outcome: Option<Result<(), ApiError>>,
}

impl<T: Transport> ApiClient<T> {
    #[must_use]
    pub fn new(transport: T, config: ApiConfig) -> Self {
        Self {
            transport,
            config,
            auth_token: Mutex::new(None),
            csrf_token: Mutex::new(None),
            csrf_gate: futures::lock::Mutex::new(()),
            last_bootstrap: Mutex::new(Bootstrap::default()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn auth_token(&self) -> Option<String> {
        lock(&self.auth_token).clone()
    }

    /// Replace the bearer token. A different token invalidates the CSRF token.
    pub fn set_auth_token(&self, token: Option<String>) {
        let mut current = lock(&self.auth_token);
        if *current != token {
            *current = token;
            drop(current);
            self.clear_csrf_token();
        }
    }

    #[must_use]
    pub fn csrf_token(&self) -> Option<String> {
        lock(&self.csrf_token).clone()
    }

    pub fn clear_csrf_token(&self) {
        *lock(&self.csrf_token) = None;
    }

    /// Forget the auth token and the CSRF token.
    pub fn clear_session(&self) {
        *lock(&self.auth_token) = None;
        self.clear_csrf_token();
    }

    /// `GET` an endpoint.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status, or undecodable body.
    pub async fn get<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R, ApiError> {
        self.send(ApiRequest::new(Method::Get, endpoint)).await
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on serialization or transport failure, non-2xx
    /// status, exhausted CSRF retry, or undecodable body.
    pub async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(ApiRequest::new(Method::Post, endpoint).json(body)?).await
    }

    /// `PUT` a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn put<B, R>(&self, endpoint: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(ApiRequest::new(Method::Put, endpoint).json(body)?).await
    }

    /// `PATCH` a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn patch<B, R>(&self, endpoint: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(ApiRequest::new(Method::Patch, endpoint).json(body)?).await
    }

    /// `DELETE` an endpoint.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn delete<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R, ApiError> {
        self.send(ApiRequest::new(Method::Delete, endpoint)).await
    }

    /// `POST` a multipart form; the transport sets the boundary.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn post_form_data<R: DeserializeOwned>(&self, endpoint: &str, form: FormData) -> Result<R, ApiError> {
        self.send(ApiRequest::new(Method::Post, endpoint).form(form)).await
    }

    /// Send a request and decode the (unwrapped) body into `R`.
    ///
    /// Empty and `204` bodies decode from JSON `null`, so `()` and `Option<_>`
    /// are valid targets for them.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::post`].
    pub async fn send<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        let value = self.execute(&request).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let mutating = request.method.is_mutating();
        if mutating && !is_auth_scoped(&request.endpoint) && self.csrf_token().is_none() {
            self.acquire_csrf_token().await?;
        }

        let mut phase = CsrfPhase::Clean;
        loop {
            let (response, sent_csrf) = self.dispatch(request).await?;
            let rejected = csrf::is_csrf_rejection(&response);
            if rejected {
                log::warn!("CSRF token rejected for {} {}", request.method.as_str(), request.endpoint);
                self.discard_csrf_token(sent_csrf.as_deref());
            }

            phase = phase.on_response(rejected, mutating);
            match phase {
                CsrfPhase::Clean => return finish(request, &response),
                CsrfPhase::Rejected => {
                    self.acquire_csrf_token().await?;
                    phase = phase.on_reacquired();
                }
                CsrfPhase::Retrying | CsrfPhase::Failed => return Err(ApiError::Csrf),
            }
        }
    }

    /// Send once; returns the response and the CSRF token that was attached.
    async fn dispatch(&self, request: &ApiRequest) -> Result<(HttpResponse, Option<String>), ApiError> {
        let sent_csrf = if request.method.is_mutating() { self.csrf_token() } else { None };
        let http = HttpRequest {
            method: request.method,
            url: self.url(&request.endpoint),
            headers: self.headers_for(request, sent_csrf.as_deref()),
            body: request.body.clone(),
            timeout: self.config.timeout,
        };

        let response = self.exchange(http).await?;
        if let Some(token) = csrf::rotated_token(&response) {
            self.store_csrf_token(token);
        }
        Ok((response, sent_csrf))
    }

    /// Fetch a CSRF token unless one is already held.
    ///
    /// The gate makes concurrent callers queue behind a single in-flight
    /// bootstrap. A caller that finds a bootstrap settled since it started
    /// waiting shares that outcome rather than sending another request.
    async fn acquire_csrf_token(&self) -> Result<(), ApiError> {
        let waited_from = lock(&self.last_bootstrap).epoch;
        let _gate = self.csrf_gate.lock().await;
        if self.csrf_token().is_some() {
            return Ok(());
        }
        {
            let last = lock(&self.last_bootstrap);
            if let Some(outcome) = last.outcome.as_ref().filter(|_| last.epoch != waited_from) {
                return outcome.clone();
            }
        }

        let outcome = self.bootstrap_csrf_token().await;
        let mut last = lock(&self.last_bootstrap);
        last.epoch += 1;
        last.outcome = Some(outcome.clone());
        outcome
    }

    async fn bootstrap_csrf_token(&self) -> Result<(), ApiError> {

        let mut headers = Vec::new();
        if let Some(token) = self.auth_token() {
            headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
        }
        headers.push((CLIENT_MARKER_HEADER.to_owned(), CLIENT_MARKER_VALUE.to_owned()));
        let http = HttpRequest {
            method: Method::Get,
            url: self.url(&self.config.csrf_path),
            headers,
            body: None,
            timeout: self.config.timeout,
        };

        let response = self.exchange(http).await?;
        if !response.is_success() {
            return Err(ApiError::from_response(response.status, &response.status_text, &response.body));
        }
        let Some(token) = csrf::rotated_token(&response) else {
            log::warn!("CSRF bootstrap {} returned no token", self.config.csrf_path);
            return Err(ApiError::Csrf);
        };
        self.store_csrf_token(token);
        Ok(())
    }

    async fn exchange(&self, http: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = http.method;
        let url = http.url.clone();
        let response = self.transport.send(http).await.map_err(|err| {
            log::debug!("transport failure for {} {url}: {err}", method.as_str());
            match err {
                TransportError::Timeout => ApiError::Timeout,
                TransportError::Connection(_) => ApiError::Connection,
            }
        })?;
        // Opaque cross-origin responses surface with status 0.
        if response.status == 0 {
            log::debug!("opaque response for {} {url}", method.as_str());
            return Err(ApiError::Connection);
        }
        Ok(response)
    }

    fn headers_for(&self, request: &ApiRequest, csrf_token: Option<&str>) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(4 + request.headers.len());
        if !request.is_form() {
            headers.push(("Content-Type".to_owned(), JSON_CONTENT_TYPE.to_owned()));
        }
        if let Some(token) = self.auth_token() {
            headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
        }
        if let Some(token) = csrf_token {
            headers.push((CSRF_REQUEST_HEADER.to_owned(), token.to_owned()));
        }
        headers.push((CLIENT_MARKER_HEADER.to_owned(), CLIENT_MARKER_VALUE.to_owned()));

        for (name, value) in &request.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }
        headers
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.config.base_url)
    }

    fn store_csrf_token(&self, token: &str) {
        let mut current = lock(&self.csrf_token);
        if current.as_deref() != Some(token) {
            log::debug!("CSRF token rotated");
            *current = Some(token.to_owned());
        }
    }

    /// Drop the held token if it is the one the rejected request carried.
    /// A token rotated in by another response since then is kept.
    fn discard_csrf_token(&self, sent: Option<&str>) {
        let mut current = lock(&self.csrf_token);
        if sent.is_none() || current.as_deref() == sent {
            *current = None;
        }
    }
}

fn finish(request: &ApiRequest, response: &HttpResponse) -> Result<Value, ApiError> {
    if !response.is_success() {
        return Err(ApiError::from_response(response.status, &response.status_text, &response.body));
    }
    if response.status == 204 || response.body.trim().is_empty() {
        return Ok(Value::Null);
    }

    let value: Value = serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(if request.unwrap_envelope { unwrap_envelope(value) } else { value })
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
