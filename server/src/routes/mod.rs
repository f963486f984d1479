//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One origin serves the built single-page app, a health probe, the CSP
//! report sink, and `/api/*` forwarded to the backend, so the browser never
//! makes a cross-origin API call in production.
//!
//! Layer order, outermost first: security headers, CORS, panic catcher,
//! tracing, compression.

pub mod health;
pub mod proxy;
pub mod reports;
pub mod static_files;


use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::routing::{any, get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{ServerError, internal_error_response};
use crate::security;
use crate::state::AppState;

const CSRF_HEADER: HeaderName = HeaderName::from_static("x-csrf-token");

/// Build the application router.
///
/// # Errors
///
/// Returns [`ServerError::Config`] if the CORS origin or the security headers
/// cannot be built from the configuration.
pub fn app(state: AppState) -> Result<Router, ServerError> {
    let config = state.config.clone();

    let router = Router::new()
        .route("/health", get(health::health))
        .route("/csp-report", post(reports::csp_report))
        .route("/api", any(proxy::forward))
        .route("/api/{*rest}", any(proxy::forward))
        .route("/.well-known/{*rest}", any(not_found))
        .fallback_service(static_files::router(&config.dist_dir))
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(|_| internal_error_response()));

    let router = match &config.cors_origin {
        Some(origin) => router.layer(cors(origin)?),
        None => router,
    };
    security::apply(router, &config)
}

fn cors(origin: &str) -> Result<CorsLayer, ServerError> {
    let origin = HeaderValue::from_str(origin).map_err(|e| ServerError::Config(format!("CORS_DOMAIN: {e}")))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS, Method::PATCH])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
            CSRF_HEADER,
        ])
        .expose_headers([header::AUTHORIZATION, CSRF_HEADER]))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
