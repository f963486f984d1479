//! Security headers applied to every response.
//!
//! The Content-Security-Policy allows same-origin scripts only, inline styles
//! plus Google Fonts, and API calls to this origin and the configured backend.

#[cfg(test)]
#[path = "security_test.rs"]
mod security_test;

use axum::Router;
use axum::http::header::{
    CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use axum::http::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::ServerConfig;
use crate::error::ServerError;

const CROSS_ORIGIN_RESOURCE_POLICY: HeaderName = HeaderName::from_static("cross-origin-resource-policy");

/// The policy string for `config`.
#[must_use]
pub fn content_security_policy(config: &ServerConfig) -> String {
    let connect_src = match config.api_origin() {
        "" => "'self'".to_owned(),
        origin => format!("'self' {origin}"),
    };
    [
        "default-src 'self'".to_owned(),
        "base-uri 'self'".to_owned(),
        "script-src 'self'".to_owned(),
        "script-src-attr 'none'".to_owned(),
        "style-src 'self' 'unsafe-inline' https://fonts.googleapis.com".to_owned(),
        "img-src 'self' data: blob: https:".to_owned(),
        format!("connect-src {connect_src}"),
        "font-src 'self' data: https://fonts.gstatic.com".to_owned(),
        "media-src 'self'".to_owned(),
        "object-src 'none'".to_owned(),
        "frame-src 'none'".to_owned(),
        "frame-ancestors 'none'".to_owned(),
        "form-action 'self'".to_owned(),
        "worker-src 'self' blob:".to_owned(),
        "manifest-src 'self'".to_owned(),
        "report-uri /csp-report".to_owned(),
    ]
    .join("; ")
}

/// Wrap `router` with the security header layers.
///
/// # Errors
///
/// Returns [`ServerError::Config`] if the configured API URL cannot appear in
/// a header.
pub fn apply(router: Router, config: &ServerConfig) -> Result<Router, ServerError> {
    let csp = HeaderValue::from_str(&content_security_policy(config))
        .map_err(|e| ServerError::Config(format!("content security policy: {e}")))?;

    Ok(router
        .layer(SetResponseHeaderLayer::overriding(CONTENT_SECURITY_POLICY, csp))
        .layer(SetResponseHeaderLayer::overriding(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")))
        .layer(SetResponseHeaderLayer::overriding(X_FRAME_OPTIONS, HeaderValue::from_static("DENY")))
        .layer(SetResponseHeaderLayer::overriding(X_XSS_PROTECTION, HeaderValue::from_static("0")))
        .layer(SetResponseHeaderLayer::overriding(
            REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            CROSS_ORIGIN_RESOURCE_POLICY,
            HeaderValue::from_static("cross-origin"),
        )))
}
