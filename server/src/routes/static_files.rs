//! Built front end: hashed assets plus the `index.html` fallback that lets
//! the client-side router own every other path.
//!
//! HTML is never cached so a deploy is picked up on the next load; every
//! other file is content-hashed by the build and cached for a year.

use std::path::Path;

use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, EXPIRES, PRAGMA};
use axum::response::Response;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;

pub const HTML_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";
pub const ASSET_CACHE_CONTROL: &str = "public, max-age=31536000";

pub fn router(dist_dir: &Path) -> Router {
    let files = ServeDir::new(dist_dir).fallback(ServeFile::new(dist_dir.join("index.html")));
    Router::new()
        .fallback_service(files)
        .layer(SetResponseHeaderLayer::overriding(CACHE_CONTROL, cache_control))
        .layer(SetResponseHeaderLayer::overriding(PRAGMA, html_only("no-cache")))
        .layer(SetResponseHeaderLayer::overriding(EXPIRES, html_only("0")))
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/html"))
}

fn cache_control(response: &Response) -> Option<HeaderValue> {
    if is_html(response) {
        Some(HeaderValue::from_static(HTML_CACHE_CONTROL))
    } else if response.status().is_success() {
        Some(HeaderValue::from_static(ASSET_CACHE_CONTROL))
    } else {
        None
    }
}

fn html_only(value: &'static str) -> impl Fn(&Response) -> Option<HeaderValue> + Clone {
    move |response| is_html(response).then(|| HeaderValue::from_static(value))
}
