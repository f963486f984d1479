//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the parsed config and one pooled HTTP client for the API proxy.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::error::ServerError;

const PROXY_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Clone is required by Axum; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if the HTTP client cannot be built.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        // Redirects and cookies belong to the browser, not the proxy.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(PROXY_CONNECT_TIMEOUT_SECS))
            .timeout(config.proxy_timeout)
            .build()
            .map_err(|e| ServerError::Config(format!("proxy client: {e}")))?;
        Ok(Self { config: Arc::new(config), http })
    }
}
