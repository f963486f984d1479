//! Server configuration parsed from environment variables.
//!
//! Every setting has a default so `server` runs with no environment at all
//! next to a built `dist/` directory.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ServerError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DIST_DIR: &str = "dist";
pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_PROXY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_APP_ENV: &str = "development";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Built front end: `index.html` plus hashed assets.
    pub dist_dir: PathBuf,
    /// Origin allowed to call with credentials. `None` disables CORS.
    pub cors_origin: Option<String>,
    /// Backend that `/api/*` is forwarded to, without a trailing slash.
    pub api_url: String,
    pub proxy_timeout: Duration,
    /// Reported by `/health`.
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            dist_dir: PathBuf::from(DEFAULT_DIST_DIR),
            cors_origin: None,
            api_url: DEFAULT_API_URL.to_owned(),
            proxy_timeout: Duration::from_secs(DEFAULT_PROXY_TIMEOUT_SECS),
            environment: DEFAULT_APP_ENV.to_owned(),
        }
    }
}

impl ServerConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DIST_DIR`: default `dist`
    /// - `CORS_DOMAIN`: allowed cross-origin caller
    /// - `API_URL`: default `http://localhost:8080`
    /// - `PROXY_TIMEOUT_SECS`: default 30
    /// - `APP_ENV`: default `development`
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if `API_URL` is not an http(s) URL.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let api_url = lookup("API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned())
            .trim()
            .trim_end_matches('/')
            .to_owned();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ServerError::Config(format!("API_URL must be an http(s) URL, got {api_url:?}")));
        }

        Ok(Self {
            port: env_parse(&lookup, "PORT", DEFAULT_PORT),
            dist_dir: lookup("DIST_DIR").map_or_else(|| PathBuf::from(DEFAULT_DIST_DIR), PathBuf::from),
            cors_origin: lookup("CORS_DOMAIN").map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()),
            api_url,
            proxy_timeout: Duration::from_secs(env_parse(&lookup, "PROXY_TIMEOUT_SECS", DEFAULT_PROXY_TIMEOUT_SECS)),
            environment: lookup("APP_ENV").unwrap_or_else(|| DEFAULT_APP_ENV.to_owned()),
        })
    }

    /// Scheme, host, and port of the backend, for the CSP `connect-src`.
    #[must_use]
    pub fn api_origin(&self) -> &str {
        let after_scheme = self.api_url.find("://").map_or(0, |i| i + 3);
        match self.api_url[after_scheme..].find('/') {
            Some(i) => &self.api_url[..after_scheme + i],
            None => &self.api_url,
        }
    }
}

fn env_parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparseable setting");
            default
        }),
        None => default,
    }
}
