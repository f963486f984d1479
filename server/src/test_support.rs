//! Fixtures shared by router tests.

use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::to_bytes;
use axum::response::Response;

use crate::config::ServerConfig;
use crate::routes::app;
use crate::state::AppState;

pub const INDEX_HTML: &str = "<!doctype html><title>survey</title><div id=app></div>";

/// A throwaway `dist/` directory, removed on drop.
pub struct Dist(PathBuf);

impl Dist {
    pub fn new(tag: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("survey-dist-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("assets")).unwrap();
        std::fs::write(dir.join("index.html"), INDEX_HTML).unwrap();
        std::fs::write(dir.join("assets/app-3f2a.js"), "console.log('app');").unwrap();
        Self(dir)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for Dist {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

pub fn test_app(dist: &Dist, configure: impl FnOnce(&mut ServerConfig)) -> Router {
    let mut config = ServerConfig { dist_dir: dist.path().to_path_buf(), ..ServerConfig::default() };
    configure(&mut config);
    app(AppState::new(config).unwrap()).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
