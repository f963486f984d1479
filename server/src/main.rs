mod config;
mod error;
mod routes;
mod security;
mod state;
#[cfg(test)]
mod test_support;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::ServerConfig::from_env().expect("invalid configuration");
    let port = config.port;
    tracing::info!(
        dist = %config.dist_dir.display(),
        api = %config.api_url,
        cors = config.cors_origin.as_deref().unwrap_or("disabled"),
        "configuration loaded"
    );
    if !config.dist_dir.join("index.html").is_file() {
        tracing::warn!(dist = %config.dist_dir.display(), "index.html not found; page requests will 404");
    }

    let state = state::AppState::new(config).expect("proxy client init failed");
    let app = routes::app(state).expect("router init failed");
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "survey web server listening");
    axum::serve(listener, app).await.expect("server failed");
}
