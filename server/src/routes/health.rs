//! Liveness probe.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub environment: String,
    pub csp_enabled: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health { status: "OK", environment: state.config.environment.clone(), csp_enabled: true })
}
