//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use lafz_common::index::CorpusStats;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub corpus: CorpusStats,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "lafz-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        corpus: state.pipeline.index().stats(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
