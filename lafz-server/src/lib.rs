//! lafz-server library - recitation alignment service
//!
//! Accepts recited audio plus verse ranges and returns word-level timings:
//! - `POST /` multipart upload (`file`, `segments`)
//! - `GET /health` status and corpus statistics

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod services;

use services::AlignmentPipeline;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AlignmentPipeline>,
}

impl AppState {
    pub fn new(pipeline: AlignmentPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build application router
///
/// `max_upload_bytes` caps the request body; larger uploads get 413.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .merge(api::align_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
