// crates/server/src/routes/mod.rs
//! API route handlers for the ProSlide server.
//!
//! Endpoints:
//! - GET  /api/health    - server status
//! - GET  /api/projects  - every stored row
//! - POST /api/projects  - replace the stored collection
//! - GET  /api/dashboard - aggregated dashboard snapshot
//! - POST /api/import    - normalize an uploaded spreadsheet
//! - GET  /api/export    - stored rows as xlsx / csv
//! - GET  /metrics       - Prometheus metrics (no /api prefix)

pub mod dashboard;
pub mod export;
pub mod health;
pub mod import;
pub mod metrics;
pub mod projects;

use std::sync::Arc;

use axum::{http::Uri, Router};

use crate::error::ApiError;
use crate::state::AppState;

/// Create the API router with all routes; unknown `/api/*` paths get a JSON 404.
pub fn api_routes(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(health::router())
        .merge(projects::router())
        .merge(dashboard::router())
        .merge(import::router())
        .merge(export::router())
        .fallback(api_not_found);

    Router::new()
        .nest("/api", api)
        .merge(metrics::router())
        .with_state(state)
}

async fn api_not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
