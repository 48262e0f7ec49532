// crates/server/src/lib.rs
//! ProSlide server library.
//!
//! Axum HTTP server for the production tracker: the project collection
//! REST API, spreadsheet import/export, dashboard aggregation and the
//! built React client.

pub mod config;
pub mod error;
pub mod metrics;
pub mod remote;
pub mod routes;
pub mod state;

pub use error::*;
pub use metrics::{init_metrics, record_import, record_save, render_metrics, RequestTimer};
pub use remote::{spawn_poller, PollerHandle, RemoteProjects};
pub use routes::api_routes;
pub use state::AppState;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Uploads and saves are whole spreadsheets; allow up to 500 MB.
pub const BODY_LIMIT_BYTES: usize = 500 * 1024 * 1024;

/// Plain-text answer for non-API paths when no client build is present.
pub const NO_CLIENT_BUILD_MESSAGE: &str = "API Running. React Build pending.";

/// Create the Axum application in API-only mode.
pub fn create_app(state: Arc<AppState>) -> Router {
    create_app_with_static(state, None)
}

/// Create the Axum application, serving the client build from `static_dir`
/// with `index.html` as the fallback for client-side routes.
///
/// This sets up:
/// - API routes under `/api` plus `/metrics`
/// - static files (or the "build pending" text)
/// - 500 MB body limit
/// - CORS for any origin
/// - gzip and request tracing
pub fn create_app_with_static(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api_routes(state);
    let app = match static_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Serving client build");
            let index = dir.join("index.html");
            app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        None => app.fallback(|| async { NO_CLIENT_BUILD_MESSAGE }),
    };

    app.layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
