// crates/server/src/routes/dashboard.rs
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use proslide_core::DashboardSnapshot;

use crate::error::ApiResult;
use crate::metrics::RequestTimer;
use crate::state::AppState;

/// GET /api/dashboard - KPIs, timeline, distribution and detail rows
/// computed over the stored collection.
pub async fn dashboard(State(state): State<Arc<AppState>>) -> ApiResult<Json<DashboardSnapshot>> {
    let timer = RequestTimer::new("dashboard");
    let rows = state.store.load_all().await?;
    let snapshot = DashboardSnapshot::from_rows(&rows);
    timer.finish_ok();
    Ok(Json(snapshot))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(dashboard))
}
