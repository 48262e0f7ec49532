// crates/server/src/routes/projects.rs
//! The project collection: read all, replace all.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use proslide_core::ProjectRow;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ApiResult;
use crate::metrics::{record_save, RequestTimer};
use crate::state::AppState;

/// Reply to `POST /api/projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SaveResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// GET /api/projects - every stored row, in stored order.
pub async fn list_projects(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ProjectRow>>> {
    let timer = RequestTimer::new("projects_list");
    match state.store.load_all().await {
        Ok(rows) => {
            timer.finish_ok();
            Ok(Json(rows))
        }
        Err(e) => {
            timer.finish_err(500);
            Err(e.into())
        }
    }
}

/// POST /api/projects - replace the whole collection with the body.
pub async fn save_projects(
    State(state): State<Arc<AppState>>,
    Json(rows): Json<Vec<ProjectRow>>,
) -> Response {
    let timer = RequestTimer::new("projects_save");
    match state.store.replace_all(&rows).await {
        Ok(()) => {
            record_save(rows.len(), timer.elapsed());
            timer.finish_ok();
            Json(SaveResponse::ok()).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, rows = rows.len(), "Failed to save projects");
            timer.finish_err(500);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SaveResponse::failed(e.to_string())),
            )
                .into_response()
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/projects", get(list_projects).post(save_projects))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_response_wire_shape() {
        assert_eq!(
            serde_json::to_string(&SaveResponse::ok()).unwrap(),
            r#"{"success":true}"#
        );
        let failed = serde_json::to_value(SaveResponse::failed("disk full")).unwrap();
        assert_eq!(failed["success"], false);
        assert_eq!(failed["message"], "disk full");
    }
}
