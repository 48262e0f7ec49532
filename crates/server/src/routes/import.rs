// crates/server/src/routes/import.rs
//! Spreadsheet upload: runs the import pipeline and hands the normalized rows
//! back. Nothing is persisted; the client saves explicitly.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use proslide_core::{
    read_table, ImportOptions, ImportPolicy, ImportReport, ProjectRow, TableFormat,
    UnknownColumnPolicy, WorkingSet,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ApiError, ApiResult};
use crate::metrics::{record_import, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImportQuery {
    /// Original file name; its extension picks the reader. Sniffed when absent.
    pub filename: Option<String>,
    pub policy: ImportPolicy,
    pub unknown: UnknownColumnPolicy,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
pub struct ImportResponse {
    #[ts(type = "Array<Record<string, unknown>>")]
    pub rows: Vec<ProjectRow>,
    pub report: ImportReport,
}

/// POST /api/import - raw file body.
///
/// `policy=replace` normalizes against an empty working set; `policy=merge`
/// starts from the stored rows.
pub async fn import_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImportQuery>,
    body: Bytes,
) -> ApiResult<Json<ImportResponse>> {
    let timer = RequestTimer::new("import");
    if body.is_empty() {
        timer.finish_err(400);
        return Err(ApiError::BadRequest("Request body is empty".into()));
    }

    let format = match query.filename.as_deref() {
        Some(name) => TableFormat::from_filename(name).map_err(proslide_core::ImportError::from)?,
        None => TableFormat::sniff(&body),
    };
    let table = read_table(&body, format).map_err(proslide_core::ImportError::from)?;

    let mut working_set = WorkingSet::with_schema(state.schema.clone());
    if query.policy == ImportPolicy::Merge {
        working_set.sync(state.store.as_ref()).await?;
    }

    let options = ImportOptions {
        policy: query.policy,
        unknown_columns: query.unknown,
    };
    let report = working_set.import_table(&table, options)?;
    record_import(report.rows_imported);
    timer.finish_ok();

    tracing::info!(
        filename = query.filename.as_deref().unwrap_or("<unnamed>"),
        rows = report.rows_imported,
        skipped = report.skipped_headers.len(),
        "Processed upload"
    );

    Ok(Json(ImportResponse {
        rows: working_set.rows().to_vec(),
        report,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/import", post(import_file))
}
