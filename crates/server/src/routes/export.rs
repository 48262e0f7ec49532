//! Export endpoint for the stored collection (xlsx and CSV).

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use proslide_core::table::EXPORT_FILE_STEM;
use proslide_core::{write_csv, write_workbook, ProjectRow, Schema, TableError};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::metrics::RequestTimer;
use crate::state::AppState;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Spreadsheet flavour of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            other => Err(format!(
                "Unknown export format '{other}'. Valid options: xlsx, csv"
            )),
        }
    }
}

impl ExportFormat {
    /// `.csv` files get CSV, anything else a workbook.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Xlsx,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Xlsx => XLSX_CONTENT_TYPE,
            Self::Csv => "text/csv; charset=utf-8",
        }
    }

    /// Render `rows` with the standard columns first, then every extra key
    /// the rows carry. No rows means a header-only file.
    pub fn render(self, schema: &Schema, rows: &[ProjectRow]) -> Result<Vec<u8>, TableError> {
        let schema = schema.with_row_fields(rows);
        match self {
            Self::Xlsx => write_workbook(&schema, rows),
            Self::Csv => write_csv(&schema, rows),
        }
    }
}

/// Export format query parameter.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ExportQuery {
    /// "xlsx" (default) or "csv"
    pub format: Option<String>,
}

/// GET /api/export - stored rows as a spreadsheet attachment.
pub async fn export_projects(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let timer = RequestTimer::new("export");
    let format = match query.format.as_deref().map(ExportFormat::from_str) {
        None => ExportFormat::default(),
        Some(Ok(format)) => format,
        Some(Err(message)) => {
            timer.finish_err(400);
            return Err(ApiError::BadRequest(message));
        }
    };

    let rows = state.store.load_all().await?;
    let bytes = format
        .render(&state.schema, &rows)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!(rows = rows.len(), format = format.extension(), "Exported projects");
    timer.finish_ok();

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{EXPORT_FILE_STEM}.{}\"",
                    format.extension()
                ),
            ),
        ],
        bytes,
    )
        .into_response())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/export", get(export_projects))
}
