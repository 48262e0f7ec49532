// crates/core/src/import.rs
//! Import pipeline: header normalizer, cell coercer and derivation engine
//! applied to every data row of an uploaded table.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::coerce::coerce_cell;
use crate::derive::derive_row;
use crate::error::ImportError;
use crate::header::{resolve_headers, ColumnMapping, MatchRule, UnknownColumnPolicy};
use crate::row::ProjectRow;
use crate::schema::{FieldDescriptor, Schema};
use crate::table::RawTable;

/// Summary handed back to whoever triggered the import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub rows_imported: usize,
    /// Uploaded columns that feed a field, in schema order.
    pub columns: Vec<ColumnMapping>,
    /// Headers dropped under `UnknownColumnPolicy::Skip`.
    pub skipped_headers: Vec<String>,
    /// Fields appended under `UnknownColumnPolicy::Extend`.
    pub added_fields: Vec<FieldDescriptor>,
}

/// Clean rows plus the schema they were normalized against.
#[derive(Debug, Clone)]
pub struct NormalizedImport {
    pub rows: Vec<ProjectRow>,
    /// `schema` as passed in, or an extended copy under `Extend`.
    pub schema: Schema,
    pub report: ImportReport,
}

/// Normalize every data row of `table` against `schema`.
///
/// `schema` itself is never modified; under [`UnknownColumnPolicy::Extend`]
/// the returned [`NormalizedImport::schema`] is a copy with the extra fields.
pub fn normalize_table(
    table: &RawTable,
    schema: &Schema,
    unknown_columns: UnknownColumnPolicy,
) -> Result<NormalizedImport, ImportError> {
    if table.is_empty() {
        return Err(ImportError::EmptyTable);
    }

    let mut mapping = resolve_headers(&table.headers, schema);
    let mut schema = schema.clone();
    let mut report = ImportReport::default();

    for &column in &mapping.unmapped {
        let header = &table.headers[column];
        match unknown_columns {
            UnknownColumnPolicy::Skip => report.skipped_headers.push(header.clone()),
            UnknownColumnPolicy::Extend => {
                let descriptor = FieldDescriptor::ad_hoc(header);
                match schema.push(descriptor.clone()) {
                    Ok(()) => {
                        mapping.columns.push(ColumnMapping {
                            column,
                            header: header.clone(),
                            field_id: descriptor.id.clone(),
                            rule: MatchRule::AdHoc,
                        });
                        report.added_fields.push(descriptor);
                    }
                    Err(e) => {
                        tracing::debug!(header = %header, error = %e, "Skipping column that cannot become a field");
                        report.skipped_headers.push(header.clone());
                    }
                }
            }
        }
    }

    let rows: Vec<ProjectRow> = (0..table.rows.len())
        .map(|r| {
            let mut row: ProjectRow = schema
                .fields()
                .iter()
                .map(|f| {
                    let value = match mapping.column_for(&f.id) {
                        Some(c) => coerce_cell(table.cell(r, c), f.value_type),
                        None => "".into(),
                    };
                    (f.id.clone(), value)
                })
                .collect();
            derive_row(&mut row);
            row
        })
        .collect();

    report.rows_imported = rows.len();
    report.columns = mapping.columns;

    tracing::debug!(
        rows = report.rows_imported,
        mapped = report.columns.len(),
        skipped = report.skipped_headers.len(),
        added = report.added_fields.len(),
        "Normalized uploaded table"
    );

    Ok(NormalizedImport { rows, schema, report })
}
