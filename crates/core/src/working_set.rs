// crates/core/src/working_set.rs
//! The in-memory row sequence the data-entry grid edits.
//!
//! A [`WorkingSet`] owns its rows and its own copy of the schema; callers
//! hold it by value or behind whatever lock their UI loop needs. Rows have
//! no identity beyond position: row number is always `index + 1`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::coerce::{coerce_cell, RawCell};
use crate::dashboard::{summarize, Kpis};
use crate::derive::{is_derivation_input, rederive_row};
use crate::error::{GatewayError, ImportError, TableError, WorkingSetError};
use crate::gateway::ProjectGateway;
use crate::header::UnknownColumnPolicy;
use crate::import::{normalize_table, ImportReport};
use crate::row::ProjectRow;
use crate::schema::{field, Schema};
use crate::table::{write_csv, write_workbook, RawTable};

/// How imported rows combine with rows already in the working set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
#[serde(rename_all = "lowercase")]
pub enum ImportPolicy {
    /// Imported rows replace the whole working set.
    #[default]
    Replace,
    /// Blank rows are dropped, imported rows appended after the rest.
    Merge,
}

impl std::str::FromStr for ImportPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            other => Err(format!("Invalid import policy '{other}'. Valid options: replace, merge")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    #[serde(default)]
    pub policy: ImportPolicy,
    #[serde(default)]
    pub unknown_columns: UnknownColumnPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkingSet {
    schema: Schema,
    rows: Vec<ProjectRow>,
}

impl Default for WorkingSet {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkingSet {
    /// Standard schema, one empty placeholder row.
    pub fn new() -> Self {
        Self::with_schema(Schema::standard())
    }

    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema,
            rows: vec![ProjectRow::new()],
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[ProjectRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&ProjectRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replace every row. An empty input leaves one editable placeholder.
    pub fn load(&mut self, rows: Vec<ProjectRow>) {
        self.rows = if rows.is_empty() {
            vec![ProjectRow::new()]
        } else {
            rows
        };
    }

    /// Append a blank row; returns its index.
    pub fn append(&mut self) -> usize {
        self.rows.push(ProjectRow::blank(&self.schema));
        self.rows.len() - 1
    }

    /// Set one cell, coerced for the field's type the way an uploaded cell
    /// would be. Edits to the totals re-run the derivation engine for that
    /// row.
    pub fn edit_cell(
        &mut self,
        index: usize,
        field_id: &str,
        value: impl Into<Value>,
    ) -> Result<(), WorkingSetError> {
        if field_id == field::PERCENT_COMPLETED {
            return Err(WorkingSetError::ReadOnlyField(field_id.to_string()));
        }
        let value_type = match self.schema.get(field_id) {
            Some(descriptor) => descriptor.value_type,
            None => return Err(WorkingSetError::UnknownField(field_id.to_string())),
        };
        let value = coerce_cell(&RawCell::from(&value.into()), value_type);
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(WorkingSetError::RowOutOfRange { index, len })?;

        row.set(field_id, value);
        if is_derivation_input(field_id) {
            rederive_row(row);
        }
        Ok(())
    }

    /// Remove a row; every later row moves up one position.
    pub fn delete_row(&mut self, index: usize) -> Result<ProjectRow, WorkingSetError> {
        if index >= self.rows.len() {
            return Err(WorkingSetError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }

    /// "Clear All": back to a single placeholder row.
    pub fn clear(&mut self) {
        self.rows = vec![ProjectRow::new()];
    }

    /// Rows that would be persisted: blank ones filtered out.
    pub fn clean_rows(&self) -> Vec<ProjectRow> {
        self.rows.iter().filter(|r| !r.is_blank()).cloned().collect()
    }

    /// Counts over the rows currently on screen.
    pub fn kpis(&self) -> Kpis {
        summarize(&self.rows)
    }

    /// Persist the non-blank rows as a full replace and return counts over
    /// exactly what was saved. The working set itself is left as is.
    pub async fn save<G>(&self, gateway: &G) -> Result<Kpis, GatewayError>
    where
        G: ProjectGateway + ?Sized,
    {
        let clean = self.clean_rows();
        gateway.replace_all(&clean).await?;
        tracing::info!(
            rows = clean.len(),
            dropped_blank = self.rows.len() - clean.len(),
            "Saved working set"
        );
        Ok(summarize(&clean))
    }

    /// Reload from the gateway. On failure the working set is untouched.
    pub async fn sync<G>(&mut self, gateway: &G) -> Result<usize, GatewayError>
    where
        G: ProjectGateway + ?Sized,
    {
        let rows = gateway.load_all().await?;
        let loaded = rows.len();
        self.load(rows);
        tracing::debug!(rows = loaded, "Synced working set");
        Ok(loaded)
    }

    /// Run the import pipeline over `table` and fold the result in.
    ///
    /// An empty table is an error and leaves the working set untouched.
    /// Under `UnknownColumnPolicy::Extend` the working set's schema grows by
    /// the added fields (listed in the report).
    pub fn import_table(
        &mut self,
        table: &RawTable,
        options: ImportOptions,
    ) -> Result<ImportReport, ImportError> {
        let normalized = normalize_table(table, &self.schema, options.unknown_columns)?;
        self.schema = normalized.schema;

        match options.policy {
            ImportPolicy::Replace => self.rows = normalized.rows,
            ImportPolicy::Merge => {
                self.rows.retain(|r| !r.is_blank());
                self.rows.extend(normalized.rows);
            }
        }

        tracing::info!(
            rows = normalized.report.rows_imported,
            policy = ?options.policy,
            total = self.rows.len(),
            "Imported rows into working set"
        );
        Ok(normalized.report)
    }

    pub fn export_workbook(&self) -> Result<Vec<u8>, TableError> {
        write_workbook(&self.schema, &self.rows)
    }

    pub fn export_csv(&self) -> Result<Vec<u8>, TableError> {
        write_csv(&self.schema, &self.rows)
    }
}
