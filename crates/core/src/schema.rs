// crates/core/src/schema.rs
//! Field registry that every imported or edited row is normalized against.
//!
//! The registry is an ordered list: order is display order in the data-entry
//! grid and column order in exported spreadsheets. A [`Schema`] is a plain
//! value. Code that needs to grow it (the `Extend` unknown-column policy)
//! works on its own copy.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::SchemaError;
use crate::row::ProjectRow;

/// Field ids of the standard project schema.
pub mod field {
    pub const PROJECT_CODE: &str = "projectCode";
    pub const PROJECT_DESCRIPTION: &str = "projectDescription";
    pub const DESTINATION: &str = "destination";
    pub const CONTAINER_COUNT: &str = "containerCount";
    pub const DISPATCH_TIMINGS: &str = "dispatchTimings";
    /// Authoritative input of the derivation engine.
    pub const TOTAL_PARTS: &str = "totalParts";
    /// Authoritative input of the derivation engine.
    pub const TOTAL_PARTS_PRODUCED: &str = "totalPartsProduced";
    /// Derived: `max(0, totalParts - totalPartsProduced)`.
    pub const TOTAL_PARTS_TO_BE_PRODUCED: &str = "totalPartsToBeProduced";
    /// Derived: `round(100 * produced / total)`.
    pub const PERCENT_COMPLETED: &str = "percentCompleted";
    /// Derived only while blank.
    pub const STATUS: &str = "status";
    pub const TARGET_COMPLETION_DATE: &str = "targetCompletionDate";
}

/// Semantic type of a field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
}

/// One schema entry: id, display name and value type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: String,
    pub display_name: String,
    pub value_type: FieldType,
}

impl FieldDescriptor {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, value_type: FieldType) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            value_type,
        }
    }

    /// Descriptor for a column that only exists in an uploaded file.
    pub fn ad_hoc(header: &str) -> Self {
        let name = header.trim();
        Self::new(name, name, FieldType::Text)
    }
}

/// Ordered field registry with unique ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldDescriptor>", into = "Vec<FieldDescriptor>")]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// The project schema used by the data-entry grid and the dashboard.
    pub fn standard() -> Self {
        use FieldType::*;
        let fields = vec![
            FieldDescriptor::new(field::PROJECT_CODE, "Project", Text),
            FieldDescriptor::new(field::PROJECT_DESCRIPTION, "Description", Text),
            FieldDescriptor::new(field::DESTINATION, "Destination", Text),
            FieldDescriptor::new(field::CONTAINER_COUNT, "No. of Containers", Number),
            FieldDescriptor::new(field::DISPATCH_TIMINGS, "Dispatch Timings", Text),
            FieldDescriptor::new(field::TOTAL_PARTS, "Total Parts", Number),
            FieldDescriptor::new(field::TOTAL_PARTS_PRODUCED, "Produced", Number),
            FieldDescriptor::new(field::TOTAL_PARTS_TO_BE_PRODUCED, "Parts Remaining", Number),
            FieldDescriptor::new(field::PERCENT_COMPLETED, "Progress", Number),
            FieldDescriptor::new(field::STATUS, "Status", Text),
            FieldDescriptor::new(field::TARGET_COMPLETION_DATE, "Target Date", Date),
        ];
        Self { fields }
    }

    /// Build a schema from an explicit field list, rejecting duplicate ids.
    pub fn from_fields(fields: Vec<FieldDescriptor>) -> Result<Self, SchemaError> {
        let mut schema = Self { fields: Vec::with_capacity(fields.len()) };
        for f in fields {
            schema.push(f)?;
        }
        Ok(schema)
    }

    /// Append a field at the end of the display order.
    pub fn push(&mut self, descriptor: FieldDescriptor) -> Result<(), SchemaError> {
        if descriptor.id.is_empty() {
            return Err(SchemaError::EmptyFieldId);
        }
        if self.contains(&descriptor.id) {
            return Err(SchemaError::DuplicateField(descriptor.id));
        }
        self.fields.push(descriptor);
        Ok(())
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn get(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn display_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.display_name.as_str())
    }

    /// A copy of this schema with an ad hoc text field appended for every
    /// key that appears in `rows` but has no descriptor yet.
    pub fn with_row_fields<'a>(&self, rows: impl IntoIterator<Item = &'a ProjectRow>) -> Self {
        let mut schema = self.clone();
        for row in rows {
            for (key, _) in row.iter() {
                if key.trim().is_empty() || schema.contains(key) {
                    continue;
                }
                // ad hoc ids are trimmed; a collision after trimming is skipped
                schema.push(FieldDescriptor::ad_hoc(key)).ok();
            }
        }
        schema
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<FieldDescriptor>> for Schema {
    type Error = SchemaError;

    fn try_from(fields: Vec<FieldDescriptor>) -> Result<Self, Self::Error> {
        Self::from_fields(fields)
    }
}

impl From<Schema> for Vec<FieldDescriptor> {
    fn from(schema: Schema) -> Self {
        schema.fields
    }
}
