// crates/core/src/lib.rs
pub mod coerce;
pub mod dashboard;
pub mod derive;
pub mod error;
pub mod gateway;
pub mod header;
pub mod import;
pub mod paths;
pub mod row;
pub mod schema;
pub mod status;
pub mod table;
pub mod working_set;

pub use coerce::{coerce_cell, excel_serial_to_iso, RawCell};
pub use dashboard::{DashboardSnapshot, Kpis};
pub use derive::derive_row;
pub use error::*;
pub use gateway::{MemoryGateway, ProjectGateway};
pub use header::{resolve_headers, HeaderMapping, UnknownColumnPolicy};
pub use import::{normalize_table, ImportReport, NormalizedImport};
pub use row::ProjectRow;
pub use schema::{field, FieldDescriptor, FieldType, Schema};
pub use status::ProjectStatus;
pub use table::{read_table, write_csv, write_workbook, RawTable, TableFormat};
pub use working_set::{ImportOptions, ImportPolicy, WorkingSet};
