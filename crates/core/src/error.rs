// crates/core/src/error.rs
use thiserror::Error;

/// Errors raised while building or extending a field schema
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate field id in schema: {0}")]
    DuplicateField(String),

    #[error("Field id must not be empty")]
    EmptyFieldId,
}

/// Errors that can occur when reading or writing a tabular file
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unreadable workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook has no sheets")]
    NoSheet,

    #[error("Failed to write workbook: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
}

/// Errors that can occur when importing an uploaded table into the working set
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("No rows found in the uploaded file")]
    EmptyTable,

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Errors raised by working-set mutations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkingSetError {
    #[error("Row {index} is out of range (working set has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field is computed and cannot be edited: {0}")]
    ReadOnlyField(String),
}

/// Errors crossing the load-all / replace-all persistence boundary
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Project store unreachable: {message}")]
    Unreachable { message: String },

    #[error("Project store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid project payload: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}
