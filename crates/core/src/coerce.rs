// crates/core/src/coerce.rs
//! Cell coercer: turns a raw uploaded cell into the stored representation
//! for the target field type. Never fails; unparsable input passes through
//! as trimmed text and the derivation engine applies its own zero fallback.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::row::{format_number, number_value};
use crate::schema::FieldType;

/// A cell as read from an uploaded sheet, before any schema is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Stringified, trimmed form of the cell.
    pub fn to_text(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(s) => s.trim().to_string(),
            RawCell::Number(n) => format_number(*n),
            RawCell::Bool(b) => b.to_string(),
            RawCell::Date(d) => format_iso_date(*d),
            RawCell::DateTime(dt) => format_iso_date(dt.date()),
        }
    }
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        RawCell::Text(s.to_string())
    }
}

impl From<f64> for RawCell {
    fn from(n: f64) -> Self {
        RawCell::Number(n)
    }
}

/// A value typed into the grid or sent by the client, read back as a cell so
/// edits go through the same coercion as uploads.
impl From<&Value> for RawCell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => RawCell::Empty,
            Value::Bool(b) => RawCell::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(RawCell::Empty, RawCell::Number),
            Value::String(s) => RawCell::Text(s.clone()),
            other => RawCell::Text(other.to_string()),
        }
    }
}

/// Coerce `cell` for a field of type `ty`.
pub fn coerce_cell(cell: &RawCell, ty: FieldType) -> Value {
    match ty {
        FieldType::Text => Value::String(cell.to_text()),
        FieldType::Number => coerce_number(cell),
        FieldType::Date => Value::String(coerce_date(cell)),
    }
}

fn coerce_number(cell: &RawCell) -> Value {
    match cell {
        RawCell::Number(n) if n.is_finite() => number_value(*n),
        RawCell::Text(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => number_value(n),
                _ => Value::String(trimmed.to_string()),
            }
        }
        other => Value::String(other.to_text()),
    }
}

fn coerce_date(cell: &RawCell) -> String {
    match cell {
        RawCell::Empty => String::new(),
        RawCell::Date(d) => format_iso_date(*d),
        RawCell::DateTime(dt) => format_iso_date(dt.date()),
        // zero reads as "no date"
        RawCell::Number(n) if *n == 0.0 => String::new(),
        RawCell::Number(n) => excel_serial_to_iso(*n).unwrap_or_else(|| format_number(*n)),
        other => other.to_text(),
    }
}

/// `YYYY-MM-DD` from calendar fields.
pub fn format_iso_date(d: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day())
}

/// Last serial the 1900 date system can express (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

/// Decode a spreadsheet date serial (1900 date system) into `YYYY-MM-DD`.
///
/// Serial 1 is 1900-01-01. The 1900 system counts a 1900-02-29 that never
/// existed as serial 60, so serials after it are shifted by one day.
/// Any time-of-day fraction is dropped. Serials below 1 are not dates.
pub fn excel_serial_to_iso(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 1.0 || serial >= MAX_EXCEL_SERIAL {
        return None;
    }
    let days = serial.floor() as i64;
    if days == 60 {
        return Some("1900-02-29".to_string());
    }
    let epoch = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch
        .checked_add_signed(Duration::days(days))
        .map(format_iso_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_is_trimmed_and_stringified() {
        assert_eq!(coerce_cell(&"  Dubai ".into(), FieldType::Text), json!("Dubai"));
        assert_eq!(coerce_cell(&RawCell::Number(42.0), FieldType::Text), json!("42"));
        assert_eq!(coerce_cell(&RawCell::Empty, FieldType::Text), json!(""));
        assert_eq!(coerce_cell(&RawCell::Bool(true), FieldType::Text), json!("true"));
    }

    #[test]
    fn test_number_cells() {
        assert_eq!(coerce_cell(&RawCell::Number(250.0), FieldType::Number), json!(250));
        assert_eq!(coerce_cell(&RawCell::Number(2.5), FieldType::Number), json!(2.5));
        assert_eq!(coerce_cell(&" 137 ".into(), FieldType::Number), json!(137));
        assert_eq!(coerce_cell(&RawCell::Empty, FieldType::Number), json!(""));
    }

    #[test]
    fn test_unparsable_number_passes_through() {
        assert_eq!(coerce_cell(&" about 40 ".into(), FieldType::Number), json!("about 40"));
        assert_eq!(coerce_cell(&"NaN".into(), FieldType::Number), json!("NaN"));
    }

    #[test]
    fn test_native_dates_use_calendar_fields() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(coerce_cell(&RawCell::Date(d), FieldType::Date), json!("2024-03-05"));
        let dt = d.and_hms_opt(23, 59, 0).unwrap();
        assert_eq!(coerce_cell(&RawCell::DateTime(dt), FieldType::Date), json!("2024-03-05"));
    }

    #[test]
    fn test_serial_dates() {
        assert_eq!(coerce_cell(&RawCell::Number(45000.0), FieldType::Date), json!("2023-03-15"));
        assert_eq!(coerce_cell(&RawCell::Number(45000.75), FieldType::Date), json!("2023-03-15"));
        assert_eq!(excel_serial_to_iso(1.0).as_deref(), Some("1900-01-01"));
        assert_eq!(excel_serial_to_iso(59.0).as_deref(), Some("1900-02-28"));
        assert_eq!(excel_serial_to_iso(60.0).as_deref(), Some("1900-02-29"));
        assert_eq!(excel_serial_to_iso(61.0).as_deref(), Some("1900-03-01"));
        assert_eq!(excel_serial_to_iso(2958465.0).as_deref(), Some("9999-12-31"));
    }

    #[test]
    fn test_non_date_serials() {
        assert_eq!(excel_serial_to_iso(0.5), None);
        assert_eq!(excel_serial_to_iso(-3.0), None);
        assert_eq!(excel_serial_to_iso(f64::NAN), None);
        assert_eq!(coerce_cell(&RawCell::Number(0.0), FieldType::Date), json!(""));
        assert_eq!(coerce_cell(&RawCell::Number(-3.0), FieldType::Date), json!("-3"));
    }

    #[test]
    fn test_free_text_dates_pass_through() {
        assert_eq!(coerce_cell(&" end of May ".into(), FieldType::Date), json!("end of May"));
        assert_eq!(coerce_cell(&"2024-06-01".into(), FieldType::Date), json!("2024-06-01"));
        assert_eq!(coerce_cell(&RawCell::Empty, FieldType::Date), json!(""));
    }
}
