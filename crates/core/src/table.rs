// crates/core/src/table.rs
//! Tabular file I/O: reading uploaded spreadsheets into a [`RawTable`] and
//! writing the working set back out as `.xlsx` or `.csv`.
//!
//! Only the first sheet of a workbook is read. The first row is the header
//! row; fully empty data rows are skipped.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::Workbook;
use serde_json::Value;

use crate::coerce::RawCell;
use crate::error::TableError;
use crate::row::{value_to_text, ProjectRow};
use crate::schema::Schema;

/// Sheet name used for exported workbooks.
pub const EXPORT_SHEET_NAME: &str = "Projects";

/// Base name of exported files.
pub const EXPORT_FILE_STEM: &str = "ProSlide_Data";

/// Header row plus data rows, cells still untyped by any schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self { headers, rows }
    }

    /// Cell at (row, column); short rows read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &RawCell {
        const EMPTY: &RawCell = &RawCell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(EMPTY)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    /// xlsx / xlsm / xlsb / xls / ods, anything calamine opens.
    Workbook,
}

impl TableFormat {
    /// Pick a format from a file name's extension.
    pub fn from_filename(name: &str) -> Result<Self, TableError> {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            _ => Err(TableError::UnsupportedFormat(name.to_string())),
        }
    }

    /// Guess from content: zip (xlsx/ods) and OLE (xls) containers are
    /// workbooks, anything else is treated as CSV.
    pub fn sniff(bytes: &[u8]) -> Self {
        const ZIP: &[u8] = b"PK\x03\x04";
        const OLE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
        if bytes.starts_with(ZIP) || bytes.starts_with(OLE) {
            Self::Workbook
        } else {
            Self::Csv
        }
    }
}

pub fn read_table(bytes: &[u8], format: TableFormat) -> Result<RawTable, TableError> {
    match format {
        TableFormat::Csv => read_csv(bytes),
        TableFormat::Workbook => read_workbook(bytes),
    }
}

fn read_csv(bytes: &[u8]) -> Result<RawTable, TableError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cells: Vec<RawCell> = record
            .iter()
            .map(|v| {
                if v.is_empty() {
                    RawCell::Empty
                } else {
                    RawCell::Text(v.to_string())
                }
            })
            .collect();
        if !cells.iter().all(RawCell::is_empty) {
            rows.push(cells);
        }
    }
    Ok(RawTable { headers, rows })
}

fn read_workbook(bytes: &[u8]) -> Result<RawTable, TableError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook.worksheet_range_at(0).ok_or(TableError::NoSheet)??;

    let mut sheet_rows = range.rows();
    let headers = match sheet_rows.next() {
        Some(header_row) => header_row.iter().map(|c| raw_cell(c).to_text()).collect(),
        None => return Ok(RawTable::default()),
    };

    let rows = sheet_rows
        .map(|r| r.iter().map(raw_cell).collect::<Vec<_>>())
        .filter(|cells| !cells.iter().all(RawCell::is_empty))
        .collect();
    Ok(RawTable { headers, rows })
}

fn raw_cell(data: &Data) -> RawCell {
    match data {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if dt.is_datetime() => RawCell::DateTime(ndt),
            _ => RawCell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_cell(s),
        Data::DurationIso(s) => RawCell::Text(s.clone()),
    }
}

fn parse_iso_cell(s: &str) -> RawCell {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        RawCell::DateTime(dt)
    } else if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        RawCell::Date(d)
    } else {
        RawCell::Text(s.to_string())
    }
}

/// Write `rows` as a single-sheet workbook with the schema's display names
/// as headers.
pub fn write_workbook(schema: &Schema, rows: &[ProjectRow]) -> Result<Vec<u8>, TableError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(EXPORT_SHEET_NAME)?;

    for (col, f) in schema.fields().iter().enumerate() {
        sheet.write_string(0, col as u16, f.display_name.as_str())?;
    }

    for (r, row) in rows.iter().enumerate() {
        let sheet_row = r as u32 + 1;
        for (col, f) in schema.fields().iter().enumerate() {
            let col = col as u16;
            match row.get(&f.id) {
                Some(Value::Number(n)) => {
                    if let Some(n) = n.as_f64() {
                        sheet.write_number(sheet_row, col, n)?;
                    }
                }
                Some(v) => {
                    let text = value_to_text(v);
                    if !text.is_empty() {
                        sheet.write_string(sheet_row, col, text.as_str())?;
                    }
                }
                None => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Write `rows` as RFC 4180 CSV with the schema's display names as headers.
pub fn write_csv(schema: &Schema, rows: &[ProjectRow]) -> Result<Vec<u8>, TableError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(schema.display_names())?;
    for row in rows {
        writer.write_record(schema.fields().iter().map(|f| row.text(&f.id)))?;
    }

    writer
        .into_inner()
        .map_err(|e| TableError::Csv(e.into_error().into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_from_filename() {
        assert_eq!(TableFormat::from_filename("plan.CSV").unwrap(), TableFormat::Csv);
        assert_eq!(TableFormat::from_filename("a.b.xlsx").unwrap(), TableFormat::Workbook);
        assert_eq!(TableFormat::from_filename("old.xls").unwrap(), TableFormat::Workbook);
        assert!(matches!(
            TableFormat::from_filename("notes.pdf"),
            Err(TableError::UnsupportedFormat(_))
        ));
        assert!(TableFormat::from_filename("README").is_err());
    }

    #[test]
    fn test_sniff() {
        assert_eq!(TableFormat::sniff(b"PK\x03\x04rest"), TableFormat::Workbook);
        assert_eq!(TableFormat::sniff(b"Project,Produced\n"), TableFormat::Csv);
    }

    #[test]
    fn test_read_csv() {
        let data = "\u{feff}Project,Total Parts,Produced\nP-1,250,137\n,,\n\"P,2\",10\n";
        let table = read_table(data.as_bytes(), TableFormat::Csv).unwrap();
        assert_eq!(table.headers, vec!["Project", "Total Parts", "Produced"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 1), &RawCell::Text("250".into()));
        assert_eq!(table.cell(1, 0), &RawCell::Text("P,2".into()));
        // short row pads with empties
        assert_eq!(table.cell(1, 2), &RawCell::Empty);
        assert_eq!(table.cell(9, 0), &RawCell::Empty);
    }

    #[test]
    fn test_read_csv_header_only() {
        let table = read_table(b"Project,Status\n", TableFormat::Csv).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers.len(), 2);
    }

    #[test]
    fn test_read_garbage_workbook_fails() {
        let err = read_table(b"PK\x03\x04not really a zip", TableFormat::Workbook).unwrap_err();
        assert!(matches!(err, TableError::Workbook(_)));
    }

    #[test]
    fn test_write_csv_escapes() {
        let schema = Schema::from_fields(vec![
            crate::schema::FieldDescriptor::new("a", "Name, full", crate::schema::FieldType::Text),
            crate::schema::FieldDescriptor::new("b", "Qty", crate::schema::FieldType::Number),
        ])
        .unwrap();
        let rows = vec![ProjectRow::from_pairs([("a", json!("say \"hi\"")), ("b", json!(3))])];
        let csv = write_csv(&schema, &rows).unwrap();
        assert_eq!(csv, b"\"Name, full\",Qty\n\"say \"\"hi\"\"\",3\n");
    }

    #[test]
    fn test_write_csv_multiline_cell_reads_back() {
        let schema = Schema::standard();
        let rows = vec![ProjectRow::from_pairs([
            ("projectCode", json!("P-9")),
            ("projectDescription", json!("line one\nline \"two\", more")),
        ])];
        let csv = write_csv(&schema, &rows).unwrap();
        let table = read_table(&csv, TableFormat::Csv).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(
            table.cell(0, 1),
            &RawCell::Text("line one\nline \"two\", more".into())
        );
    }

    #[test]
    fn test_workbook_roundtrip_keeps_headers_and_cell_types() {
        let schema = Schema::standard();
        let rows = vec![ProjectRow::from_pairs([
            ("projectCode", json!("P-7")),
            ("totalParts", json!(250)),
            ("targetCompletionDate", json!("2024-05-01")),
        ])];
        let bytes = write_workbook(&schema, &rows).unwrap();
        assert_eq!(TableFormat::sniff(&bytes), TableFormat::Workbook);

        let table = read_table(&bytes, TableFormat::Workbook).unwrap();
        let expected: Vec<String> = schema.display_names().map(str::to_string).collect();
        assert_eq!(table.headers, expected);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.cell(0, 0), &RawCell::Text("P-7".into()));
        assert_eq!(table.cell(0, 5), &RawCell::Number(250.0));
        assert_eq!(table.cell(0, 10), &RawCell::Text("2024-05-01".into()));
        assert!(table.cell(0, 1).is_empty());
    }
}
