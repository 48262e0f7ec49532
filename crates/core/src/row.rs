// crates/core/src/row.rs
//! Project rows: flat JSON objects keyed by field id.
//!
//! Values are kept as `serde_json::Value` so rows round-trip unchanged through
//! the REST API regardless of whether a client stored `"250"` or `250`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{field, Schema};
use crate::status::ProjectStatus;

/// One project's record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectRow(Map<String, Value>);

impl ProjectRow {
    /// An empty row with no fields at all (the UI's editable placeholder).
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// A freshly appended row: every schema field empty, status "In Planning".
    pub fn blank(schema: &Schema) -> Self {
        let mut row = Self::new();
        for f in schema.fields() {
            row.set(&f.id, "");
        }
        row.set(field::STATUS, ProjectStatus::InPlanning.as_str());
        row
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    pub fn set(&mut self, id: &str, value: impl Into<Value>) {
        self.0.insert(id.to_string(), value.into());
    }

    /// Display text of a field; absent and null read as "".
    pub fn text(&self, id: &str) -> String {
        self.get(id).map(value_to_text).unwrap_or_default()
    }

    /// Numeric value of a field with the zero fallback.
    pub fn number(&self, id: &str) -> f64 {
        number_or_zero(self.get(id))
    }

    /// True when every value is null, empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.values().all(is_blank_value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for ProjectRow {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub fn is_blank_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Parse a stored value as a number, degrading to 0.
///
/// Numbers pass through; strings are parsed after trimming; everything else
/// (absent, null, bool, nested) and non-finite results read as 0.
pub fn number_or_zero(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// JSON number for `n`, written as an integer when it has no fraction.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(String::new()))
    }
}

/// Render a number the way a spreadsheet shows it: `5` not `5.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
