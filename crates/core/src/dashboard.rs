// crates/core/src/dashboard.rs
//! Dashboard aggregation: pure functions over a row set. Nothing here keeps
//! state between polls.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::row::{format_number, ProjectRow};
use crate::schema::field;

/// Label used on the timeline when a row has no project code.
pub const UNNAMED_PROJECT_LABEL: &str = "Proj";

/// Headline counts shown on the dashboard and in the data-entry status bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub parts_produced: f64,
}

/// One point of the "Production Timeline" series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
pub struct TimelinePoint {
    pub label: String,
    pub percent: f64,
}

/// "Status Distribution" series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct StatusDistribution {
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
pub enum Badge {
    Completed,
    Active,
}

/// Row of the "Detailed Analytics" table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct DetailRow {
    pub code: String,
    pub description: String,
    pub target_date: String,
    /// `"produced / total"` as typed.
    pub parts: String,
    pub percent: f64,
    pub badge: Badge,
}

/// Everything the dashboard renders for one polled row set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub kpis: Kpis,
    pub timeline: Vec<TimelinePoint>,
    pub distribution: StatusDistribution,
    pub details: Vec<DetailRow>,
}

impl DashboardSnapshot {
    pub fn from_rows(rows: &[ProjectRow]) -> Self {
        Self {
            kpis: summarize(rows),
            timeline: timeline(rows),
            distribution: status_distribution(rows),
            details: rows.iter().map(detail_row).collect(),
        }
    }
}

fn percent_of(row: &ProjectRow) -> f64 {
    row.number(field::PERCENT_COMPLETED)
}

pub fn summarize(rows: &[ProjectRow]) -> Kpis {
    let mut kpis = Kpis {
        total: rows.len(),
        ..Kpis::default()
    };
    for row in rows {
        let p = percent_of(row);
        if p >= 100.0 {
            kpis.completed += 1;
        } else if p > 0.0 {
            kpis.in_progress += 1;
        }
        kpis.parts_produced += row.number(field::TOTAL_PARTS_PRODUCED);
    }
    kpis
}

pub fn timeline(rows: &[ProjectRow]) -> Vec<TimelinePoint> {
    rows.iter()
        .map(|row| {
            let code = row.text(field::PROJECT_CODE);
            TimelinePoint {
                label: if code.trim().is_empty() {
                    UNNAMED_PROJECT_LABEL.to_string()
                } else {
                    code
                },
                percent: percent_of(row),
            }
        })
        .collect()
}

/// Rows at or below 0% count as not started so the three buckets add up to
/// the row count.
pub fn status_distribution(rows: &[ProjectRow]) -> StatusDistribution {
    rows.iter().fold(StatusDistribution::default(), |mut acc, row| {
        let p = percent_of(row);
        if p >= 100.0 {
            acc.completed += 1;
        } else if p > 0.0 {
            acc.in_progress += 1;
        } else {
            acc.not_started += 1;
        }
        acc
    })
}

pub fn detail_row(row: &ProjectRow) -> DetailRow {
    let percent = percent_of(row);
    DetailRow {
        code: row.text(field::PROJECT_CODE),
        description: row.text(field::PROJECT_DESCRIPTION),
        target_date: row.text(field::TARGET_COMPLETION_DATE),
        parts: format!(
            "{} / {}",
            row.text(field::TOTAL_PARTS_PRODUCED),
            row.text(field::TOTAL_PARTS)
        ),
        percent,
        badge: if percent >= 100.0 {
            Badge::Completed
        } else {
            Badge::Active
        },
    }
}

/// Thousands-separated parts count, the way the KPI card shows it.
pub fn format_parts(n: f64) -> String {
    let text = format_number(n);
    let (int_part, frac) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(d) => ("-", d.to_string()),
        None => ("", int_part),
    };
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
