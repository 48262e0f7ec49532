// crates/core/src/header.rs
//! Header normalizer: maps the column headers of an uploaded file onto
//! schema field ids.
//!
//! For every field, in schema order, the first unclaimed header matching the
//! highest-priority rule wins:
//!
//! 1. header == display name
//! 2. header == field id
//! 3. normalized header == normalized display name
//! 4. normalized header == normalized field id
//! 5. normalized header found in the alias table for that field
//!
//! Headers no rule claims are reported as unmapped; what happens to them is
//! decided by [`UnknownColumnPolicy`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{field, FieldDescriptor, Schema};

/// Alternate header spellings seen in real uploads, keyed by normalized text.
pub const HEADER_ALIASES: &[(&str, &str)] = &[
    ("project", field::PROJECT_CODE),
    ("projectcode", field::PROJECT_CODE),
    ("projectname", field::PROJECT_CODE),
    ("description", field::PROJECT_DESCRIPTION),
    ("dest", field::DESTINATION),
    ("destination", field::DESTINATION),
    ("containers", field::CONTAINER_COUNT),
    ("noofcontainers", field::CONTAINER_COUNT),
    ("dispatch", field::DISPATCH_TIMINGS),
    ("dispatchtimings", field::DISPATCH_TIMINGS),
    ("totalparts", field::TOTAL_PARTS),
    ("produced", field::TOTAL_PARTS_PRODUCED),
    ("remaining", field::TOTAL_PARTS_TO_BE_PRODUCED),
    ("toproduce", field::TOTAL_PARTS_TO_BE_PRODUCED),
    ("partsremaining", field::TOTAL_PARTS_TO_BE_PRODUCED),
    ("progress", field::PERCENT_COMPLETED),
    ("percent", field::PERCENT_COMPLETED),
    ("status", field::STATUS),
    ("targetdate", field::TARGET_COMPLETION_DATE),
];

/// What to do with uploaded columns that match no schema field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
#[serde(rename_all = "lowercase")]
pub enum UnknownColumnPolicy {
    /// Drop the column and list it in the import report.
    #[default]
    Skip,
    /// Append a Text field for it to the caller's copy of the schema.
    Extend,
}

impl std::str::FromStr for UnknownColumnPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "extend" => Ok(Self::Extend),
            other => Err(format!("Invalid unknown-column policy '{other}'. Valid options: skip, extend")),
        }
    }
}

/// Which rule claimed a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    DisplayName,
    Id,
    NormalizedDisplayName,
    NormalizedId,
    Alias,
    /// Column registered as a new field under `UnknownColumnPolicy::Extend`.
    AdHoc,
}

const RULES: [MatchRule; 5] = [
    MatchRule::DisplayName,
    MatchRule::Id,
    MatchRule::NormalizedDisplayName,
    MatchRule::NormalizedId,
    MatchRule::Alias,
];

/// One uploaded column and the field it feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../client/src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    /// 0-based column position in the uploaded table.
    pub column: usize,
    pub header: String,
    pub field_id: String,
    pub rule: MatchRule,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMapping {
    /// Claimed columns, in schema order.
    pub columns: Vec<ColumnMapping>,
    /// Column positions no rule claimed, in upload order.
    pub unmapped: Vec<usize>,
}

impl HeaderMapping {
    pub fn column_for(&self, field_id: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|m| m.field_id == field_id)
            .map(|m| m.column)
    }
}

/// Lower-case and strip every character outside `[a-z0-9]`.
pub fn normalize_key(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Field id an alternate header spelling stands for.
pub fn alias_for(normalized: &str) -> Option<&'static str> {
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, id)| *id)
}

fn rule_matches(rule: MatchRule, header: &str, normalized: &str, f: &FieldDescriptor) -> bool {
    match rule {
        MatchRule::DisplayName => header == f.display_name,
        MatchRule::Id => header == f.id,
        MatchRule::NormalizedDisplayName => {
            !normalized.is_empty() && normalized == normalize_key(&f.display_name)
        }
        MatchRule::NormalizedId => !normalized.is_empty() && normalized == normalize_key(&f.id),
        MatchRule::Alias => alias_for(normalized) == Some(f.id.as_str()),
        MatchRule::AdHoc => false,
    }
}

/// Resolve uploaded headers against `schema`.
pub fn resolve_headers(headers: &[String], schema: &Schema) -> HeaderMapping {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_key(h)).collect();
    let mut claimed = vec![false; headers.len()];
    let mut columns = Vec::new();

    for f in schema.fields() {
        let hit = RULES.iter().find_map(|&rule| {
            (0..headers.len())
                .find(|&i| !claimed[i] && rule_matches(rule, &headers[i], &normalized[i], f))
                .map(|i| (i, rule))
        });
        if let Some((i, rule)) = hit {
            claimed[i] = true;
            columns.push(ColumnMapping {
                column: i,
                header: headers[i].clone(),
                field_id: f.id.clone(),
                rule,
            });
        }
    }

    let unmapped = (0..headers.len())
        .filter(|&i| !claimed[i] && !headers[i].trim().is_empty())
        .collect();

    HeaderMapping { columns, unmapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  No. of Containers "), "noofcontainers");
        assert_eq!(normalize_key("Target_Date"), "targetdate");
        assert_eq!(normalize_key("%"), "");
    }

    #[test]
    fn test_exact_display_name_match() {
        let m = resolve_headers(&headers(&["Project", "Total Parts"]), &Schema::standard());
        assert_eq!(m.column_for(field::PROJECT_CODE), Some(0));
        assert_eq!(m.column_for(field::TOTAL_PARTS), Some(1));
        assert_eq!(m.columns[0].rule, MatchRule::DisplayName);
        assert!(m.unmapped.is_empty());
    }

    #[test]
    fn test_exact_id_match() {
        let m = resolve_headers(&headers(&["totalPartsProduced"]), &Schema::standard());
        assert_eq!(m.column_for(field::TOTAL_PARTS_PRODUCED), Some(0));
        assert_eq!(m.columns[0].rule, MatchRule::Id);
    }

    #[test]
    fn test_normalized_matches() {
        let m = resolve_headers(
            &headers(&["TARGET-DATE", "total_parts_produced"]),
            &Schema::standard(),
        );
        let date = m.columns.iter().find(|c| c.field_id == field::TARGET_COMPLETION_DATE).unwrap();
        assert_eq!(date.rule, MatchRule::NormalizedDisplayName);
        let produced = m.columns.iter().find(|c| c.field_id == field::TOTAL_PARTS_PRODUCED).unwrap();
        assert_eq!(produced.rule, MatchRule::NormalizedId);
    }

    #[test]
    fn test_produced_alias_ignores_case_and_whitespace() {
        for h in ["Produced", "  PRODUCED ", "produced"] {
            let m = resolve_headers(&headers(&[h]), &Schema::standard());
            assert_eq!(m.column_for(field::TOTAL_PARTS_PRODUCED), Some(0), "header {h:?}");
        }
    }

    #[test]
    fn test_aliases() {
        let m = resolve_headers(
            &headers(&["Project Name", "Dest", "Containers", "Percent", "Remaining"]),
            &Schema::standard(),
        );
        assert_eq!(m.column_for(field::PROJECT_CODE), Some(0));
        assert_eq!(m.column_for(field::DESTINATION), Some(1));
        assert_eq!(m.column_for(field::CONTAINER_COUNT), Some(2));
        assert_eq!(m.column_for(field::PERCENT_COMPLETED), Some(3));
        assert_eq!(m.column_for(field::TOTAL_PARTS_TO_BE_PRODUCED), Some(4));
        assert!(m.columns.iter().all(|c| c.rule == MatchRule::Alias));
    }

    #[test]
    fn test_higher_priority_rule_wins_over_earlier_column() {
        // "progress" (alias) comes first, "Progress" (display name) second
        let m = resolve_headers(&headers(&["percent", "Progress"]), &Schema::standard());
        assert_eq!(m.column_for(field::PERCENT_COMPLETED), Some(1));
        assert_eq!(m.unmapped, vec![0]);
    }

    #[test]
    fn test_header_is_claimed_once() {
        let m = resolve_headers(&headers(&["Status", "Status"]), &Schema::standard());
        assert_eq!(m.column_for(field::STATUS), Some(0));
        assert_eq!(m.unmapped, vec![1]);
    }

    #[test]
    fn test_unknown_and_empty_headers() {
        let m = resolve_headers(&headers(&["Supplier", "", "Project"]), &Schema::standard());
        assert_eq!(m.unmapped, vec![0]);
        assert_eq!(m.column_for(field::PROJECT_CODE), Some(2));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Extend".parse::<UnknownColumnPolicy>(), Ok(UnknownColumnPolicy::Extend));
        assert_eq!("skip".parse::<UnknownColumnPolicy>(), Ok(UnknownColumnPolicy::Skip));
        assert!("drop".parse::<UnknownColumnPolicy>().is_err());
        assert_eq!(UnknownColumnPolicy::default(), UnknownColumnPolicy::Skip);
    }
}
