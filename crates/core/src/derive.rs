// crates/core/src/derive.rs
//! Derivation engine: keeps percent complete, parts remaining and status
//! consistent with the authoritative `totalParts` / `totalPartsProduced`.
//!
//! Percent and remaining are always recomputed from the totals. Status is
//! filled in while it is blank. After a single-cell edit, a status that still
//! matches the bucket of the previous percent is treated as engine-filled and
//! re-bucketed; any other status was typed or imported and stays as it is.

use serde_json::Value;

use crate::row::{is_blank_value, number_value, ProjectRow};
use crate::schema::field;
use crate::status::ProjectStatus;

/// Fields whose edits re-trigger derivation.
pub const DERIVATION_INPUTS: &[&str] = &[field::TOTAL_PARTS, field::TOTAL_PARTS_PRODUCED];

/// Fields owned by the engine.
pub const DERIVED_FIELDS: &[&str] = &[
    field::PERCENT_COMPLETED,
    field::TOTAL_PARTS_TO_BE_PRODUCED,
    field::STATUS,
];

pub fn is_derivation_input(field_id: &str) -> bool {
    DERIVATION_INPUTS.contains(&field_id)
}

/// Round half up, the way the dashboard has always displayed percentages.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// `round(100 * produced / total)`, or `None` when total is not positive.
pub fn percent_complete(total: f64, produced: f64) -> Option<f64> {
    (total > 0.0).then(|| round_half_up(100.0 * produced / total))
}

/// Recompute every derived field of `row` in place. Idempotent.
pub fn derive_row(row: &mut ProjectRow) {
    let total = row.number(field::TOTAL_PARTS);
    let produced = row.number(field::TOTAL_PARTS_PRODUCED);

    let percent = match percent_complete(total, produced) {
        Some(p) => {
            row.set(field::TOTAL_PARTS_TO_BE_PRODUCED, number_value((total - produced).max(0.0)));
            p
        }
        None => {
            row.set(field::TOTAL_PARTS_TO_BE_PRODUCED, "");
            row.number(field::PERCENT_COMPLETED)
        }
    };
    row.set(field::PERCENT_COMPLETED, number_value(percent));

    let status_blank = row.get(field::STATUS).map_or(true, is_blank_value);
    if status_blank {
        row.set(
            field::STATUS,
            Value::from(ProjectStatus::from_percent(percent).as_str()),
        );
    }
}

/// Re-derive after an edit to one of the totals.
///
/// A status equal to [`ProjectStatus::from_percent`] of the percent stored
/// before the edit follows the new percent, so a row seeded "In Planning"
/// moves to "Completed" once its totals say so.
pub fn rederive_row(row: &mut ProjectRow) {
    let previous = ProjectStatus::from_percent(row.number(field::PERCENT_COMPLETED));
    if row.text(field::STATUS).trim() == previous.as_str() {
        row.set(field::STATUS, "");
    }
    derive_row(row);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn row(total: Value, produced: Value) -> ProjectRow {
        ProjectRow::from_pairs([
            (field::TOTAL_PARTS, total),
            (field::TOTAL_PARTS_PRODUCED, produced),
        ])
    }

    #[test]
    fn test_percent_and_remaining() {
        let mut r = row(json!(250), json!(137));
        derive_row(&mut r);
        assert_eq!(r.get(field::PERCENT_COMPLETED), Some(&json!(55)));
        assert_eq!(r.get(field::TOTAL_PARTS_TO_BE_PRODUCED), Some(&json!(113)));
        assert_eq!(r.text(field::STATUS), "In Progress");
    }

    #[test]
    fn test_string_inputs_are_parsed() {
        let mut r = row(json!(" 200 "), json!("50"));
        derive_row(&mut r);
        assert_eq!(r.get(field::PERCENT_COMPLETED), Some(&json!(25)));
        assert_eq!(r.get(field::TOTAL_PARTS_TO_BE_PRODUCED), Some(&json!(150)));
    }

    #[test]
    fn test_overproduction_clamps_remaining() {
        let mut r = row(json!(100), json!(120));
        derive_row(&mut r);
        assert_eq!(r.get(field::PERCENT_COMPLETED), Some(&json!(120)));
        assert_eq!(r.get(field::TOTAL_PARTS_TO_BE_PRODUCED), Some(&json!(0)));
        assert_eq!(r.text(field::STATUS), "Completed");
    }

    #[test]
    fn test_zero_total_keeps_explicit_percent() {
        let mut r = row(json!(0), json!(10));
        r.set(field::PERCENT_COMPLETED, "40");
        derive_row(&mut r);
        assert_eq!(r.get(field::PERCENT_COMPLETED), Some(&json!(40)));
        assert_eq!(r.get(field::TOTAL_PARTS_TO_BE_PRODUCED), Some(&json!("")));
        assert_eq!(r.text(field::STATUS), "In Progress");
    }

    #[test]
    fn test_missing_total_defaults_percent_to_zero() {
        let mut r = ProjectRow::new();
        derive_row(&mut r);
        assert_eq!(r.get(field::PERCENT_COMPLETED), Some(&json!(0)));
        assert_eq!(r.get(field::TOTAL_PARTS_TO_BE_PRODUCED), Some(&json!("")));
        assert_eq!(r.text(field::STATUS), "In Planning");
    }

    #[test]
    fn test_unparsable_inputs_degrade_to_zero() {
        let mut r = row(json!("lots"), json!("some"));
        r.set(field::PERCENT_COMPLETED, "n/a");
        derive_row(&mut r);
        assert_eq!(r.get(field::PERCENT_COMPLETED), Some(&json!(0)));
        assert_eq!(r.text(field::STATUS), "In Planning");
    }

    #[test]
    fn test_status_buckets_when_blank() {
        for (produced, expected) in [(0, "In Planning"), (45, "In Progress"), (100, "Completed")] {
            let mut r = row(json!(100), json!(produced));
            r.set(field::STATUS, "  ");
            derive_row(&mut r);
            assert_eq!(r.text(field::STATUS), expected, "produced = {produced}");
        }
    }

    #[test]
    fn test_explicit_status_is_kept() {
        let mut r = row(json!(100), json!(100));
        r.set(field::STATUS, "On Hold");
        derive_row(&mut r);
        assert_eq!(r.text(field::STATUS), "On Hold");
        assert_eq!(r.get(field::PERCENT_COMPLETED), Some(&json!(100)));
    }

    #[test]
    fn test_rederive_follows_engine_filled_status() {
        let mut r = row(json!(100), json!(0));
        derive_row(&mut r);
        assert_eq!(r.text(field::STATUS), "In Planning");

        r.set(field::TOTAL_PARTS_PRODUCED, 40);
        rederive_row(&mut r);
        assert_eq!(r.text(field::STATUS), "In Progress");

        r.set(field::TOTAL_PARTS_PRODUCED, 100);
        rederive_row(&mut r);
        assert_eq!(r.text(field::STATUS), "Completed");
    }

    #[test]
    fn test_rederive_keeps_typed_status() {
        let mut r = row(json!(100), json!(0));
        r.set(field::STATUS, "On Hold");
        derive_row(&mut r);
        r.set(field::TOTAL_PARTS_PRODUCED, 100);
        rederive_row(&mut r);
        assert_eq!(r.text(field::STATUS), "On Hold");

        // "Completed" while still at 30% does not match the 30% bucket
        let mut r = row(json!(100), json!(30));
        r.set(field::STATUS, "Completed");
        derive_row(&mut r);
        r.set(field::TOTAL_PARTS_PRODUCED, 10);
        rederive_row(&mut r);
        assert_eq!(r.text(field::STATUS), "Completed");
    }

    #[test]
    fn test_half_rounds_up() {
        // 1/8 = 12.5%
        let mut r = row(json!(8), json!(1));
        derive_row(&mut r);
        assert_eq!(r.get(field::PERCENT_COMPLETED), Some(&json!(13)));
    }

    #[test]
    fn test_is_derivation_input() {
        assert!(is_derivation_input(field::TOTAL_PARTS));
        assert!(is_derivation_input(field::TOTAL_PARTS_PRODUCED));
        assert!(!is_derivation_input(field::STATUS));
        assert!(DERIVED_FIELDS.contains(&field::PERCENT_COMPLETED));
    }

    proptest! {
        #[test]
        fn prop_invariants_hold_for_positive_totals(total in 1u32..1_000_000, produced in 0u32..2_000_000) {
            let mut r = row(json!(total), json!(produced));
            derive_row(&mut r);
            let (t, p) = (total as f64, produced as f64);
            prop_assert_eq!(r.number(field::PERCENT_COMPLETED), (100.0 * p / t + 0.5).floor());
            prop_assert_eq!(r.number(field::TOTAL_PARTS_TO_BE_PRODUCED), (t - p).max(0.0));
        }

        #[test]
        fn prop_derivation_is_idempotent(
            total in prop::option::of(0u32..10_000),
            produced in prop::option::of(0u32..20_000),
            percent in prop::option::of(0u32..150),
            status in prop::option::of("[A-Za-z ]{0,12}"),
        ) {
            let mut r = ProjectRow::new();
            if let Some(t) = total { r.set(field::TOTAL_PARTS, t); }
            if let Some(p) = produced { r.set(field::TOTAL_PARTS_PRODUCED, p); }
            if let Some(p) = percent { r.set(field::PERCENT_COMPLETED, p); }
            if let Some(s) = status { r.set(field::STATUS, s); }

            derive_row(&mut r);
            let once = r.clone();
            derive_row(&mut r);
            prop_assert_eq!(once, r);
        }
    }
}
