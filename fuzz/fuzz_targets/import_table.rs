//! Arbitrary CSV bytes through the whole import pipeline. Any input may be
//! rejected, none may panic, and accepted rows must carry the full schema.
#![no_main]

use libfuzzer_sys::fuzz_target;
use proslide_core::{normalize_table, read_table, Schema, TableFormat, UnknownColumnPolicy};

fuzz_target!(|data: &[u8]| {
    let Ok(table) = read_table(data, TableFormat::Csv) else {
        return;
    };
    let schema = Schema::standard();
    for policy in [UnknownColumnPolicy::Skip, UnknownColumnPolicy::Extend] {
        if let Ok(imported) = normalize_table(&table, &schema, policy) {
            for row in &imported.rows {
                for field in schema.fields() {
                    assert!(row.get(&field.id).is_some(), "missing {}", field.id);
                }
            }
        }
    }
});
