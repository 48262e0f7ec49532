//! Arbitrary bytes as an uploaded workbook. The zip / OLE readers must
//! reject garbage with an error rather than a panic.
#![no_main]

use libfuzzer_sys::fuzz_target;
use proslide_core::{normalize_table, read_table, Schema, TableFormat, UnknownColumnPolicy};

fuzz_target!(|data: &[u8]| {
    if let Ok(table) = read_table(data, TableFormat::Workbook) {
        let _ = normalize_table(&table, &Schema::standard(), UnknownColumnPolicy::Skip);
    }
});
