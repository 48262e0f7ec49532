/// Inline SQL migrations for the ProSlide document store.
///
/// Each project row is stored as one JSON document; `position` keeps the
/// order the rows were saved in.

pub const MIGRATIONS: &[&str] = &[
    // Migration 1: project documents
    r#"
CREATE TABLE IF NOT EXISTS projects (
    position INTEGER PRIMARY KEY,
    doc TEXT NOT NULL
);
"#,
];
