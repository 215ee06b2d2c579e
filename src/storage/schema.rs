//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the association registry.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Member associations and their resolved contact links
CREATE TABLE IF NOT EXISTS associations (
    number TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    raw_homepage TEXT,
    homepage TEXT,
    homepage_scheme TEXT,
    imprint TEXT,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_associations_homepage ON associations(homepage);

-- Failures found while resolving homepages or discovering imprints
CREATE TABLE IF NOT EXISTS problems (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    association_number TEXT NOT NULL REFERENCES associations(number),
    type TEXT NOT NULL,
    data TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_problems_association ON problems(association_number);
CREATE INDEX IF NOT EXISTS idx_problems_type ON problems(type);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
