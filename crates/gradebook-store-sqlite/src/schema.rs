//! SQL schema for the gradebook SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for later migrations.

/// Current schema revision.
pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per storage key. Values are opaque strings (the dataset JSON,
-- the chart smoothness); writes replace the whole value.
CREATE TABLE IF NOT EXISTS storage (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL    -- RFC 3339 UTC
);

PRAGMA user_version = 1;
";
