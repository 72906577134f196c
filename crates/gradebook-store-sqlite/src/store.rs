//! [`SqliteStore`]: the SQLite implementation of [`Persistence`].

use std::path::Path;

use chrono::{DateTime, Utc};
use gradebook_core::store::Persistence;
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Key/value storage backed by a single SQLite file.
pub struct SqliteStore {
  conn: rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = rusqlite::Connection::open(path)?;
    debug!(path = %path.display(), "opened sqlite store");
    Self::init(conn)
  }

  /// Open an in-memory store; nothing outlives the value.
  pub fn open_in_memory() -> Result<Self> {
    Self::init(rusqlite::Connection::open_in_memory()?)
  }

  fn init(conn: rusqlite::Connection) -> Result<Self> {
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn })
  }

  /// The schema revision recorded in the database file.
  pub fn schema_version(&self) -> Result<i64> {
    Ok(self.conn.query_row("PRAGMA user_version", [], |r| r.get(0))?)
  }

  /// When `key` was last written, if ever.
  pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = self
      .conn
      .query_row(
        "SELECT updated_at FROM storage WHERE key = ?1",
        rusqlite::params![key],
        |r| r.get(0),
      )
      .optional()?;

    raw
      .map(|s| {
        DateTime::parse_from_rfc3339(&s)
          .map(|dt| dt.with_timezone(&Utc))
          .map_err(|e| Error::DateParse(format!("{s}: {e}")))
      })
      .transpose()
  }

  /// Every stored key, sorted.
  pub fn keys(&self) -> Result<Vec<String>> {
    let mut stmt = self.conn.prepare("SELECT key FROM storage ORDER BY key")?;
    let keys = stmt
      .query_map([], |r| r.get(0))?
      .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(keys)
  }
}

// ─── Persistence impl ────────────────────────────────────────────────────────

impl Persistence for SqliteStore {
  type Error = Error;

  fn read(&self, key: &str) -> Result<Option<String>> {
    Ok(
      self
        .conn
        .query_row(
          "SELECT value FROM storage WHERE key = ?1",
          rusqlite::params![key],
          |r| r.get(0),
        )
        .optional()?,
    )
  }

  fn write(&self, key: &str, value: &str) -> Result<()> {
    self.conn.execute(
      "INSERT INTO storage (key, value, updated_at) VALUES (?1, ?2, ?3)
       ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                      updated_at = excluded.updated_at",
      rusqlite::params![key, value, Utc::now().to_rfc3339()],
    )?;
    debug!(key, bytes = value.len(), "wrote storage key");
    Ok(())
  }
}
