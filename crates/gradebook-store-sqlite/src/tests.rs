//! Tests for `SqliteStore` against in-memory and on-disk databases.

use chrono::NaiveDate;
use gradebook_core::{
  date::Today,
  record::NewAssessment,
  store::{DATA_KEY, Gradebook, Persistence, SMOOTHNESS_KEY},
};

use crate::{SqliteStore, schema::SCHEMA_VERSION};

fn store() -> SqliteStore { SqliteStore::open_in_memory().expect("in-memory store") }

fn today() -> Today { Today::from_date(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()) }

// ─── Key/value ───────────────────────────────────────────────────────────────

#[test]
fn missing_key_reads_none() {
  let s = store();
  assert_eq!(s.read(DATA_KEY).unwrap(), None);
  assert_eq!(s.updated_at(DATA_KEY).unwrap(), None);
}

#[test]
fn write_then_read() {
  let s = store();
  s.write(SMOOTHNESS_KEY, "0.5").unwrap();
  assert_eq!(s.read(SMOOTHNESS_KEY).unwrap().as_deref(), Some("0.5"));
  assert!(s.updated_at(SMOOTHNESS_KEY).unwrap().is_some());
}

#[test]
fn write_replaces_previous_value() {
  let s = store();
  s.write(DATA_KEY, "{}").unwrap();
  s.write(DATA_KEY, "{\"subjects\":[]}").unwrap();
  assert_eq!(s.read(DATA_KEY).unwrap().as_deref(), Some("{\"subjects\":[]}"));
  assert_eq!(s.keys().unwrap(), [DATA_KEY]);
}

#[test]
fn schema_version_is_recorded() {
  assert_eq!(store().schema_version().unwrap(), SCHEMA_VERSION);
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[test]
fn session_survives_reopen_on_disk() {
  let dir = std::env::temp_dir().join(format!("gradebook-test-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("store.sqlite3");
  let _ = std::fs::remove_file(&path);

  {
    let mut book = Gradebook::open(SqliteStore::open(&path).unwrap(), today()).unwrap();
    let id = book.add_subject("Maths").unwrap().id;
    book.add_assessment(&id, NewAssessment::new("Quiz1", 8.0, 10.0)).unwrap();
    book.set_smoothness(0.2).unwrap();
  }

  let book = Gradebook::open(SqliteStore::open(&path).unwrap(), today()).unwrap();
  assert_eq!(book.data().subjects.len(), 1);
  assert_eq!(book.data().assessment_count(), 1);
  assert_eq!(book.smoothness(), 0.2);
  assert_eq!(book.persistence().keys().unwrap(), [DATA_KEY, SMOOTHNESS_KEY]);

  drop(book);
  let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn corrupt_dataset_opens_empty() {
  let s = store();
  s.write(DATA_KEY, "{broken").unwrap();
  let book = Gradebook::open(s, today()).unwrap();
  assert!(book.data().subjects.is_empty());
}
