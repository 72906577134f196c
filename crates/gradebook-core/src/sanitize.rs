//! Load-time repair of a stored dataset.
//!
//! Stored JSON is read as an untyped value and rebuilt field by field, so a
//! partially corrupt document still yields every record it can. Missing or
//! mistyped fields fall back to defaults instead of failing the load.

use std::sync::LazyLock;

use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  date::Today,
  record::{Assessment, Dataset, Subject, UpcomingItem, palette_color},
};

pub const DEFAULT_SUBJECT_NAME: &str = "Untitled Subject";
pub const DEFAULT_ASSESSMENT_NAME: &str = "Assessment";
pub const DEFAULT_UPCOMING_NAME: &str = "Upcoming assessment";

/// A fresh record id.
pub fn new_id() -> String { Uuid::new_v4().simple().to_string() }

/// Rebuild a dataset from the raw stored document.
///
/// `None` (nothing stored yet), unparseable JSON, and documents without a
/// `subjects` array all produce an empty dataset.
pub fn load_dataset(raw: Option<&str>, today: &Today) -> Dataset {
  let Some(raw) = raw else {
    return Dataset::default();
  };
  let document: Value = match serde_json::from_str(raw) {
    Ok(document) => document,
    Err(err) => {
      warn!(%err, "stored dataset is not valid JSON, starting empty");
      return Dataset::default();
    }
  };
  let Some(subjects) = document.get("subjects").and_then(Value::as_array) else {
    warn!("stored dataset has no subjects array, starting empty");
    return Dataset::default();
  };

  Dataset {
    subjects: subjects
      .iter()
      .enumerate()
      .map(|(index, raw)| subject(raw, index, today))
      .collect(),
  }
}

// ─── Field readers ───────────────────────────────────────────────────────────

static NO_FIELDS: LazyLock<Map<String, Value>> = LazyLock::new(Map::new);

/// Non-object records read as having no fields.
fn fields(raw: &Value) -> &Map<String, Value> { raw.as_object().unwrap_or(&*NO_FIELDS) }

/// A non-empty string field.
fn text<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
  fields.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn text_or(fields: &Map<String, Value>, key: &str, fallback: impl FnOnce() -> String) -> String {
  match text(fields, key) {
    Some(value) => value.to_string(),
    None => {
      let value = fallback();
      debug!(field = key, %value, "substituted default");
      value
    }
  }
}

fn number(fields: &Map<String, Value>, key: &str) -> Option<f64> {
  fields.get(key).and_then(Value::as_f64).filter(|n| n.is_finite())
}

fn list<'a>(fields: &'a Map<String, Value>, key: &str) -> &'a [Value] {
  fields
    .get(key)
    .and_then(Value::as_array)
    .map(Vec::as_slice)
    .unwrap_or_default()
}

fn created_at(fields: &Map<String, Value>) -> Option<i64> {
  let value = fields.get("createdAt")?;
  value
    .as_i64()
    .or_else(|| value.as_f64().filter(|n| n.is_finite()).map(|n| n as i64))
}

// ─── Records ─────────────────────────────────────────────────────────────────

fn subject(raw: &Value, index: usize, today: &Today) -> Subject {
  let fields = fields(raw);
  Subject {
    id:          text_or(fields, "id", new_id),
    name:        text_or(fields, "name", || DEFAULT_SUBJECT_NAME.to_string()),
    color:       text_or(fields, "color", || palette_color(index).to_string()),
    assessments: list(fields, "assessments")
      .iter()
      .map(|raw| assessment(raw, today))
      .collect(),
    upcoming:    list(fields, "upcoming")
      .iter()
      .map(|raw| upcoming(raw, today))
      .collect(),
  }
}

fn assessment(raw: &Value, today: &Today) -> Assessment {
  let fields = fields(raw);
  Assessment {
    id:         text_or(fields, "id", new_id),
    name:       text_or(fields, "name", || DEFAULT_ASSESSMENT_NAME.to_string()),
    score:      number(fields, "score").unwrap_or(0.0),
    total:      number(fields, "total").unwrap_or(0.0),
    weight:     number(fields, "weight").map(|w| w.max(0.0)),
    date:       text_or(fields, "date", || today.key.clone()),
    created_at: created_at(fields),
  }
}

fn upcoming(raw: &Value, today: &Today) -> UpcomingItem {
  let fields = fields(raw);
  UpcomingItem {
    id:         text_or(fields, "id", new_id),
    name:       text_or(fields, "name", || DEFAULT_UPCOMING_NAME.to_string()),
    date:       text_or(fields, "date", || today.key.clone()),
    notes:      text(fields, "notes").unwrap_or_default().to_string(),
    created_at: created_at(fields),
  }
}
