//! Record types: subjects and the assessments and upcoming items they own.
//!
//! Records are the canonical persisted shape. Derived values (percentages,
//! ordering indices, owning subject) never live on these types; they are
//! attached by the view types in [`crate::order`].

use serde::{Deserialize, Serialize};

// ─── Palette ─────────────────────────────────────────────────────────────────

/// Display colours handed out to new subjects in rotation.
pub const PALETTE: [&str; 8] = [
  "#2aa9ff", "#5ae3a1", "#f6b96e", "#c78bff", "#ff8b8b", "#56d2d2", "#ffb347",
  "#4dd4a8",
];

/// The palette colour for the subject at `index`.
pub fn palette_color(index: usize) -> &'static str {
  PALETTE[index % PALETTE.len()]
}

// ─── Assessment ──────────────────────────────────────────────────────────────

/// A marked piece of work. Immutable once recorded; it can only be removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
  pub id:         String,
  pub name:       String,
  pub score:      f64,
  /// Must be positive for the assessment to count towards an average.
  pub total:      f64,
  /// `None` means an effective weight of 1.
  pub weight:     Option<f64>,
  /// Calendar date as `YYYY-MM-DD`.
  pub date:       String,
  /// Milliseconds since the epoch at insert time; only used as a sort
  /// tie-break.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<i64>,
}

// ─── Upcoming item ───────────────────────────────────────────────────────────

/// Something due in the future. Overdue status is derived from the date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingItem {
  pub id:         String,
  pub name:       String,
  /// Due date as `YYYY-MM-DD`.
  pub date:       String,
  #[serde(default)]
  pub notes:      String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<i64>,
}

// ─── Subject ─────────────────────────────────────────────────────────────────

/// A subject owns its assessments and upcoming items; deleting it cascades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
  pub id:          String,
  pub name:        String,
  /// Hex colour used for the subject's chart line and badges.
  pub color:       String,
  #[serde(default)]
  pub assessments: Vec<Assessment>,
  #[serde(default)]
  pub upcoming:    Vec<UpcomingItem>,
}

impl Subject {
  pub fn new(id: String, name: String, color: String) -> Self {
    Self {
      id,
      name,
      color,
      assessments: Vec::new(),
      upcoming: Vec::new(),
    }
  }

  /// Whether `name` matches this subject's name, ignoring case.
  pub fn name_matches(&self, name: &str) -> bool {
    self.name.to_lowercase() == name.to_lowercase()
  }
}

// ─── Dataset ─────────────────────────────────────────────────────────────────

/// The whole persisted document: `{ "subjects": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
  pub subjects: Vec<Subject>,
}

impl Dataset {
  pub fn subject(&self, id: &str) -> Option<&Subject> {
    self.subjects.iter().find(|s| s.id == id)
  }

  pub fn subject_mut(&mut self, id: &str) -> Option<&mut Subject> {
    self.subjects.iter_mut().find(|s| s.id == id)
  }

  /// Number of assessments across every subject.
  pub fn assessment_count(&self) -> usize {
    self.subjects.iter().map(|s| s.assessments.len()).sum()
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::Gradebook::add_assessment`].
/// The identifier and creation timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAssessment {
  pub name:   String,
  pub score:  f64,
  pub total:  f64,
  pub weight: Option<f64>,
  /// Defaults to the session's today when `None`.
  pub date:   Option<String>,
}

impl NewAssessment {
  /// Convenience constructor with an unweighted, today-dated assessment.
  pub fn new(name: impl Into<String>, score: f64, total: f64) -> Self {
    Self {
      name: name.into(),
      score,
      total,
      weight: None,
      date: None,
    }
  }

  pub fn weight(mut self, weight: f64) -> Self {
    self.weight = Some(weight);
    self
  }

  pub fn on(mut self, date: impl Into<String>) -> Self {
    self.date = Some(date.into());
    self
  }
}

/// Input to [`crate::store::Gradebook::add_upcoming`].
#[derive(Debug, Clone)]
pub struct NewUpcoming {
  pub name:  String,
  pub date:  String,
  pub notes: String,
}

impl NewUpcoming {
  pub fn new(name: impl Into<String>, date: impl Into<String>) -> Self {
    Self {
      name:  name.into(),
      date:  date.into(),
      notes: String::new(),
    }
  }

  pub fn notes(mut self, notes: impl Into<String>) -> Self {
    self.notes = notes.into();
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stats::Scored;

  fn assessment(score: f64, total: f64) -> Assessment {
    Assessment {
      id: "a".into(),
      name: "Quiz".into(),
      score,
      total,
      weight: None,
      date: "2024-03-01".into(),
      created_at: None,
    }
  }

  #[test]
  fn percentage_guards_zero_total() {
    assert_eq!(assessment(8.0, 10.0).percentage(), 80.0);
    assert_eq!(assessment(8.0, 0.0).percentage(), 0.0);
    assert_eq!(assessment(8.0, -4.0).percentage(), 0.0);
  }

  #[test]
  fn palette_rotates() {
    assert_eq!(palette_color(0), "#2aa9ff");
    assert_eq!(palette_color(8), "#2aa9ff");
    assert_eq!(palette_color(9), "#5ae3a1");
  }

  #[test]
  fn serializes_camel_case_and_null_weight() {
    let mut a = assessment(8.0, 10.0);
    a.created_at = Some(42);
    let json = serde_json::to_value(&a).unwrap();
    assert_eq!(json["createdAt"], 42);
    assert!(json["weight"].is_null());
  }
}
