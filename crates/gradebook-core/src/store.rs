//! The `Persistence` trait and the `Gradebook` session store.
//!
//! A `Gradebook` owns the in-memory dataset for one session. Every mutation
//! validates its input, updates the dataset and writes the whole document
//! back through the injected [`Persistence`] backend.

use std::{cell::RefCell, collections::HashMap, convert::Infallible};

use chrono::Utc;
use tracing::debug;

use crate::{
  chart::{DEFAULT_SMOOTHNESS, clamp_smoothness},
  date::Today,
  error::{Error, Result},
  record::{
    Assessment, Dataset, NewAssessment, NewUpcoming, Subject, UpcomingItem, palette_color,
  },
  sanitize::{load_dataset, new_id},
};

/// Key holding the JSON dataset.
pub const DATA_KEY: &str = "grade-tracker-v1";
/// Key holding the chart smoothness as a decimal string.
pub const SMOOTHNESS_KEY: &str = "graph-smoothness";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A string key/value store.
///
/// Backends are synchronous; a session performs one read per key on open and
/// one write per mutation.
pub trait Persistence {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The value stored under `key`, or `None` if nothing has been written.
  fn read(&self, key: &str) -> Result<Option<String>, Self::Error>;

  /// Store `value` under `key`, replacing any previous value.
  fn write(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}

impl<P: Persistence + ?Sized> Persistence for &P {
  type Error = P::Error;

  fn read(&self, key: &str) -> Result<Option<String>, Self::Error> { (**self).read(key) }

  fn write(&self, key: &str, value: &str) -> Result<(), Self::Error> {
    (**self).write(key, value)
  }
}

fn persistence_error<E: std::error::Error + Send + Sync + 'static>(err: E) -> Error {
  Error::Persistence(Box::new(err))
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A backend that keeps everything in a map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Seed a store with existing entries.
  pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
  where
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      entries: RefCell::new(
        entries
          .into_iter()
          .map(|(k, v)| (k.into(), v.into()))
          .collect(),
      ),
    }
  }
}

impl Persistence for MemoryStore {
  type Error = Infallible;

  fn read(&self, key: &str) -> Result<Option<String>, Infallible> {
    Ok(self.entries.borrow().get(key).cloned())
  }

  fn write(&self, key: &str, value: &str) -> Result<(), Infallible> {
    self.entries.borrow_mut().insert(key.to_string(), value.to_string());
    Ok(())
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// One session over a persisted dataset.
pub struct Gradebook<P> {
  persistence: P,
  data:        Dataset,
  today:       Today,
  smoothness:  f64,
  last_stamp:  i64,
}

impl<P: Persistence> Gradebook<P> {
  /// Load the stored dataset and smoothness. `today` stays fixed for the
  /// lifetime of the session.
  pub fn open(persistence: P, today: Today) -> Result<Self> {
    let raw = persistence.read(DATA_KEY).map_err(persistence_error)?;
    let data = load_dataset(raw.as_deref(), &today);

    let smoothness = persistence
      .read(SMOOTHNESS_KEY)
      .map_err(persistence_error)?
      .and_then(|raw| raw.trim().parse::<f64>().ok())
      .map_or(DEFAULT_SMOOTHNESS, round_smoothness);

    debug!(
      subjects = data.subjects.len(),
      assessments = data.assessment_count(),
      smoothness,
      today = %today.key,
      "opened gradebook"
    );

    Ok(Self {
      persistence,
      data,
      today,
      smoothness,
      last_stamp: 0,
    })
  }

  pub fn data(&self) -> &Dataset { &self.data }

  pub fn today(&self) -> &Today { &self.today }

  pub fn smoothness(&self) -> f64 { self.smoothness }

  pub fn persistence(&self) -> &P { &self.persistence }

  // ── Subjects ──────────────────────────────────────────────────────────

  pub fn find_subject(&self, id: &str) -> Option<&Subject> { self.data.subject(id) }

  /// Case-insensitive lookup by name, ignoring surrounding whitespace.
  pub fn find_subject_by_name(&self, name: &str) -> Option<&Subject> {
    let name = name.trim();
    self.data.subjects.iter().find(|s| s.name_matches(name))
  }

  /// Create a subject. Names are unique ignoring case.
  pub fn add_subject(&mut self, name: &str) -> Result<Subject> {
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::EmptySubjectName);
    }
    if self.find_subject_by_name(name).is_some() {
      return Err(Error::DuplicateSubject(name.to_string()));
    }
    let subject = self.insert_subject(name);
    self.save()?;
    debug!(id = %subject.id, name = %subject.name, "added subject");
    Ok(subject)
  }

  /// The subject matching `name`, created if none exists.
  pub fn get_or_create_subject(&mut self, name: &str) -> Result<Subject> {
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::EmptySubjectName);
    }
    if let Some(existing) = self.find_subject_by_name(name) {
      return Ok(existing.clone());
    }
    self.add_subject(name)
  }

  fn insert_subject(&mut self, name: &str) -> Subject {
    let subject = Subject::new(
      new_id(),
      name.to_string(),
      palette_color(self.data.subjects.len()).to_string(),
    );
    self.data.subjects.push(subject.clone());
    subject
  }

  /// Remove a subject together with its assessments and upcoming items.
  pub fn delete_subject(&mut self, id: &str) -> Result<Subject> {
    let index = self
      .data
      .subjects
      .iter()
      .position(|s| s.id == id)
      .ok_or_else(|| Error::SubjectNotFound(id.to_string()))?;
    let subject = self.data.subjects.remove(index);
    self.save()?;
    debug!(
      id,
      assessments = subject.assessments.len(),
      upcoming = subject.upcoming.len(),
      "deleted subject"
    );
    Ok(subject)
  }

  /// Change a subject's colour. Returns `false` when the colour is unchanged
  /// (ignoring case), in which case nothing is written.
  pub fn set_subject_color(&mut self, id: &str, color: &str) -> Result<bool> {
    let color = color.trim();
    if color.is_empty() {
      return Err(Error::EmptyColor);
    }
    let subject = self.subject_mut(id)?;
    if subject.color.to_lowercase() == color.to_lowercase() {
      return Ok(false);
    }
    subject.color = color.to_string();
    self.save()?;
    debug!(id, color, "changed subject colour");
    Ok(true)
  }

  fn subject_mut(&mut self, id: &str) -> Result<&mut Subject> {
    self
      .data
      .subject_mut(id)
      .ok_or_else(|| Error::SubjectNotFound(id.to_string()))
  }

  // ── Assessments ───────────────────────────────────────────────────────

  pub fn add_assessment(&mut self, subject_id: &str, input: NewAssessment) -> Result<Assessment> {
    // Existence is checked before field validation.
    self.subject_mut(subject_id)?;

    let name = input.name.trim();
    if name.is_empty() {
      return Err(Error::EmptyName);
    }
    if !input.score.is_finite() || !input.total.is_finite() || input.total <= 0.0 {
      return Err(Error::InvalidScore);
    }
    if let Some(weight) = input.weight
      && (!weight.is_finite() || weight < 0.0)
    {
      return Err(Error::InvalidWeight);
    }
    let date = input
      .date
      .as_deref()
      .map(str::trim)
      .filter(|d| !d.is_empty())
      .unwrap_or(&self.today.key)
      .to_string();

    let assessment = Assessment {
      id: new_id(),
      name: name.to_string(),
      score: input.score,
      total: input.total,
      weight: input.weight,
      date,
      created_at: Some(self.stamp()),
    };
    self.subject_mut(subject_id)?.assessments.push(assessment.clone());
    self.save()?;
    debug!(subject_id, id = %assessment.id, name = %assessment.name, "added assessment");
    Ok(assessment)
  }

  pub fn remove_assessment(&mut self, subject_id: &str, assessment_id: &str) -> Result<Assessment> {
    let subject = self.subject_mut(subject_id)?;
    let index = subject
      .assessments
      .iter()
      .position(|a| a.id == assessment_id)
      .ok_or_else(|| Error::AssessmentNotFound(assessment_id.to_string()))?;
    let removed = subject.assessments.remove(index);
    self.save()?;
    debug!(subject_id, id = assessment_id, "removed assessment");
    Ok(removed)
  }

  // ── Upcoming ──────────────────────────────────────────────────────────

  pub fn add_upcoming(&mut self, subject_id: &str, input: NewUpcoming) -> Result<UpcomingItem> {
    self.subject_mut(subject_id)?;

    let name = input.name.trim();
    if name.is_empty() {
      return Err(Error::EmptyName);
    }
    let date = input.date.trim();
    if date.is_empty() {
      return Err(Error::MissingDueDate);
    }

    let item = UpcomingItem {
      id: new_id(),
      name: name.to_string(),
      date: date.to_string(),
      notes: input.notes.trim().to_string(),
      created_at: Some(self.stamp()),
    };
    self.subject_mut(subject_id)?.upcoming.push(item.clone());
    self.save()?;
    debug!(subject_id, id = %item.id, due = %item.date, "added upcoming item");
    Ok(item)
  }

  pub fn remove_upcoming(&mut self, subject_id: &str, upcoming_id: &str) -> Result<UpcomingItem> {
    let subject = self.subject_mut(subject_id)?;
    let index = subject
      .upcoming
      .iter()
      .position(|u| u.id == upcoming_id)
      .ok_or_else(|| Error::UpcomingNotFound(upcoming_id.to_string()))?;
    let removed = subject.upcoming.remove(index);
    self.save()?;
    debug!(subject_id, id = upcoming_id, "removed upcoming item");
    Ok(removed)
  }

  // ── Whole dataset ─────────────────────────────────────────────────────

  /// Drop every subject.
  pub fn reset(&mut self) -> Result<()> {
    let cleared = self.data.subjects.len();
    self.data = Dataset::default();
    self.save()?;
    debug!(cleared, "reset gradebook");
    Ok(())
  }

  /// Clamp to `[0, 1]`, round to two decimals and persist. Returns the
  /// stored value.
  pub fn set_smoothness(&mut self, value: f64) -> Result<f64> {
    self.smoothness = round_smoothness(value);
    self
      .persistence
      .write(SMOOTHNESS_KEY, &format!("{:.2}", self.smoothness))
      .map_err(persistence_error)?;
    debug!(smoothness = self.smoothness, "set smoothness");
    Ok(self.smoothness)
  }

  fn save(&self) -> Result<()> {
    let json = serde_json::to_string(&self.data)?;
    self.persistence.write(DATA_KEY, &json).map_err(persistence_error)
  }

  /// Wall-clock milliseconds, bumped so no two stamps in a session collide.
  fn stamp(&mut self) -> i64 {
    self.last_stamp = Utc::now().timestamp_millis().max(self.last_stamp + 1);
    self.last_stamp
  }
}

/// Smoothness is kept at two decimals so repeated steps land on exact values.
fn round_smoothness(value: f64) -> f64 { (clamp_smoothness(value) * 100.0).round() / 100.0 }

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::{order::sorted_assessments, stats::overall_average};

  fn today() -> Today { Today::from_date(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()) }

  fn open(store: &MemoryStore) -> Gradebook<&MemoryStore> {
    Gradebook::open(store, today()).unwrap()
  }

  #[test]
  fn empty_store_opens_empty() {
    let store = MemoryStore::new();
    let book = open(&store);
    assert!(book.data().subjects.is_empty());
    assert_eq!(book.smoothness(), DEFAULT_SMOOTHNESS);
  }

  #[test]
  fn subject_names_are_unique_ignoring_case() {
    let store = MemoryStore::new();
    let mut book = open(&store);
    let maths = book.add_subject("  Maths ").unwrap();
    assert_eq!(maths.name, "Maths");
    assert_eq!(maths.color, "#2aa9ff");
    assert!(matches!(book.add_subject("MATHS"), Err(Error::DuplicateSubject(_))));
    assert!(matches!(book.add_subject("   "), Err(Error::EmptySubjectName)));

    let again = book.get_or_create_subject("maths").unwrap();
    assert_eq!(again.id, maths.id);
    let physics = book.get_or_create_subject("Physics").unwrap();
    assert_eq!(physics.color, "#5ae3a1");
    assert_eq!(book.data().subjects.len(), 2);
  }

  #[test]
  fn validates_assessments() {
    let store = MemoryStore::new();
    let mut book = open(&store);
    let id = book.add_subject("Maths").unwrap().id;

    let rejected = [
      (NewAssessment::new(" ", 1.0, 2.0), "empty"),
      (NewAssessment::new("q", 1.0, 0.0), "score"),
      (NewAssessment::new("q", f64::NAN, 1.0), "score"),
      (NewAssessment::new("q", 1.0, 2.0).weight(-1.0), "weight"),
    ];
    for (input, expected) in rejected {
      match (book.add_assessment(&id, input).unwrap_err(), expected) {
        (Error::EmptyName, "empty") | (Error::InvalidScore, "score") | (Error::InvalidWeight, "weight") => {}
        (err, expected) => panic!("expected {expected} error, got {err}"),
      }
    }
    assert!(matches!(
      book.add_assessment("nope", NewAssessment::new("q", 1.0, 2.0)),
      Err(Error::SubjectNotFound(_))
    ));
    assert_eq!(book.data().assessment_count(), 0);
  }

  #[test]
  fn assessment_defaults_to_today_and_persists() {
    let store = MemoryStore::new();
    {
      let mut book = open(&store);
      let id = book.add_subject("Maths").unwrap().id;
      let a = book.add_assessment(&id, NewAssessment::new("Quiz1", 8.0, 10.0)).unwrap();
      assert_eq!(a.date, "2024-03-10");
      assert!(a.created_at.is_some());
    }
    let book = open(&store);
    assert_eq!(book.data().assessment_count(), 1);
    assert_eq!(overall_average(book.data()), Some(80.0));
  }

  #[test]
  fn same_day_assessments_keep_insertion_order() {
    let store = MemoryStore::new();
    let mut book = open(&store);
    let id = book.add_subject("Maths").unwrap().id;
    for name in ["first", "second", "third"] {
      book
        .add_assessment(&id, NewAssessment::new(name, 1.0, 1.0).on("2024-03-01"))
        .unwrap();
    }
    let names: Vec<&str> = sorted_assessments(book.data())
      .iter()
      .map(|v| v.assessment.name.as_str())
      .collect();
    assert_eq!(names, ["first", "second", "third"]);
  }

  #[test]
  fn delete_cascades() {
    let store = MemoryStore::new();
    let mut book = open(&store);
    let id = book.add_subject("Maths").unwrap().id;
    book.add_assessment(&id, NewAssessment::new("q", 1.0, 2.0)).unwrap();
    book.add_upcoming(&id, NewUpcoming::new("Exam", "2024-04-01")).unwrap();
    let removed = book.delete_subject(&id).unwrap();
    assert_eq!(removed.assessments.len(), 1);
    assert_eq!(removed.upcoming.len(), 1);
    assert!(open(&store).data().subjects.is_empty());
    assert!(matches!(book.delete_subject(&id), Err(Error::SubjectNotFound(_))));
  }

  #[test]
  fn removes_records_by_id() {
    let store = MemoryStore::new();
    let mut book = open(&store);
    let id = book.add_subject("Maths").unwrap().id;
    let a = book.add_assessment(&id, NewAssessment::new("q", 1.0, 2.0)).unwrap();
    let u = book.add_upcoming(&id, NewUpcoming::new("Exam", "2024-04-01")).unwrap();
    assert!(matches!(book.remove_assessment(&id, "x"), Err(Error::AssessmentNotFound(_))));
    assert_eq!(book.remove_assessment(&id, &a.id).unwrap().name, "q");
    assert!(matches!(book.remove_upcoming(&id, "x"), Err(Error::UpcomingNotFound(_))));
    assert_eq!(book.remove_upcoming(&id, &u.id).unwrap().name, "Exam");
  }

  #[test]
  fn upcoming_requires_name_and_date() {
    let store = MemoryStore::new();
    let mut book = open(&store);
    let id = book.add_subject("Maths").unwrap().id;
    assert!(matches!(
      book.add_upcoming(&id, NewUpcoming::new("", "2024-04-01")),
      Err(Error::EmptyName)
    ));
    assert!(matches!(
      book.add_upcoming(&id, NewUpcoming::new("Exam", " ")),
      Err(Error::MissingDueDate)
    ));
    let item = book
      .add_upcoming(&id, NewUpcoming::new(" Exam ", "2024-04-01").notes("  bring calculator "))
      .unwrap();
    assert_eq!(item.name, "Exam");
    assert_eq!(item.notes, "bring calculator");
  }

  #[test]
  fn unchanged_colour_is_not_written() {
    let store = MemoryStore::new();
    let mut book = open(&store);
    let id = book.add_subject("Maths").unwrap().id;
    assert!(!book.set_subject_color(&id, "#2AA9FF").unwrap());
    assert!(book.set_subject_color(&id, " #123456 ").unwrap());
    assert_eq!(open(&store).data().subjects[0].color, "#123456");
    assert!(matches!(book.set_subject_color(&id, ""), Err(Error::EmptyColor)));
  }

  #[test]
  fn smoothness_is_clamped_and_stored() {
    let store = MemoryStore::with_entries([(SMOOTHNESS_KEY, "garbage")]);
    let mut book = open(&store);
    assert_eq!(book.smoothness(), DEFAULT_SMOOTHNESS);
    assert_eq!(book.set_smoothness(4.0).unwrap(), 1.0);
    assert_eq!(open(&store).smoothness(), 1.0);

    let store = MemoryStore::with_entries([(SMOOTHNESS_KEY, "-0.5")]);
    assert_eq!(open(&store).smoothness(), 0.0);
  }

  #[test]
  fn smoothness_is_stored_at_two_decimals() {
    let store = MemoryStore::new();
    let mut book = open(&store);
    assert_eq!(book.set_smoothness(0.1 + 0.2).unwrap(), 0.3);
    assert_eq!(store.read(SMOOTHNESS_KEY).unwrap().as_deref(), Some("0.30"));

    let mut value = DEFAULT_SMOOTHNESS;
    for _ in 0..7 {
      value = book.set_smoothness(value - 0.05).unwrap();
    }
    assert_eq!(value, 0.0);
    assert_eq!(store.read(SMOOTHNESS_KEY).unwrap().as_deref(), Some("0.00"));

    let store = MemoryStore::with_entries([(SMOOTHNESS_KEY, "0.30000000000000004")]);
    assert_eq!(open(&store).smoothness(), 0.3);
  }

  #[test]
  fn reset_clears_everything() {
    let store = MemoryStore::new();
    let mut book = open(&store);
    book.add_subject("Maths").unwrap();
    book.reset().unwrap();
    assert!(book.data().subjects.is_empty());
    assert!(open(&store).data().subjects.is_empty());
  }
}
