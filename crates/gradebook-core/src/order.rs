//! Chronological ordering of assessments and upcoming items.
//!
//! Records are ordered by calendar date. Records sharing a date fall back to
//! their creation timestamp, and records without one fall back to their
//! insertion index within the owning subject. The insertion index is carried
//! on a view type rather than written onto the record.

use std::cmp::Ordering;

use crate::{
  date::date_value,
  record::{Assessment, Dataset, Subject, UpcomingItem},
};

// ─── Ordering key ────────────────────────────────────────────────────────────

/// Anything that can be placed on the timeline.
pub trait Chronological {
  /// Stored date string.
  fn date(&self) -> &str;
  /// Creation timestamp, if one was recorded.
  fn created_at(&self) -> Option<i64>;
  /// Insertion index within the owning collection.
  fn order(&self) -> usize;

  /// Secondary key for records sharing a date.
  fn tie_break(&self) -> f64 {
    match self.created_at() {
      Some(stamp) => stamp as f64,
      None => self.order() as f64,
    }
  }
}

/// Compare two records by date, then tie-break.
pub fn chronological_cmp<T: Chronological>(a: &T, b: &T) -> Ordering {
  date_value(a.date())
    .cmp(&date_value(b.date()))
    .then_with(|| a.tie_break().total_cmp(&b.tie_break()))
}

/// Sort ascending by date with tie-breaks. Stable, so fully-equal keys keep
/// their incoming order, and re-sorting a sorted sequence is a no-op.
pub fn sort_chronologically<T: Chronological>(items: Vec<T>) -> Vec<T> {
  let mut keyed: Vec<(i64, f64, T)> = items
    .into_iter()
    .map(|item| (date_value(item.date()), item.tie_break(), item))
    .collect();
  keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.total_cmp(&b.1)));
  keyed.into_iter().map(|(_, _, item)| item).collect()
}

// ─── Views ───────────────────────────────────────────────────────────────────

/// An assessment together with its owning subject and insertion index.
#[derive(Debug, Clone, Copy)]
pub struct AssessmentView<'a> {
  pub subject:    &'a Subject,
  pub assessment: &'a Assessment,
  pub order:      usize,
}

impl Chronological for AssessmentView<'_> {
  fn date(&self) -> &str { &self.assessment.date }

  fn created_at(&self) -> Option<i64> { self.assessment.created_at }

  fn order(&self) -> usize { self.order }
}

/// An upcoming item together with its owning subject and insertion index.
#[derive(Debug, Clone, Copy)]
pub struct UpcomingView<'a> {
  pub subject: &'a Subject,
  pub item:    &'a UpcomingItem,
  pub order:   usize,
}

impl Chronological for UpcomingView<'_> {
  fn date(&self) -> &str { &self.item.date }

  fn created_at(&self) -> Option<i64> { self.item.created_at }

  fn order(&self) -> usize { self.order }
}

/// Views over one subject's assessments, in insertion order.
pub fn subject_assessments(subject: &Subject) -> Vec<AssessmentView<'_>> {
  subject
    .assessments
    .iter()
    .enumerate()
    .map(|(order, assessment)| AssessmentView { subject, assessment, order })
    .collect()
}

/// Views over every subject's assessments, subject by subject.
pub fn all_assessments(data: &Dataset) -> Vec<AssessmentView<'_>> {
  data.subjects.iter().flat_map(subject_assessments).collect()
}

/// Views over one subject's upcoming items, in insertion order.
pub fn subject_upcoming(subject: &Subject) -> Vec<UpcomingView<'_>> {
  subject
    .upcoming
    .iter()
    .enumerate()
    .map(|(order, item)| UpcomingView { subject, item, order })
    .collect()
}

/// Views over every subject's upcoming items, subject by subject.
pub fn all_upcoming(data: &Dataset) -> Vec<UpcomingView<'_>> {
  data.subjects.iter().flat_map(subject_upcoming).collect()
}

/// One subject's assessments in chronological order.
pub fn sorted_subject_assessments(subject: &Subject) -> Vec<AssessmentView<'_>> {
  sort_chronologically(subject_assessments(subject))
}

/// Every assessment in chronological order.
pub fn sorted_assessments(data: &Dataset) -> Vec<AssessmentView<'_>> {
  sort_chronologically(all_assessments(data))
}

/// Every upcoming item in chronological order.
pub fn sorted_upcoming(data: &Dataset) -> Vec<UpcomingView<'_>> {
  sort_chronologically(all_upcoming(data))
}
