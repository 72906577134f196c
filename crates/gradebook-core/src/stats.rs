//! Aggregation: weighted averages, best grade, top subject, latest record
//! and the cumulative trend series.

use crate::{
  chart::{ChartPoint, Series},
  grade::{Grade, letter_grade},
  order::{AssessmentView, sorted_assessments, sorted_subject_assessments},
  record::{Assessment, Dataset, Subject},
};

// ─── Scored records ──────────────────────────────────────────────────────────

/// A score out of a total, optionally weighted.
pub trait Scored {
  fn score(&self) -> f64;
  fn total(&self) -> f64;
  fn weight(&self) -> Option<f64>;

  /// The weight used for averaging; absent counts as 1.
  fn effective_weight(&self) -> f64 { self.weight().unwrap_or(1.0) }

  /// Own percentage; 0 when the total is not positive.
  fn percentage(&self) -> f64 {
    if self.total() > 0.0 {
      (self.score() / self.total()) * 100.0
    } else {
      0.0
    }
  }
}

impl Scored for Assessment {
  fn score(&self) -> f64 { self.score }

  fn total(&self) -> f64 { self.total }

  fn weight(&self) -> Option<f64> { self.weight }
}

impl Scored for AssessmentView<'_> {
  fn score(&self) -> f64 { self.assessment.score }

  fn total(&self) -> f64 { self.assessment.total }

  fn weight(&self) -> Option<f64> { self.assessment.weight }
}

impl<T: Scored + ?Sized> Scored for &T {
  fn score(&self) -> f64 { (**self).score() }

  fn total(&self) -> f64 { (**self).total() }

  fn weight(&self) -> Option<f64> { (**self).weight() }
}

/// `(fraction, weight)` for a record that can contribute to an average.
/// Records with a non-positive total or any non-finite field contribute
/// nothing.
fn contribution<T: Scored>(record: &T) -> Option<(f64, f64)> {
  let (score, total) = (record.score(), record.total());
  let weight = record.effective_weight();
  if !(score.is_finite() && total.is_finite() && weight.is_finite()) || total <= 0.0 {
    return None;
  }
  Some((score / total, weight))
}

// ─── Averages ────────────────────────────────────────────────────────────────

/// Weighted average percentage. `None` when there is nothing with a usable
/// total or the usable records weigh nothing.
pub fn weighted_average<I>(records: I) -> Option<f64>
where
  I: IntoIterator,
  I::Item: Scored,
{
  let mut sum = 0.0;
  let mut total_weight = 0.0;
  for record in records {
    if let Some((fraction, weight)) = contribution(&record) {
      sum += fraction * weight;
      total_weight += weight;
    }
  }
  (total_weight != 0.0).then(|| (sum / total_weight) * 100.0)
}

/// Grade of the single best individual percentage (unweighted).
pub fn best_grade<I>(records: I) -> Option<Grade>
where
  I: IntoIterator,
  I::Item: Scored,
{
  let best = records
    .into_iter()
    .map(|r| r.percentage())
    .filter(|p| p.is_finite())
    .reduce(f64::max)?;
  letter_grade(Some(best))
}

/// Average and grade of a subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectStats {
  pub average: Option<f64>,
  pub grade:   Option<Grade>,
}

pub fn subject_stats(subject: &Subject) -> SubjectStats {
  let average = weighted_average(&subject.assessments);
  SubjectStats { average, grade: letter_grade(average) }
}

/// Weighted average over every assessment of every subject, pooled (not an
/// average of subject averages).
pub fn overall_average(data: &Dataset) -> Option<f64> {
  weighted_average(data.subjects.iter().flat_map(|s| s.assessments.iter()))
}

/// The subject with the strictly highest average; the first wins ties.
pub fn top_subject(subjects: &[Subject]) -> Option<&Subject> {
  let mut best: Option<(&Subject, f64)> = None;
  for subject in subjects {
    if let Some(average) = weighted_average(&subject.assessments)
      && best.is_none_or(|(_, score)| average > score)
    {
      best = Some((subject, average));
    }
  }
  best.map(|(subject, _)| subject)
}

/// The chronologically last assessment across all subjects.
pub fn latest_assessment(data: &Dataset) -> Option<AssessmentView<'_>> {
  sorted_assessments(data).pop()
}

// ─── Trend series ────────────────────────────────────────────────────────────

/// Cumulative weighted average after each record, in the given order.
///
/// One point per record. A record that cannot contribute (non-positive
/// total) still produces a point carrying the running value so far; before
/// anything has contributed the running value is 0.
pub fn running_average<'a, I>(records: I) -> Vec<ChartPoint>
where
  I: IntoIterator<Item = AssessmentView<'a>>,
{
  let mut sum = 0.0;
  let mut weight_total = 0.0;
  records
    .into_iter()
    .map(|view| {
      if let Some((fraction, weight)) = contribution(&view) {
        sum += fraction * weight;
        weight_total += weight;
      }
      let value = if weight_total > 0.0 {
        (sum / weight_total) * 100.0
      } else {
        0.0
      };
      ChartPoint::new(value, view.assessment.name.clone())
    })
    .collect()
}

/// The overall progress series: the running average over every assessment
/// in chronological order.
pub fn overall_trend(data: &Dataset) -> Vec<ChartPoint> {
  running_average(sorted_assessments(data))
}

/// A subject's own percentages in chronological order.
pub fn subject_trend(subject: &Subject) -> Vec<ChartPoint> {
  sorted_subject_assessments(subject)
    .into_iter()
    .map(|view| ChartPoint::new(view.percentage(), view.assessment.name.clone()))
    .collect()
}

/// One series per subject that has at least one assessment.
pub fn subject_series(data: &Dataset) -> Vec<Series> {
  data
    .subjects
    .iter()
    .map(|subject| Series {
      name:   subject.name.clone(),
      color:  subject.color.clone(),
      points: subject_trend(subject),
    })
    .filter(|series| !series.points.is_empty())
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rec(score: f64, total: f64, weight: Option<f64>, date: &str) -> Assessment {
    Assessment {
      id: format!("{score}-{total}-{date}"),
      name: format!("{score}/{total}"),
      score,
      total,
      weight,
      date: date.into(),
      created_at: None,
    }
  }

  fn subject(name: &str, assessments: Vec<Assessment>) -> Subject {
    let mut s = Subject::new(name.to_lowercase(), name.into(), "#2aa9ff".into());
    s.assessments = assessments;
    s
  }

  #[test]
  fn absent_weight_counts_as_one() {
    let mut a = rec(1.0, 2.0, None, "2024-01-01");
    assert_eq!(a.effective_weight(), 1.0);
    a.weight = Some(0.0);
    assert_eq!(a.effective_weight(), 0.0);
  }

  #[test]
  fn running_average_starts_at_zero_for_weightless_records() {
    let s = subject("Maths", vec![
      rec(8.0, 10.0, Some(0.0), "2024-01-01"),
      rec(6.0, 10.0, None, "2024-01-02"),
      rec(10.0, 10.0, Some(0.0), "2024-01-03"),
    ]);
    let values: Vec<f64> = running_average(sorted_subject_assessments(&s))
      .into_iter()
      .map(|p| p.value)
      .collect();
    assert_eq!(values.len(), 3);
    assert!(values.iter().all(|v| !v.is_nan()));
    assert_eq!(values[0], 0.0);
    assert!((values[1] - 60.0).abs() < 1e-9);
    assert!((values[2] - 60.0).abs() < 1e-9);
  }

  #[test]
  fn weighted_average_empty_is_none() {
    let none: Vec<Assessment> = Vec::new();
    assert_eq!(weighted_average(&none), None);
  }

  #[test]
  fn weighted_average_all_invalid_totals_is_none() {
    let records = vec![
      rec(5.0, 0.0, None, "2024-01-01"),
      rec(5.0, -1.0, Some(2.0), "2024-01-02"),
    ];
    assert_eq!(weighted_average(&records), None);
  }

  #[test]
  fn weighted_average_applies_weights() {
    let records = vec![
      rec(50.0, 100.0, Some(1.0), "2024-01-01"),
      rec(90.0, 100.0, Some(3.0), "2024-01-02"),
    ];
    let avg = weighted_average(&records).unwrap();
    assert!((avg - 80.0).abs() < 1e-9);
  }

  #[test]
  fn weighted_average_ignores_invalid_totals() {
    let records = vec![
      rec(8.0, 10.0, None, "2024-01-01"),
      rec(3.0, 0.0, Some(5.0), "2024-01-02"),
    ];
    assert!((weighted_average(&records).unwrap() - 80.0).abs() < 1e-9);
  }

  #[test]
  fn zero_weights_only_is_none() {
    let records = vec![rec(8.0, 10.0, Some(0.0), "2024-01-01")];
    assert_eq!(weighted_average(&records), None);
  }

  #[test]
  fn overall_pools_assessments() {
    let data = Dataset {
      subjects: vec![
        subject("Maths", vec![rec(100.0, 100.0, None, "2024-01-01")]),
        subject(
          "English",
          vec![
            rec(40.0, 100.0, None, "2024-01-02"),
            rec(40.0, 100.0, None, "2024-01-03"),
          ],
        ),
      ],
    };
    // Pooled: 180 / 3 = 60, not (100 + 40) / 2 = 70.
    assert!((overall_average(&data).unwrap() - 60.0).abs() < 1e-9);
  }

  #[test]
  fn best_grade_is_unweighted_maximum() {
    let records = vec![
      rec(95.0, 100.0, Some(0.1), "2024-01-01"),
      rec(50.0, 100.0, Some(10.0), "2024-01-02"),
    ];
    assert_eq!(best_grade(&records), Some(Grade::APlus));
    let none: Vec<Assessment> = Vec::new();
    assert_eq!(best_grade(&none), None);
  }

  #[test]
  fn top_subject_first_wins_ties() {
    let subjects = vec![
      subject("Empty", vec![]),
      subject("Maths", vec![rec(80.0, 100.0, None, "2024-01-01")]),
      subject("Physics", vec![rec(8.0, 10.0, None, "2024-01-01")]),
      subject("Art", vec![rec(70.0, 100.0, None, "2024-01-01")]),
    ];
    assert_eq!(top_subject(&subjects).unwrap().name, "Maths");
    assert!(top_subject(&subjects[..1]).is_none());
  }

  #[test]
  fn latest_is_last_chronologically() {
    let data = Dataset {
      subjects: vec![
        subject("Maths", vec![rec(1.0, 2.0, None, "2024-05-01")]),
        subject("English", vec![rec(1.0, 4.0, None, "2024-04-01")]),
      ],
    };
    let latest = latest_assessment(&data).unwrap();
    assert_eq!(latest.subject.name, "Maths");
    assert!(latest_assessment(&Dataset::default()).is_none());
  }

  #[test]
  fn running_average_is_cumulative() {
    let data = Dataset {
      subjects: vec![subject(
        "Maths",
        vec![
          rec(50.0, 100.0, Some(1.0), "2024-01-01"),
          rec(90.0, 100.0, Some(3.0), "2024-01-02"),
          rec(1.0, 0.0, None, "2024-01-03"),
        ],
      )],
    };
    let trend = overall_trend(&data);
    let values: Vec<f64> = trend.iter().map(|p| p.value).collect();
    assert_eq!(values.len(), 3);
    assert!((values[0] - 50.0).abs() < 1e-9);
    assert!((values[1] - 80.0).abs() < 1e-9);
    assert!((values[2] - 80.0).abs() < 1e-9);
  }

  #[test]
  fn subject_trend_plots_own_percentages() {
    let s = subject(
      "Maths",
      vec![
        rec(9.0, 10.0, None, "2024-01-02"),
        rec(5.0, 10.0, Some(4.0), "2024-01-01"),
      ],
    );
    let values: Vec<f64> = subject_trend(&s).iter().map(|p| p.value).collect();
    assert_eq!(values, [50.0, 90.0]);
  }

  #[test]
  fn subject_series_skips_empty_subjects() {
    let data = Dataset {
      subjects: vec![
        subject("Empty", vec![]),
        subject("Maths", vec![rec(1.0, 2.0, None, "2024-01-01")]),
      ],
    };
    let series = subject_series(&data);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].name, "Maths");
  }
}
