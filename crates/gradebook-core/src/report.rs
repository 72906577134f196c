//! Dashboard summaries built from a dataset: the overview card, insight
//! rows, subject cards, the assessment table and the upcoming digest.
//!
//! Reports hold display-ready values but no markup; each front end decides
//! how to draw them.

use crate::{
  date::Today,
  format::{self, fixed1, short_date},
  grade::{Grade, GradeBand, letter_grade},
  order::{
    AssessmentView, UpcomingView, sort_chronologically, sorted_assessments,
    sorted_subject_assessments, sorted_upcoming, subject_upcoming,
  },
  record::{Dataset, Subject},
  stats::{Scored, best_grade, latest_assessment, overall_average, subject_stats, top_subject},
};

/// Upcoming items shown on the dashboard before the rest are summarised.
pub const DIGEST_LIMIT: usize = 4;

// ─── Overview ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TopSubject<'a> {
  pub subject: &'a Subject,
  pub average: f64,
  pub grade:   Option<Grade>,
}

#[derive(Debug, Clone)]
pub struct LatestAssessment<'a> {
  pub view:       AssessmentView<'a>,
  pub percentage: f64,
  pub grade:      Option<Grade>,
}

#[derive(Debug, Clone)]
pub struct Overview<'a> {
  pub average:          Option<f64>,
  pub grade:            Option<Grade>,
  pub subject_count:    usize,
  pub assessment_count: usize,
  pub best_grade:       Option<Grade>,
  pub top_subject:      Option<TopSubject<'a>>,
  pub latest:           Option<LatestAssessment<'a>>,
}

impl<'a> Overview<'a> {
  pub fn build(data: &'a Dataset) -> Self {
    let average = overall_average(data);
    let all = data.subjects.iter().flat_map(|s| s.assessments.iter());

    let top_subject = top_subject(&data.subjects).and_then(|subject| {
      let stats = subject_stats(subject);
      Some(TopSubject { subject, average: stats.average?, grade: stats.grade })
    });
    let latest = latest_assessment(data).map(|view| {
      let percentage = view.percentage();
      LatestAssessment { view, percentage, grade: letter_grade(Some(percentage)) }
    });

    Self {
      average,
      grade: letter_grade(average),
      subject_count: data.subjects.len(),
      assessment_count: data.assessment_count(),
      best_grade: best_grade(all),
      top_subject,
      latest,
    }
  }

  /// Colour family for the overall grade badge.
  pub fn band(&self) -> GradeBand { GradeBand::of(self.grade) }

  /// One-line caption under the overall average.
  pub fn caption(&self) -> String {
    match self.average {
      None => "Add your first assessment to begin.".to_string(),
      Some(_) => format!("Weighted across {} assessments.", self.assessment_count),
    }
  }
}

impl TopSubject<'_> {
  pub fn detail(&self) -> String {
    format!("{}% · {}", fixed1(self.average), format::grade(self.grade))
  }
}

impl LatestAssessment<'_> {
  pub fn detail(&self) -> String {
    format!("{}% · {}", fixed1(self.percentage), format::grade(self.grade))
  }

  /// Subject name and short date.
  pub fn meta(&self) -> String {
    format!("{} · {}", self.view.subject.name, short_date(&self.view.assessment.date))
  }
}

// ─── Insights ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insight {
  pub title:  &'static str,
  pub detail: String,
}

pub fn insights(overview: &Overview<'_>) -> [Insight; 4] {
  let overall = match overview.average {
    Some(average) => format!("{}% · {}", fixed1(average), format::grade(overview.grade)),
    None => "Add assessments to calculate.".to_string(),
  };
  let top = match &overview.top_subject {
    Some(top) => format!("{} · {}", top.subject.name, top.detail()),
    None => "No subjects yet.".to_string(),
  };
  let latest = match &overview.latest {
    Some(latest) => format!("{} · {}%", latest.view.assessment.name, fixed1(latest.percentage)),
    None => "No assessments yet.".to_string(),
  };
  let total = match overview.assessment_count {
    0 => "Start with your first mark.".to_string(),
    n => format!("{n} logged so far."),
  };

  [
    Insight { title: "Overall average", detail: overall },
    Insight { title: "Top subject", detail: top },
    Insight { title: "Latest assessment", detail: latest },
    Insight { title: "Total assessments", detail: total },
  ]
}

// ─── Subject cards ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectCard {
  pub id:          String,
  pub name:        String,
  pub initials:    String,
  pub color:       String,
  pub assessments: usize,
  pub average:     Option<f64>,
  pub grade:       Option<Grade>,
}

impl SubjectCard {
  pub fn of(subject: &Subject) -> Self {
    let stats = subject_stats(subject);
    Self {
      id:          subject.id.clone(),
      name:        subject.name.clone(),
      initials:    format::initials(&subject.name),
      color:       subject.color.clone(),
      assessments: subject.assessments.len(),
      average:     stats.average,
      grade:       stats.grade,
    }
  }

  /// `"82.5% · B+ · 3 assessments"`, with `--` for missing values.
  pub fn summary(&self) -> String {
    let average = match self.average {
      Some(average) => format!("{}%", fixed1(average)),
      None => format::EMPTY.to_string(),
    };
    format!("{average} · {} · {} assessments", format::grade(self.grade), self.assessments)
  }
}

/// Cards in subject order.
pub fn subject_cards(data: &Dataset) -> Vec<SubjectCard> {
  data.subjects.iter().map(SubjectCard::of).collect()
}

// ─── Assessment table ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentRow {
  pub subject_id: String,
  pub subject:    String,
  pub id:         String,
  pub name:       String,
  /// `"8 / 10"`.
  pub score:      String,
  /// The weight as entered, `--` when absent.
  pub weight:     String,
  pub percentage: f64,
  pub grade:      Option<Grade>,
  /// Short display date.
  pub date:       String,
}

impl AssessmentRow {
  fn of(view: &AssessmentView<'_>) -> Self {
    let a = view.assessment;
    let percentage = view.percentage();
    Self {
      subject_id: view.subject.id.clone(),
      subject: view.subject.name.clone(),
      id: a.id.clone(),
      name: a.name.clone(),
      score: format!("{} / {}", a.score, a.total),
      weight: a.weight.map_or_else(|| format::EMPTY.to_string(), |w| w.to_string()),
      percentage,
      grade: letter_grade(Some(percentage)),
      date: short_date(&a.date),
    }
  }
}

fn newest_first(views: Vec<AssessmentView<'_>>) -> Vec<AssessmentRow> {
  views.iter().rev().map(AssessmentRow::of).collect()
}

/// Every assessment, newest first.
pub fn assessment_table(data: &Dataset) -> Vec<AssessmentRow> {
  newest_first(sorted_assessments(data))
}

/// One subject's assessments, newest first.
pub fn subject_history(subject: &Subject) -> Vec<AssessmentRow> {
  newest_first(sorted_subject_assessments(subject))
}

// ─── Upcoming ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingRow {
  pub subject_id: String,
  pub subject:    String,
  pub color:      String,
  pub id:         String,
  pub name:       String,
  pub date:       String,
  pub notes:      String,
  pub overdue:    bool,
}

impl UpcomingRow {
  fn of(view: &UpcomingView<'_>, today: &Today) -> Self {
    let item = view.item;
    Self {
      subject_id: view.subject.id.clone(),
      subject:    view.subject.name.clone(),
      color:      view.subject.color.clone(),
      id:         item.id.clone(),
      name:       item.name.clone(),
      date:       item.date.clone(),
      notes:      item.notes.clone(),
      overdue:    today.is_past(&item.date),
    }
  }

  /// Secondary line: optional subject, short date, then notes if any.
  pub fn meta(&self, show_subject: bool) -> String {
    let mut parts = Vec::with_capacity(3);
    if show_subject && !self.subject.is_empty() {
      parts.push(self.subject.clone());
    }
    parts.push(short_date(&self.date));
    if !self.notes.is_empty() {
      parts.push(self.notes.clone());
    }
    parts.join(" · ")
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingDigest {
  pub rows: Vec<UpcomingRow>,
  /// Items beyond the visible rows.
  pub more: usize,
}

impl UpcomingDigest {
  pub fn more_label(&self) -> Option<String> {
    (self.more > 0).then(|| format!("+{} more scheduled", self.more))
  }
}

/// The first `limit` upcoming items across all subjects, soonest first.
pub fn upcoming_digest(data: &Dataset, today: &Today, limit: usize) -> UpcomingDigest {
  let views = sorted_upcoming(data);
  let more = views.len().saturating_sub(limit);
  UpcomingDigest {
    rows: views.iter().take(limit).map(|v| UpcomingRow::of(v, today)).collect(),
    more,
  }
}

/// Every upcoming item of one subject, soonest first.
pub fn subject_upcoming_rows(subject: &Subject, today: &Today) -> Vec<UpcomingRow> {
  sort_chronologically(subject_upcoming(subject))
    .iter()
    .map(|v| UpcomingRow::of(v, today))
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::record::{Assessment, UpcomingItem};

  fn today() -> Today { Today::from_date(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()) }

  fn assessment(name: &str, score: f64, total: f64, date: &str) -> Assessment {
    Assessment {
      id: name.into(),
      name: name.into(),
      score,
      total,
      weight: None,
      date: date.into(),
      created_at: None,
    }
  }

  fn upcoming(name: &str, date: &str) -> UpcomingItem {
    UpcomingItem {
      id: name.into(),
      name: name.into(),
      date: date.into(),
      notes: String::new(),
      created_at: None,
    }
  }

  fn sample() -> Dataset {
    let mut maths = Subject::new("m".into(), "Maths".into(), "#2aa9ff".into());
    maths.assessments = vec![
      assessment("Quiz1", 8.0, 10.0, "2024-03-01"),
      assessment("Quiz2", 9.0, 10.0, "2024-03-05"),
    ];
    let mut physics = Subject::new("p".into(), "Physics".into(), "#5ae3a1".into());
    physics.assessments = vec![assessment("Lab", 7.5, 10.0, "2024-03-03")];
    Dataset { subjects: vec![maths, physics] }
  }

  #[test]
  fn empty_overview_uses_placeholders() {
    let data = Dataset::default();
    let overview = Overview::build(&data);
    assert_eq!(overview.caption(), "Add your first assessment to begin.");
    assert_eq!(overview.band(), GradeBand::A);
    let details: Vec<String> = insights(&overview).into_iter().map(|i| i.detail).collect();
    assert_eq!(details, [
      "Add assessments to calculate.",
      "No subjects yet.",
      "No assessments yet.",
      "Start with your first mark.",
    ]);
  }

  #[test]
  fn overview_of_sample() {
    let data = sample();
    let overview = Overview::build(&data);
    assert_eq!(overview.subject_count, 2);
    assert_eq!(overview.assessment_count, 3);
    assert_eq!(overview.best_grade, Some(Grade::A));
    assert_eq!(overview.top_subject.as_ref().unwrap().subject.name, "Maths");
    assert_eq!(overview.latest.as_ref().unwrap().view.assessment.name, "Quiz2");
    assert_eq!(overview.latest.as_ref().unwrap().meta(), "Maths · 5 Mar");
    assert_eq!(overview.caption(), "Weighted across 3 assessments.");

    let insights = insights(&overview);
    assert_eq!(insights[1].detail, "Maths · 85.0% · A-");
    assert_eq!(insights[2].detail, "Quiz2 · 90.0%");
    assert_eq!(insights[3].detail, "3 logged so far.");
  }

  #[test]
  fn table_is_newest_first() {
    let rows = assessment_table(&sample());
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Quiz2", "Lab", "Quiz1"]);
    assert_eq!(rows[1].score, "7.5 / 10");
    assert_eq!(rows[1].weight, "--");
    assert_eq!(rows[1].subject, "Physics");
    assert_eq!(rows[2].date, "1 Mar");
  }

  #[test]
  fn subject_cards_show_initials_and_stats() {
    let data = sample();
    let cards = subject_cards(&data);
    assert_eq!(cards[0].initials, "MA");
    assert_eq!(cards[0].summary(), "85.0% · A- · 2 assessments");
    let empty = SubjectCard::of(&Subject::new("x".into(), "Art History".into(), "#fff".into()));
    assert_eq!(empty.initials, "AH");
    assert_eq!(empty.summary(), "-- · -- · 0 assessments");
  }

  #[test]
  fn digest_shows_four_and_counts_the_rest() {
    let mut data = sample();
    data.subjects[0].upcoming = vec![
      upcoming("e", "2024-03-20"),
      upcoming("a", "2024-03-01"),
      upcoming("c", "2024-03-12"),
    ];
    data.subjects[1].upcoming = vec![upcoming("b", "2024-03-10"), upcoming("d", "2024-03-15")];
    let digest = upcoming_digest(&data, &today(), DIGEST_LIMIT);
    let names: Vec<&str> = digest.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c", "d"]);
    assert!(digest.rows[0].overdue);
    assert!(!digest.rows[1].overdue);
    assert_eq!(digest.more, 1);
    assert_eq!(digest.more_label().as_deref(), Some("+1 more scheduled"));
    assert_eq!(digest.rows[1].meta(true), "Physics · 10 Mar");
    assert_eq!(digest.rows[1].meta(false), "10 Mar");

    let rows = subject_upcoming_rows(&data.subjects[0], &today());
    assert_eq!(rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), ["a", "c", "e"]);
  }
}
