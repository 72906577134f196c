//! Letter-grade classification.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A letter grade, best first.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum Grade {
  #[strum(serialize = "A+")]
  #[serde(rename = "A+")]
  APlus,
  #[strum(serialize = "A")]
  #[serde(rename = "A")]
  A,
  #[strum(serialize = "A-")]
  #[serde(rename = "A-")]
  AMinus,
  #[strum(serialize = "B+")]
  #[serde(rename = "B+")]
  BPlus,
  #[strum(serialize = "B")]
  #[serde(rename = "B")]
  B,
  #[strum(serialize = "B-")]
  #[serde(rename = "B-")]
  BMinus,
  #[strum(serialize = "C+")]
  #[serde(rename = "C+")]
  CPlus,
  #[strum(serialize = "C")]
  #[serde(rename = "C")]
  C,
  #[strum(serialize = "C-")]
  #[serde(rename = "C-")]
  CMinus,
  #[strum(serialize = "D+")]
  #[serde(rename = "D+")]
  DPlus,
  #[strum(serialize = "D")]
  #[serde(rename = "D")]
  D,
  #[strum(serialize = "D-")]
  #[serde(rename = "D-")]
  DMinus,
  #[strum(serialize = "E")]
  #[serde(rename = "E")]
  E,
}

/// Lower bounds (inclusive), highest first. C- spans 50 to 59.
const THRESHOLDS: [(f64, Grade); 12] = [
  (95.0, Grade::APlus),
  (90.0, Grade::A),
  (85.0, Grade::AMinus),
  (80.0, Grade::BPlus),
  (75.0, Grade::B),
  (70.0, Grade::BMinus),
  (65.0, Grade::CPlus),
  (60.0, Grade::C),
  (50.0, Grade::CMinus),
  (40.0, Grade::DPlus),
  (35.0, Grade::D),
  (30.0, Grade::DMinus),
];

/// Classify a percentage. `None` for absent or non-finite input.
pub fn letter_grade(percentage: Option<f64>) -> Option<Grade> {
  let p = percentage.filter(|p| p.is_finite())?;
  Some(
    THRESHOLDS
      .iter()
      .find(|(floor, _)| p >= *floor)
      .map_or(Grade::E, |(_, grade)| *grade),
  )
}

/// Colour family a grade is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeBand {
  A,
  B,
  C,
  Low,
}

impl Grade {
  pub fn band(self) -> GradeBand {
    match self {
      Self::APlus | Self::A | Self::AMinus => GradeBand::A,
      Self::BPlus | Self::B | Self::BMinus => GradeBand::B,
      Self::CPlus | Self::C | Self::CMinus => GradeBand::C,
      _ => GradeBand::Low,
    }
  }
}

impl GradeBand {
  /// Band for an optional grade; no grade shows in the A colour.
  pub fn of(grade: Option<Grade>) -> Self { grade.map_or(Self::A, Grade::band) }

  pub fn color(self) -> &'static str {
    match self {
      Self::A => "#5ae3a1",
      Self::B => "#2aa9ff",
      Self::C => "#f6b96e",
      Self::Low => "#ff8b8b",
    }
  }
}
