//! Display formatting for dashboard values.

use chrono::{Datelike, NaiveDate};

use crate::{date::parse_date, grade::Grade};

/// Placeholder shown for absent values.
pub const EMPTY: &str = "--";

/// One decimal place, rounding exact halves away from zero.
pub fn fixed1(value: f64) -> String {
  let rounded = (value * 10.0).round() / 10.0;
  format!("{rounded:.1}")
}

/// `"80.0"`, or `--` when absent.
pub fn percent(value: Option<f64>) -> String { value.map_or_else(|| EMPTY.to_string(), fixed1) }

/// `"B+"`, or `--` when absent.
pub fn grade(value: Option<Grade>) -> String {
  value.map_or_else(|| EMPTY.to_string(), |g| g.to_string())
}

/// Short display date, e.g. `"1 Mar"`. Unparseable input is echoed back;
/// empty input shows `--`.
pub fn short_date(value: &str) -> String {
  if value.trim().is_empty() {
    return EMPTY.to_string();
  }
  match parse_date(value) {
    Some(date) => date.format("%-d %b").to_string(),
    None => value.to_string(),
  }
}

/// Month heading, e.g. `"March 2024"`, for a zero-based month.
pub fn month_heading(year: i32, month_index: u32) -> String {
  NaiveDate::from_ymd_opt(year, month_index + 1, 1)
    .map(|d| format!("{} {}", d.format("%B"), d.year()))
    .unwrap_or_default()
}

/// Badge initials: the first two letters of a one-word name, otherwise the
/// first letter of each of the first two words.
pub fn initials(name: &str) -> String {
  let words: Vec<&str> = name.split(' ').filter(|w| !w.is_empty()).collect();
  match words.as_slice() {
    [] => String::new(),
    [only] => only.chars().take(2).collect::<String>().to_uppercase(),
    [first, second, ..] => first
      .chars()
      .take(1)
      .chain(second.chars().take(1))
      .collect::<String>()
      .to_uppercase(),
  }
}
