//! Date canonicalisation.
//!
//! Dates are stored as `YYYY-MM-DD` strings. For ordering they are reduced to
//! the UTC-midnight timestamp (milliseconds) of that calendar date; anything
//! that cannot be read as a date reduces to `0` and sorts first.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime};

/// Sentinel for empty or unparseable dates.
pub const UNPARSEABLE: i64 = 0;

/// Reduce a date string to a comparable UTC-midnight timestamp in
/// milliseconds. See the module docs for the sentinel rule.
pub fn date_value(value: &str) -> i64 {
  parse_date(value).map_or(UNPARSEABLE, midnight_millis)
}

/// Read a date string into a calendar date.
///
/// Three dash-separated numbers are read as year, month and day with
/// out-of-range months and days rolling over into neighbouring ones
/// (`2024-02-30` is 1 March). Other shapes fall back to a handful of common
/// timestamp and date formats.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
  let value = value.trim();
  if value.is_empty() {
    return None;
  }

  let parts: Vec<&str> = value.split('-').collect();
  if parts.len() == 3 {
    let numbers: Option<Vec<i64>> = parts.iter().map(|p| parse_component(p)).collect();
    if let Some(numbers) = numbers {
      return from_components(numbers[0], numbers[1] - 1, numbers[2]);
    }
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
    return Some(dt.date_naive());
  }
  for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
      return Some(dt.date());
    }
  }
  for fmt in ["%Y/%m/%d", "%d %B %Y", "%d %b %Y", "%B %d, %Y", "%b %d, %Y"] {
    if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
      return Some(date);
    }
  }
  None
}

fn parse_component(part: &str) -> Option<i64> {
  let part = part.trim();
  if part.is_empty() {
    return None;
  }
  let n: f64 = part.parse().ok()?;
  n.is_finite().then(|| n.trunc() as i64)
}

/// Build a date from a year, a zero-based month and a day, letting months
/// and days overflow into adjacent periods.
fn from_components(year: i64, month_index: i64, day: i64) -> Option<NaiveDate> {
  let months = year.checked_mul(12)?.checked_add(month_index)?;
  let year = i32::try_from(months.div_euclid(12)).ok()?;
  let month = u32::try_from(months.rem_euclid(12)).ok()? + 1;
  let first = NaiveDate::from_ymd_opt(year, month, 1)?;
  let offset = day - 1;
  if offset >= 0 {
    first.checked_add_days(Days::new(offset.unsigned_abs()))
  } else {
    first.checked_sub_days(Days::new(offset.unsigned_abs()))
  }
}

fn midnight_millis(date: NaiveDate) -> i64 {
  date
    .and_hms_opt(0, 0, 0)
    .map_or(UNPARSEABLE, |dt| dt.and_utc().timestamp_millis())
}

/// Zero-padded `YYYY-MM-DD` key from calendar parts. `month_index` is
/// zero-based; the key's month is one-based.
pub fn date_key(year: i32, month_index: u32, day: u32) -> String {
  format!("{year}-{:02}-{day:02}", month_index + 1)
}

/// The `YYYY-MM-DD` key of a calendar date.
pub fn key_of(date: NaiveDate) -> String {
  date_key(date.year(), date.month0(), date.day())
}

/// Number of days in the month at zero-based `month_index`.
pub fn days_in_month(year: i32, month_index: u32) -> u32 {
  let (next_year, next_month) = shift_month(year, month_index, 1);
  NaiveDate::from_ymd_opt(next_year, next_month + 1, 1)
    .and_then(|d| d.pred_opt())
    .map_or(31, |d| d.day())
}

/// Move a `(year, zero-based month)` pair by `delta` months.
pub fn shift_month(year: i32, month_index: u32, delta: i32) -> (i32, u32) {
  let months = year * 12 + month_index as i32 + delta;
  (months.div_euclid(12), months.rem_euclid(12) as u32)
}

// ─── Today ───────────────────────────────────────────────────────────────────

/// The session's notion of today, captured once and held fixed.
///
/// A session that spans midnight keeps the date it was opened with; overdue
/// flags and default dates stay consistent until the next reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Today {
  pub date:  NaiveDate,
  pub key:   String,
  pub value: i64,
}

impl Today {
  pub fn from_date(date: NaiveDate) -> Self {
    Self {
      date,
      key: key_of(date),
      value: midnight_millis(date),
    }
  }

  /// Snapshot the local calendar date.
  pub fn now() -> Self { Self::from_date(Local::now().date_naive()) }

  /// Whether `date` falls strictly before today. Empty dates are never past.
  pub fn is_past(&self, date: &str) -> bool {
    !date.trim().is_empty() && date_value(date) < self.value
  }
}
