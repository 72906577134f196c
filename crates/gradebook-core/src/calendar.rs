//! Month-grid calendar of upcoming items.
//!
//! The grid always holds six Monday-first weeks. Days borrowed from the
//! neighbouring months are flagged as muted but still resolve to their real
//! dates, so events due on them show up too.

use std::{cmp::Ordering, collections::BTreeMap};

use chrono::{Datelike, Days, NaiveDate};

use crate::{
  date::{Today, key_of, shift_month},
  format::month_heading,
  order::sorted_upcoming,
  record::Dataset,
};

/// Cells in a month grid: six weeks of seven days.
pub const GRID_CELLS: usize = 42;

/// Events drawn per cell before the rest collapse into an overflow count.
pub const VISIBLE_EVENTS: usize = 3;

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
  Upcoming,
}

impl EventKind {
  /// Upcoming events sort ahead of every other kind.
  fn rank(self) -> u8 {
    match self {
      Self::Upcoming => 0,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
  pub kind:    EventKind,
  pub name:    String,
  pub subject: String,
  pub color:   String,
  pub overdue: bool,
}

fn event_cmp(a: &CalendarEvent, b: &CalendarEvent) -> Ordering {
  a.kind
    .rank()
    .cmp(&b.kind.rank())
    .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    .then_with(|| a.name.cmp(&b.name))
}

/// Events keyed by their stored date string.
pub type EventIndex = BTreeMap<String, Vec<CalendarEvent>>;

/// Group every upcoming item under its date.
pub fn index_events(data: &Dataset, today: &Today) -> EventIndex {
  let mut index = EventIndex::new();
  for view in sorted_upcoming(data) {
    let date = view.item.date.trim();
    if date.is_empty() {
      continue;
    }
    index.entry(date.to_string()).or_default().push(CalendarEvent {
      kind:    EventKind::Upcoming,
      name:    view.item.name.clone(),
      subject: view.subject.name.clone(),
      color:   view.subject.color.clone(),
      overdue: today.is_past(date),
    });
  }
  for events in index.values_mut() {
    events.sort_by(event_cmp);
  }
  index
}

// ─── Grid ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarCell {
  pub date:     NaiveDate,
  pub key:      String,
  /// Outside the displayed month.
  pub muted:    bool,
  pub is_today: bool,
  /// At most [`VISIBLE_EVENTS`] events.
  pub events:   Vec<CalendarEvent>,
  /// Events beyond the visible ones.
  pub overflow: usize,
}

impl CalendarCell {
  pub fn day(&self) -> u32 { self.date.day() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid {
  pub year:        i32,
  /// Zero-based.
  pub month_index: u32,
  pub heading:     String,
  pub cells:       Vec<CalendarCell>,
}

impl MonthGrid {
  /// Lay out the grid for a zero-based month. Returns `None` only for dates
  /// outside chrono's range.
  pub fn build(year: i32, month_index: u32, index: &EventIndex, today: &Today) -> Option<Self> {
    let first = NaiveDate::from_ymd_opt(year, month_index + 1, 1)?;
    let offset = u64::from(first.weekday().num_days_from_monday());
    let start = first.checked_sub_days(Days::new(offset))?;

    let mut cells = Vec::with_capacity(GRID_CELLS);
    for i in 0..GRID_CELLS as u64 {
      let date = start.checked_add_days(Days::new(i))?;
      let key = key_of(date);
      let mut events = index.get(&key).cloned().unwrap_or_default();
      let overflow = events.len().saturating_sub(VISIBLE_EVENTS);
      events.truncate(VISIBLE_EVENTS);
      cells.push(CalendarCell {
        muted: date.year() != year || date.month0() != month_index,
        is_today: date == today.date,
        date,
        key,
        events,
        overflow,
      });
    }

    Some(Self {
      year,
      month_index,
      heading: month_heading(year, month_index),
      cells,
    })
  }

  /// The grid split into Monday-first weeks.
  pub fn weeks(&self) -> std::slice::Chunks<'_, CalendarCell> { self.cells.chunks(7) }
}

// ─── Navigation ──────────────────────────────────────────────────────────────

/// Which month the calendar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
  pub year:        i32,
  pub month_index: u32,
}

impl MonthCursor {
  pub fn containing(date: NaiveDate) -> Self {
    Self { year: date.year(), month_index: date.month0() }
  }

  pub fn prev(self) -> Self { self.shift(-1) }

  pub fn next(self) -> Self { self.shift(1) }

  fn shift(self, delta: i32) -> Self {
    let (year, month_index) = shift_month(self.year, self.month_index, delta);
    Self { year, month_index }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::{Subject, UpcomingItem};

  fn today() -> Today { Today::from_date(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()) }

  fn item(name: &str, date: &str) -> UpcomingItem {
    UpcomingItem {
      id: name.into(),
      name: name.into(),
      date: date.into(),
      notes: String::new(),
      created_at: None,
    }
  }

  fn data(items: Vec<UpcomingItem>) -> Dataset {
    let mut s = Subject::new("m".into(), "Maths".into(), "#2aa9ff".into());
    s.upcoming = items;
    Dataset { subjects: vec![s] }
  }

  #[test]
  fn january_2024_starts_on_monday() {
    let grid = MonthGrid::build(2024, 0, &EventIndex::new(), &today()).unwrap();
    assert_eq!(grid.cells.len(), GRID_CELLS);
    assert!(!grid.cells[0].muted);
    assert_eq!(grid.cells[0].key, "2024-01-01");
    // 31 days, then 11 trailing days of February.
    assert!(grid.cells[30].date == NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    assert!(grid.cells[31].muted);
    assert_eq!(grid.cells[41].key, "2024-02-11");
    assert_eq!(grid.heading, "January 2024");
  }

  #[test]
  fn leading_days_borrow_previous_month_across_year() {
    // 1 March 2024 is a Friday: four leading days from February.
    let grid = MonthGrid::build(2024, 2, &EventIndex::new(), &today()).unwrap();
    assert_eq!(grid.cells.iter().take_while(|c| c.muted).count(), 4);
    assert_eq!(grid.cells[0].key, "2024-02-26");
    assert_eq!(grid.cells[4].key, "2024-03-01");

    // 1 January 2025 is a Wednesday: leading days are from December 2024.
    let grid = MonthGrid::build(2025, 0, &EventIndex::new(), &today()).unwrap();
    assert_eq!(grid.cells[0].key, "2024-12-30");
    assert!(grid.cells[0].muted && grid.cells[1].muted && !grid.cells[2].muted);
    assert_eq!(grid.cells.len(), GRID_CELLS);
  }

  #[test]
  fn marks_today() {
    let grid = MonthGrid::build(2024, 2, &EventIndex::new(), &today()).unwrap();
    let marked: Vec<&str> = grid.cells.iter().filter(|c| c.is_today).map(|c| c.key.as_str()).collect();
    assert_eq!(marked, ["2024-03-10"]);
  }

  #[test]
  fn events_sorted_by_name_and_capped() {
    let index = index_events(
      &data(vec![
        item("delta", "2024-03-12"),
        item("Bravo", "2024-03-12"),
        item("alpha", "2024-03-12"),
        item("charlie", "2024-03-12"),
        item("old", "2024-03-01"),
      ]),
      &today(),
    );
    let names: Vec<&str> = index["2024-03-12"].iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["alpha", "Bravo", "charlie", "delta"]);

    let grid = MonthGrid::build(2024, 2, &index, &today()).unwrap();
    let cell = grid.cells.iter().find(|c| c.key == "2024-03-12").unwrap();
    assert_eq!(cell.events.len(), VISIBLE_EVENTS);
    assert_eq!(cell.overflow, 1);
    assert_eq!(cell.events[0].subject, "Maths");
  }

  #[test]
  fn overdue_is_strictly_before_today() {
    let index = index_events(
      &data(vec![item("past", "2024-03-09"), item("now", "2024-03-10")]),
      &today(),
    );
    assert!(index["2024-03-09"][0].overdue);
    assert!(!index["2024-03-10"][0].overdue);
  }

  #[test]
  fn cursor_wraps_years() {
    let c = MonthCursor { year: 2024, month_index: 0 };
    assert_eq!(c.prev(), MonthCursor { year: 2023, month_index: 11 });
    assert_eq!(c.prev().next(), c);
    assert_eq!(MonthCursor::containing(today().date), MonthCursor { year: 2024, month_index: 2 });
  }
}
