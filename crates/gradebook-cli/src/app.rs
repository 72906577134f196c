//! Application state machine and event dispatcher for the dashboard.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use gradebook_core::{
  calendar::MonthCursor,
  chart::{
    LineChart, LineChartOptions, MultiLineChart, PlotPoint, Tick, Viewport, clamp_smoothness,
    nearest, tooltip,
  },
  record::{PALETTE, Subject},
  stats::{overall_trend, subject_series, subject_trend},
  store::{Gradebook, Persistence},
};

use crate::settings::Settings;

/// Pointer steps across the plot width.
const POINTER_STEPS: f64 = 40.0;
const SMOOTHNESS_STEP: f64 = 0.05;

// ─── Pane ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
  Overview,
  Subjects,
  Chart,
  Calendar,
}

impl Pane {
  pub const ALL: [Pane; 4] = [Pane::Overview, Pane::Subjects, Pane::Chart, Pane::Calendar];

  pub fn title(self) -> &'static str {
    match self {
      Pane::Overview => "Overview",
      Pane::Subjects => "Subjects",
      Pane::Chart => "Chart",
      Pane::Calendar => "Calendar",
    }
  }

  fn index(self) -> usize { Self::ALL.iter().position(|p| *p == self).unwrap_or(0) }

  fn offset(self, delta: isize) -> Self {
    let len = Self::ALL.len() as isize;
    Self::ALL[(self.index() as isize + delta).rem_euclid(len) as usize]
  }
}

/// Which series the chart pane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMode {
  /// Running weighted average of everything.
  Overall,
  /// One line per subject.
  Subjects,
  /// The subject under the list cursor.
  Subject,
}

impl ChartMode {
  fn next(self) -> Self {
    match self {
      ChartMode::Overall => ChartMode::Subjects,
      ChartMode::Subjects => ChartMode::Subject,
      ChartMode::Subject => ChartMode::Overall,
    }
  }
}

/// Laid-out geometry for the chart pane.
pub enum ChartView {
  Line(LineChart),
  Multi(MultiLineChart),
}

impl ChartView {
  pub fn viewport(&self) -> &Viewport {
    match self {
      ChartView::Line(chart) => &chart.viewport,
      ChartView::Multi(chart) => &chart.viewport,
    }
  }

  pub fn ticks(&self) -> &[Tick] {
    match self {
      ChartView::Line(chart) => &chart.ticks,
      ChartView::Multi(chart) => &chart.ticks,
    }
  }

  pub fn targets(&self) -> &[PlotPoint] {
    match self {
      ChartView::Line(chart) => chart.targets(),
      ChartView::Multi(chart) => &chart.targets,
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<P> {
  pub book:          Gradebook<P>,
  pub settings:      Settings,
  /// Current pane / keyboard focus.
  pub pane:          Pane,
  /// Current fuzzy-filter string (only active when `filter_active`).
  pub filter:        String,
  /// Whether the user is typing a filter query.
  pub filter_active: bool,
  /// Cursor position within the *filtered* subject list.
  pub list_cursor:   usize,
  pub chart_mode:    ChartMode,
  /// Hover position in chart coordinates; `None` hides the tooltip.
  pub pointer:       Option<f64>,
  pub month:         MonthCursor,
  /// One-line status message shown in the status bar.
  pub status_msg:    String,
}

impl<P: Persistence> App<P> {
  pub fn new(book: Gradebook<P>, settings: Settings) -> Self {
    let month = MonthCursor::containing(book.today().date);
    Self {
      book,
      settings,
      pane: Pane::Overview,
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      chart_mode: ChartMode::Overall,
      pointer: None,
      month,
      status_msg: String::new(),
    }
  }

  // ── Filtered list ─────────────────────────────────────────────────────────

  /// Subjects matching the current filter query.
  pub fn filtered_subjects(&self) -> Vec<&Subject> {
    let subjects = &self.book.data().subjects;
    if self.filter.is_empty() {
      return subjects.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    subjects
      .iter()
      .filter(|s| matcher.fuzzy_match(&s.name, &self.filter).is_some())
      .collect()
  }

  /// The subject under the list cursor in the filtered view, if any.
  pub fn cursor_subject(&self) -> Option<&Subject> {
    self.filtered_subjects().get(self.list_cursor).copied()
  }

  // ── Chart ─────────────────────────────────────────────────────────────────

  /// Smoothness used for drawing; a configured override wins.
  pub fn smoothness(&self) -> f64 {
    self
      .settings
      .smoothness
      .map_or(self.book.smoothness(), clamp_smoothness)
  }

  pub fn chart_title(&self) -> String {
    match self.chart_mode {
      ChartMode::Overall => "Overall progress".to_string(),
      ChartMode::Subjects => "All subjects".to_string(),
      ChartMode::Subject => match self.cursor_subject() {
        Some(subject) => subject.name.clone(),
        None => "No subject selected".to_string(),
      },
    }
  }

  pub fn chart_view(&self) -> ChartView {
    let (width, height) = (self.settings.chart_width, self.settings.chart_height);
    let smoothness = self.smoothness();
    match self.chart_mode {
      ChartMode::Overall => ChartView::Line(LineChart::layout(
        &overall_trend(self.book.data()),
        Viewport::line(width, height),
        &LineChartOptions { smoothness, ..LineChartOptions::default() },
      )),
      ChartMode::Subjects => ChartView::Multi(MultiLineChart::layout(
        &subject_series(self.book.data()),
        Viewport::multi(width, height),
        smoothness,
      )),
      ChartMode::Subject => {
        let (points, stroke) = match self.cursor_subject() {
          Some(subject) => (subject_trend(subject), subject.color.clone()),
          None => (Vec::new(), String::new()),
        };
        ChartView::Line(LineChart::layout(
          &points,
          Viewport::line(width, height),
          &LineChartOptions { stroke, smoothness, ..LineChartOptions::default() },
        ))
      }
    }
  }

  /// Tooltip for the point nearest the pointer.
  pub fn hover(&self, view: &ChartView) -> Option<String> {
    let x = self.pointer?;
    nearest(view.targets(), x).map(tooltip)
  }

  fn move_pointer(&mut self, direction: f64) {
    let view = self.chart_view();
    let viewport = view.viewport();
    let (left, right) = (viewport.plot_left(), viewport.plot_right());
    let step = (right - left) / POINTER_STEPS;
    self.pointer = Some(match self.pointer {
      Some(x) => (x + direction * step).clamp(left, right),
      None if direction < 0.0 => right,
      None => left,
    });
  }

  fn adjust_smoothness(&mut self, delta: f64) {
    match self.book.set_smoothness(self.book.smoothness() + delta) {
      Ok(value) => self.status_msg = format!("Smoothness {value:.2}"),
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Give the subject under the cursor the next palette colour.
  fn cycle_color(&mut self) {
    let Some(subject) = self.cursor_subject() else {
      return;
    };
    let id = subject.id.clone();
    let next = PALETTE
      .iter()
      .position(|c| c.eq_ignore_ascii_case(&subject.color))
      .map_or(0, |i| i + 1);
    let color = PALETTE[next % PALETTE.len()];
    self.status_msg = match self.book.set_subject_color(&id, color) {
      Ok(_) => format!("Colour set to {color}"),
      Err(e) => format!("Error: {e}"),
    };
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    // Filter input mode: all printable keys go into the filter string.
    if self.filter_active {
      self.handle_filter_key(key);
      return true;
    }

    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Tab => self.switch(self.pane.offset(1)),
      KeyCode::BackTab => self.switch(self.pane.offset(-1)),
      KeyCode::Char(c @ '1'..='4') => {
        let index = c as usize - '1' as usize;
        self.switch(Pane::ALL[index]);
      }
      _ => match self.pane {
        Pane::Overview => {}
        Pane::Subjects => self.handle_subjects_key(key),
        Pane::Chart => self.handle_chart_key(key),
        Pane::Calendar => self.handle_calendar_key(key),
      },
    }
    true
  }

  fn switch(&mut self, pane: Pane) {
    self.pane = pane;
    self.status_msg.clear();
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
  }

  fn handle_subjects_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_subjects().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Char('c') => self.cycle_color(),
      // Chart the selected subject.
      KeyCode::Enter => {
        if self.cursor_subject().is_some() {
          self.chart_mode = ChartMode::Subject;
          self.pointer = None;
          self.switch(Pane::Chart);
        }
      }
      _ => {}
    }
  }

  fn handle_chart_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('m') => {
        self.chart_mode = self.chart_mode.next();
        self.pointer = None;
      }
      KeyCode::Left | KeyCode::Char('h') => self.move_pointer(-1.0),
      KeyCode::Right | KeyCode::Char('l') => self.move_pointer(1.0),
      KeyCode::Esc => self.pointer = None,
      KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_smoothness(SMOOTHNESS_STEP),
      KeyCode::Char('-') => self.adjust_smoothness(-SMOOTHNESS_STEP),
      _ => {}
    }
  }

  fn handle_calendar_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Left | KeyCode::Char('h') => self.month = self.month.prev(),
      KeyCode::Right | KeyCode::Char('l') => self.month = self.month.next(),
      KeyCode::Char('t') => self.month = MonthCursor::containing(self.book.today().date),
      _ => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use chrono::NaiveDate;
  use gradebook_core::{date::Today, record::NewAssessment, store::MemoryStore};

  use super::*;

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  fn app(store: &MemoryStore) -> App<&MemoryStore> {
    let today = Today::from_date(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    let mut book = Gradebook::open(store, today).unwrap();
    for name in ["Maths", "Physics", "History"] {
      let id = book.add_subject(name).unwrap().id;
      for (i, score) in [6.0, 8.0].into_iter().enumerate() {
        book
          .add_assessment(&id, NewAssessment::new(format!("{name} {i}"), score, 10.0))
          .unwrap();
      }
    }
    let settings = Settings {
      store_path:   PathBuf::from(":memory:"),
      chart_width:  300.0,
      chart_height: 120.0,
      smoothness:   None,
    };
    App::new(book, settings)
  }

  #[test]
  fn tab_cycles_panes() {
    let store = MemoryStore::new();
    let mut app = app(&store);
    assert!(app.handle_key(key(KeyCode::Tab)));
    assert_eq!(app.pane, Pane::Subjects);
    app.handle_key(key(KeyCode::BackTab));
    app.handle_key(key(KeyCode::BackTab));
    assert_eq!(app.pane, Pane::Calendar);
    app.handle_key(key(KeyCode::Char('3')));
    assert_eq!(app.pane, Pane::Chart);
    assert!(!app.handle_key(key(KeyCode::Char('q'))));
  }

  #[test]
  fn filter_narrows_subjects() {
    let store = MemoryStore::new();
    let mut app = app(&store);
    app.handle_key(key(KeyCode::Char('2')));
    app.handle_key(key(KeyCode::Char('/')));
    for c in "phy".chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
    app.handle_key(key(KeyCode::Enter));
    let names: Vec<&str> = app.filtered_subjects().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Physics"]);
    assert_eq!(app.cursor_subject().unwrap().name, "Physics");
  }

  #[test]
  fn pointer_hovers_nearest_point() {
    let store = MemoryStore::new();
    let mut app = app(&store);
    app.handle_key(key(KeyCode::Char('3')));
    let view = app.chart_view();
    assert_eq!(app.hover(&view), None);

    app.handle_key(key(KeyCode::Right));
    let view = app.chart_view();
    assert_eq!(app.pointer, Some(view.viewport().plot_left()));
    assert_eq!(app.hover(&view).as_deref(), Some("Maths 0 · 60.0%"));

    for _ in 0..100 {
      app.handle_key(key(KeyCode::Right));
    }
    let view = app.chart_view();
    assert_eq!(app.pointer, Some(view.viewport().plot_right()));
    assert!(app.hover(&view).unwrap().starts_with("History 1"));
  }

  #[test]
  fn enter_charts_selected_subject() {
    let store = MemoryStore::new();
    let mut app = app(&store);
    app.handle_key(key(KeyCode::Char('2')));
    app.handle_key(key(KeyCode::Down));
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.pane, Pane::Chart);
    assert_eq!(app.chart_mode, ChartMode::Subject);
    assert_eq!(app.chart_title(), "Physics");
    assert_eq!(app.chart_view().targets().len(), 2);
  }

  #[test]
  fn smoothness_keys_persist() {
    let store = MemoryStore::new();
    let mut app = app(&store);
    app.handle_key(key(KeyCode::Char('3')));
    app.handle_key(key(KeyCode::Char('-')));
    assert!((app.book.smoothness() - 0.30).abs() < 1e-9);
    assert!((app.smoothness() - 0.30).abs() < 1e-9);
  }

  #[test]
  fn smoothness_steps_down_to_straight_lines() {
    let store = MemoryStore::new();
    let mut app = app(&store);
    app.handle_key(key(KeyCode::Char('3')));
    for _ in 0..7 {
      app.handle_key(key(KeyCode::Char('-')));
    }
    assert_eq!(app.smoothness(), 0.0);
    assert_eq!(app.status_msg, "Smoothness 0.00");
    app.handle_key(key(KeyCode::Char('-')));
    assert_eq!(app.book.smoothness(), 0.0);
    for _ in 0..7 {
      app.handle_key(key(KeyCode::Char('+')));
    }
    assert_eq!(app.book.smoothness(), 0.35);
  }

  #[test]
  fn colour_cycles_through_palette() {
    let store = MemoryStore::new();
    let mut app = app(&store);
    app.handle_key(key(KeyCode::Char('2')));
    app.handle_key(key(KeyCode::Char('c')));
    assert_eq!(app.book.data().subjects[0].color, PALETTE[1]);
  }

  #[test]
  fn calendar_navigates_months() {
    let store = MemoryStore::new();
    let mut app = app(&store);
    app.handle_key(key(KeyCode::Char('4')));
    app.handle_key(key(KeyCode::Left));
    assert_eq!(app.month, MonthCursor { year: 2024, month_index: 1 });
    app.handle_key(key(KeyCode::Char('t')));
    assert_eq!(app.month, MonthCursor { year: 2024, month_index: 2 });
  }
}
