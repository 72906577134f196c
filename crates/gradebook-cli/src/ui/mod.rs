//! TUI rendering: header tabs, the active pane, and a status bar.

pub mod calendar;
pub mod chart;
pub mod overview;
pub mod subjects;

use gradebook_core::{chart::parse_color, store::Persistence};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph, Tabs},
};

use crate::app::{App, Pane};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<P: Persistence>(f: &mut Frame, app: &App<P>) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.pane {
    Pane::Overview => overview::draw(f, rows[1], app),
    Pane::Subjects => subjects::draw(f, rows[1], app),
    Pane::Chart => chart::draw(f, rows[1], app),
    Pane::Calendar => calendar::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

/// Terminal colour for a stored colour string.
pub fn color(value: &str) -> Color {
  parse_color(value).map_or(Color::Gray, |(r, g, b)| Color::Rgb(r, g, b))
}

pub fn dim() -> Style { Style::default().fg(Color::DarkGray) }

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<P: Persistence>(f: &mut Frame, area: Rect, app: &App<P>) {
  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let date = format!("{} ", app.book.today().key);
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Min(0), Constraint::Length(date.len() as u16)])
    .split(inner);

  let titles: Vec<Line> = Pane::ALL
    .iter()
    .enumerate()
    .map(|(i, pane)| Line::from(format!("{} {}", i + 1, pane.title())))
    .collect();
  let selected = Pane::ALL.iter().position(|p| *p == app.pane).unwrap_or(0);
  let tabs = Tabs::new(titles)
    .select(selected)
    .style(Style::default().fg(Color::Gray))
    .highlight_style(
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    )
    .divider(" ");
  f.render_widget(tabs, cols[0]);
  f.render_widget(Paragraph::new(Span::styled(date, Style::default().fg(Color::Gray))), cols[1]);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<P: Persistence>(f: &mut Frame, area: Rect, app: &App<P>) {
  let (mode_label, hints) = match app.pane {
    Pane::Subjects if app.filter_active => ("SEARCH", "Type to filter  Esc cancel  Enter select"),
    Pane::Overview => ("OVERVIEW", "Tab/1-4 switch pane  q quit"),
    Pane::Subjects => (
      "SUBJECTS",
      "↑↓/jk navigate  / search  c colour  Enter chart  q quit",
    ),
    Pane::Chart => (
      "CHART",
      "←→/hl hover  Esc clear  m mode  +/- smoothness  q quit",
    ),
    Pane::Calendar => ("CALENDAR", "←→/hl month  t today  q quit"),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), dim());

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
