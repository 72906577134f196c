//! Subjects pane: filterable list on the left, the selected subject's
//! history and upcoming items on the right.

use gradebook_core::{
  format::{self, fixed1},
  report::{SubjectCard, subject_history, subject_upcoming_rows},
  store::Persistence,
};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::{color, dim};
use crate::{app::App, commands::short_id};

pub fn draw<P: Persistence>(f: &mut Frame, area: Rect, app: &App<P>) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);
  draw_list(f, cols[0], app);
  draw_detail(f, cols[1], app);
}

// ─── List ─────────────────────────────────────────────────────────────────────

fn draw_list<P: Persistence>(f: &mut Frame, area: Rect, app: &App<P>) {
  let filtered = app.filtered_subjects();
  let total = app.book.data().subjects.len();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Subjects ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Subjects ({total}) ")
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(dim());

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|subject| {
      let card = SubjectCard::of(subject);
      ListItem::new(Line::from(vec![
        Span::styled(
          format!(" {:<2} ", card.initials),
          Style::default().fg(Color::Black).bg(color(&card.color)),
        ),
        Span::raw(format!(" {}", card.name)),
        Span::styled(format!("  {}", format::percent(card.average)), dim()),
      ]))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Filter bar along the bottom edge while a query is set.
  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  if items.is_empty() {
    f.render_widget(
      Paragraph::new("No subjects yet.").style(dim()),
      inner_area,
    );
    return;
  }

  let mut state = ListState::default();
  state.select(Some(app.list_cursor));
  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}

// ─── Detail ───────────────────────────────────────────────────────────────────

fn draw_detail<P: Persistence>(f: &mut Frame, area: Rect, app: &App<P>) {
  let Some(subject) = app.cursor_subject() else {
    let block = Block::default()
      .title(" Detail ")
      .borders(Borders::ALL)
      .border_style(dim());
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("Add a subject to start tracking results.").style(dim()),
      inner,
    );
    return;
  };

  let card = SubjectCard::of(subject);
  let block = Block::default()
    .title(Span::styled(
      format!(" {} ", card.name),
      Style::default().fg(color(&card.color)).add_modifier(Modifier::BOLD),
    ))
    .borders(Borders::ALL)
    .border_style(dim());

  let mut lines = vec![Line::styled(card.summary(), dim()), Line::from("")];

  let history = subject_history(subject);
  if history.is_empty() {
    lines.push(Line::styled("No assessments yet.", dim()));
  }
  for row in history {
    let weight = if row.weight == format::EMPTY {
      String::new()
    } else {
      format!(" · W{}", row.weight)
    };
    lines.push(Line::from(vec![
      Span::styled(format!("{:<8} ", row.date), dim()),
      Span::styled(format!("{:<24}", row.name), Style::default().add_modifier(Modifier::BOLD)),
      Span::raw(format!(
        " {} · {}% · {}{weight}",
        row.score,
        fixed1(row.percentage),
        format::grade(row.grade)
      )),
      Span::styled(format!("  {}", short_id(&row.id)), dim()),
    ]));
  }

  lines.push(Line::from(""));
  lines.push(Line::styled("Upcoming", Style::default().add_modifier(Modifier::BOLD)));
  let upcoming = subject_upcoming_rows(subject, app.book.today());
  if upcoming.is_empty() {
    lines.push(Line::styled("No upcoming assessments.", dim()));
  }
  for row in upcoming {
    let mut spans = vec![Span::raw(format!("{:<24} ", row.name)), Span::styled(row.meta(false), dim())];
    if row.overdue {
      spans.push(Span::styled("  Overdue", Style::default().fg(Color::Red)));
    }
    lines.push(Line::from(spans));
  }

  f.render_widget(Paragraph::new(lines).block(block), area);
}
