//! Calendar pane: a six-week month grid with upcoming items per day.

use gradebook_core::{
  calendar::{CalendarCell, MonthGrid, index_events},
  format::short_date,
  store::Persistence,
};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{color, dim};
use crate::app::App;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub fn draw<P: Persistence>(f: &mut Frame, area: Rect, app: &App<P>) {
  let today = app.book.today();
  let index = index_events(app.book.data(), today);
  let Some(grid) = MonthGrid::build(app.month.year, app.month.month_index, &index, today) else {
    f.render_widget(Paragraph::new("Month out of range.").style(dim()), area);
    return;
  };

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Min(36), Constraint::Length(40)])
    .split(area);

  draw_grid(f, cols[0], &grid);
  draw_agenda(f, cols[1], &grid);
}

fn draw_grid(f: &mut Frame, area: Rect, grid: &MonthGrid) {
  let block = Block::default()
    .title(format!(" {} ", grid.heading))
    .borders(Borders::ALL)
    .border_style(dim());
  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut rows = vec![Constraint::Length(1)];
  rows.extend([Constraint::Ratio(1, 6); 6]);
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints(rows)
    .split(inner);
  let columns = |row: Rect| {
    Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Ratio(1, 7); 7])
      .split(row)
  };

  for (slot, name) in columns(rows[0]).iter().zip(WEEKDAYS) {
    f.render_widget(Paragraph::new(Span::styled(name, dim())), *slot);
  }
  for (week, row) in grid.weeks().zip(rows.iter().skip(1)) {
    for (cell, slot) in week.iter().zip(columns(*row).iter()) {
      f.render_widget(Paragraph::new(cell_lines(cell)), *slot);
    }
  }
}

fn cell_lines(cell: &CalendarCell) -> Vec<Line<'static>> {
  let day_style = if cell.is_today {
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD)
  } else if cell.muted {
    dim()
  } else {
    Style::default()
  };

  let mut lines = vec![Line::from(Span::styled(format!("{:>2}", cell.day()), day_style))];
  for event in &cell.events {
    let style = Style::default().fg(color(&event.color));
    let style = if cell.muted { style.add_modifier(Modifier::DIM) } else { style };
    lines.push(Line::from(Span::styled(format!("• {}", event.name), style)));
  }
  if cell.overflow > 0 {
    lines.push(Line::styled(format!("+{} more", cell.overflow), dim()));
  }
  lines
}

/// Everything due in the displayed month, in date order.
fn draw_agenda(f: &mut Frame, area: Rect, grid: &MonthGrid) {
  let mut lines = Vec::new();
  for cell in grid.cells.iter().filter(|c| !c.muted && !c.events.is_empty()) {
    lines.push(Line::styled(
      short_date(&cell.key),
      Style::default().add_modifier(Modifier::BOLD),
    ));
    for event in &cell.events {
      let mut spans = vec![
        Span::styled("  ● ", Style::default().fg(color(&event.color))),
        Span::raw(event.name.clone()),
        Span::styled(format!("  {}", event.subject), dim()),
      ];
      if event.overdue {
        spans.push(Span::styled("  Overdue", Style::default().fg(Color::Red)));
      }
      lines.push(Line::from(spans));
    }
    if cell.overflow > 0 {
      lines.push(Line::styled(format!("  +{} more", cell.overflow), dim()));
    }
  }
  if lines.is_empty() {
    lines.push(Line::styled("Nothing due this month.", dim()));
  }

  f.render_widget(
    Paragraph::new(lines)
      .block(
        Block::default()
          .title(" Due ")
          .borders(Borders::ALL)
          .border_style(dim()),
      )
      .wrap(Wrap { trim: false }),
    area,
  );
}
