//! Overview pane: overall average, insights and the upcoming digest.

use gradebook_core::{
  format,
  report::{DIGEST_LIMIT, Overview, insights, upcoming_digest},
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

pub fn draw<P: Persistence>(f: &mut Frame, area: Rect, app: &App<P>) {
  let data = app.book.data();
  let overview = Overview::build(data);

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(area);
  let left = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(9), Constraint::Min(0)])
    .split(cols[0]);

  // Summary card.
  let bold = Style::default().add_modifier(Modifier::BOLD);
  let grade_style = Style::default()
    .fg(Color::Black)
    .bg(color(overview.band().color()))
    .add_modifier(Modifier::BOLD);
  let mut lines = vec![
    Line::from(vec![
      Span::styled(format!("{}%", format::percent(overview.average)), bold),
      Span::raw("  "),
      Span::styled(format!(" {} ", format::grade(overview.grade)), grade_style),
    ]),
    Line::styled(overview.caption(), dim()),
    Line::from(""),
    Line::from(format!(
      "{} subjects  ·  {} assessments  ·  best {}",
      overview.subject_count,
      overview.assessment_count,
      format::grade(overview.best_grade)
    )),
    Line::from(""),
  ];
  match &overview.top_subject {
    Some(top) => lines.push(Line::from(vec![
      Span::styled("Top     ", dim()),
      Span::styled(top.subject.name.clone(), Style::default().fg(color(&top.subject.color))),
      Span::raw(format!("  {}", top.detail())),
    ])),
    None => lines.push(Line::from(vec![
      Span::styled("Top     ", dim()),
      Span::raw("No data yet"),
    ])),
  }
  match &overview.latest {
    Some(latest) => lines.push(Line::from(vec![
      Span::styled("Latest  ", dim()),
      Span::raw(format!("{}  {}  ", latest.view.assessment.name, latest.detail())),
      Span::styled(latest.meta(), dim()),
    ])),
    None => lines.push(Line::from(vec![
      Span::styled("Latest  ", dim()),
      Span::raw("Nothing logged"),
    ])),
  }
  f.render_widget(
    Paragraph::new(lines).block(panel(" Overall ")),
    left[0],
  );

  // Insights.
  let lines: Vec<Line> = insights(&overview)
    .into_iter()
    .flat_map(|insight| {
      [
        Line::styled(insight.title, bold),
        Line::styled(format!("  {}", insight.detail), dim()),
      ]
    })
    .collect();
  f.render_widget(
    Paragraph::new(lines).block(panel(" Insights ")).wrap(Wrap { trim: false }),
    left[1],
  );

  // Upcoming.
  let digest = upcoming_digest(data, app.book.today(), DIGEST_LIMIT);
  let mut lines = Vec::new();
  if digest.rows.is_empty() {
    lines.push(Line::styled("No upcoming assessments yet.", dim()));
  }
  for row in &digest.rows {
    let mut name = vec![
      Span::styled("● ", Style::default().fg(color(&row.color))),
      Span::raw(row.name.clone()),
    ];
    if row.overdue {
      name.push(Span::styled(
        "  Overdue",
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
      ));
    }
    lines.push(Line::from(name));
    lines.push(Line::styled(format!("  {}", row.meta(true)), dim()));
  }
  if let Some(more) = digest.more_label() {
    lines.push(Line::styled(more, dim()));
  }
  f.render_widget(
    Paragraph::new(lines).block(panel(" Upcoming ")).wrap(Wrap { trim: false }),
    cols[1],
  );
}

fn panel(title: &str) -> Block<'_> {
  Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(dim())
}
