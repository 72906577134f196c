//! Chart pane: the trend geometry drawn on a braille canvas.
//!
//! Chart coordinates grow downwards while the canvas grows upwards, so every
//! y is flipped against the viewport height. Curves are flattened into
//! straight segments first.

use gradebook_core::{
  chart::{Path, Plot, Point, Segment},
  store::Persistence,
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  symbols::Marker,
  text::{Line as TextLine, Span},
  widgets::{
    Block, Borders,
    canvas::{Canvas, Context, Line, Points},
  },
};

use super::{color, dim};
use crate::app::{App, ChartView};

/// Straight segments per cubic when flattening.
const FLATTEN_STEPS: usize = 12;

pub fn draw<P: Persistence>(f: &mut Frame, area: Rect, app: &App<P>) {
  let view = app.chart_view();
  let viewport = *view.viewport();
  let (width, height) = (viewport.width, viewport.height);
  let hover = app.hover(&view);

  let mut title = vec![Span::styled(
    format!(" {} ", app.chart_title()),
    Style::default().add_modifier(Modifier::BOLD),
  )];
  if let Some(text) = &hover {
    title.push(Span::styled(format!(" {text} "), Style::default().fg(Color::Yellow)));
  }
  title.push(Span::styled(format!(" smoothness {:.2} ", app.smoothness()), dim()));

  let block = Block::default()
    .title(TextLine::from(title))
    .borders(Borders::ALL)
    .border_style(dim());

  // Chart units per terminal column, for right-aligning labels.
  let unit = width / f64::from(block.inner(area).width.max(1));
  let flip = |p: Point| (p.x, height - p.y);

  let canvas = Canvas::default()
    .block(block)
    .marker(Marker::Braille)
    .x_bounds([0.0, width])
    .y_bounds([0.0, height])
    .paint(|ctx| {
      for tick in view.ticks() {
        let y = height - tick.y;
        ctx.print(0.0, y, Span::styled(tick.label.clone(), dim()));
        let x = width - unit * tick.label.chars().count() as f64;
        ctx.print(x, y, Span::styled(tick.label.clone(), dim()));
      }
      ctx.layer();

      match &view {
        ChartView::Line(chart) => match &chart.plot {
          Plot::Placeholder(segment) => placeholder(ctx, segment, height),
          Plot::Curve { stroke, points, line, .. } => {
            let stroke = color(stroke);
            path(ctx, line, stroke, height);
            let coords: Vec<(f64, f64)> =
              points.iter().map(|p| flip(Point::new(p.x, p.y))).collect();
            ctx.draw(&Points { coords: &coords, color: stroke });
          }
        },
        ChartView::Multi(chart) => {
          if let Some(segment) = &chart.placeholder {
            placeholder(ctx, segment, height);
          }
          for line in &chart.lines {
            path(ctx, &line.path, color(&line.stroke), height);
          }
        }
      }

      if let Some(x) = app.pointer {
        ctx.layer();
        ctx.draw(&Line {
          x1:    x,
          y1:    height - viewport.plot_bottom(),
          x2:    x,
          y2:    height - viewport.plot_top(),
          color: Color::DarkGray,
        });
        if let Some(hit) = gradebook_core::chart::nearest(view.targets(), x) {
          let (hx, hy) = flip(Point::new(hit.x, hit.y));
          ctx.draw(&Points { coords: &[(hx, hy)], color: Color::White });
        }
      }
    });

  f.render_widget(canvas, area);
}

fn path(ctx: &mut Context<'_>, path: &Path, stroke: Color, height: f64) {
  for polyline in path.flatten(FLATTEN_STEPS) {
    for pair in polyline.windows(2) {
      ctx.draw(&Line {
        x1:    pair[0].x,
        y1:    height - pair[0].y,
        x2:    pair[1].x,
        y2:    height - pair[1].y,
        color: stroke,
      });
    }
  }
}

fn placeholder(ctx: &mut Context<'_>, segment: &Segment, height: f64) {
  ctx.draw(&Line {
    x1:    segment.from.x,
    y1:    height - segment.from.y,
    x2:    segment.to.x,
    y2:    height - segment.to.y,
    color: Color::DarkGray,
  });
}
