//! Coordinate mapping and chart assembly.

use super::{
  ChartPoint, DEFAULT_SMOOTHNESS, DEFAULT_STROKE, Point, Series,
  color::with_alpha,
  hover::PlotPoint,
  path::{Path, trace_smooth},
  scale::{ValueRange, scale_value, ticks, value_range},
};

/// Number of axis intervals aimed for.
const TICK_COUNT: usize = 4;

/// Stroke of the placeholder drawn when there is nothing to plot.
pub const PLACEHOLDER_STROKE: &str = "rgba(255,255,255,0.2)";

// ─── Viewport ────────────────────────────────────────────────────────────────

/// Space reserved around the plot area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
  pub left:   f64,
  pub right:  f64,
  pub top:    f64,
  pub bottom: f64,
}

impl Default for Margins {
  fn default() -> Self { Self { left: 36.0, right: 36.0, top: 18.0, bottom: 18.0 } }
}

/// A drawing region and its margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
  pub width:   f64,
  pub height:  f64,
  pub margins: Margins,
}

impl Viewport {
  /// Region for a single-series chart; zero or non-finite sizes fall back
  /// to 300×120.
  pub fn line(width: f64, height: f64) -> Self { Self::sized(width, height, 300.0, 120.0) }

  /// Region for the overlay chart; zero or non-finite sizes fall back to
  /// 300×160.
  pub fn multi(width: f64, height: f64) -> Self { Self::sized(width, height, 300.0, 160.0) }

  fn sized(width: f64, height: f64, default_width: f64, default_height: f64) -> Self {
    let pick = |v: f64, d: f64| if v.is_finite() && v > 0.0 { v } else { d };
    Self {
      width:   pick(width, default_width),
      height:  pick(height, default_height),
      margins: Margins::default(),
    }
  }

  pub fn plot_left(&self) -> f64 { self.margins.left }

  pub fn plot_right(&self) -> f64 { self.width - self.margins.right }

  pub fn plot_top(&self) -> f64 { self.margins.top }

  /// The baseline the fill closes down to.
  pub fn plot_bottom(&self) -> f64 { self.height - self.margins.bottom }

  /// x of point `index` out of `count` evenly spaced points. A lone point
  /// sits at the left edge.
  pub fn x_at(&self, index: usize, count: usize) -> f64 {
    let denom = count.saturating_sub(1).max(1) as f64;
    self.plot_left() + ((self.plot_right() - self.plot_left()) / denom) * index as f64
  }

  /// y of `value` within `range`; higher values sit higher up.
  pub fn y_at(&self, value: f64, range: &ValueRange) -> f64 {
    scale_value(value, range.min, range.max, self.plot_bottom(), self.plot_top())
  }

  /// Diagonal drawn from bottom-left to top-right when there is no curve.
  pub fn placeholder(&self) -> Segment {
    Segment {
      from:   Point::new(self.plot_left(), self.plot_bottom()),
      to:     Point::new(self.plot_right(), self.plot_top()),
      stroke: PLACEHOLDER_STROKE.to_string(),
    }
  }

  fn ticks(&self, range: &ValueRange) -> Vec<Tick> {
    ticks(range.min, range.max, TICK_COUNT)
      .into_iter()
      .map(|value| Tick {
        value,
        y: self.y_at(value, range),
        label: format!("{}", value.round()),
      })
      .collect()
  }

  fn plot(&self, points: &[ChartPoint], range: &ValueRange) -> Vec<PlotPoint> {
    points
      .iter()
      .enumerate()
      .map(|(i, p)| PlotPoint {
        x:     self.x_at(i, points.len()),
        y:     self.y_at(p.value, range),
        value: p.value,
        label: p.label.clone(),
      })
      .collect()
  }
}

// ─── Shared pieces ───────────────────────────────────────────────────────────

/// An axis tick. Labels are drawn 4px inside both the left and right edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
  pub value: f64,
  pub y:     f64,
  pub label: String,
}

/// A straight stroked segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
  pub from:   Point,
  pub to:     Point,
  pub stroke: String,
}

/// One colour stop of a vertical gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
  pub offset: f64,
  pub color:  String,
}

/// The area under a curve, filled with a vertical gradient running from
/// `top` to `bottom`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
  pub path:   Path,
  pub top:    f64,
  pub bottom: f64,
  pub stops:  [GradientStop; 2],
}

fn points_of(plotted: &[PlotPoint]) -> Vec<Point> {
  plotted.iter().map(|p| Point::new(p.x, p.y)).collect()
}

// ─── Single-series chart ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LineChartOptions {
  pub stroke:     String,
  pub show_axis:  bool,
  pub smoothness: f64,
}

impl Default for LineChartOptions {
  fn default() -> Self {
    Self {
      stroke:     DEFAULT_STROKE.to_string(),
      show_axis:  true,
      smoothness: DEFAULT_SMOOTHNESS,
    }
  }
}

/// What sits inside the plot area of a single-series chart.
#[derive(Debug, Clone, PartialEq)]
pub enum Plot {
  /// Fewer than two points.
  Placeholder(Segment),
  Curve {
    stroke: String,
    points: Vec<PlotPoint>,
    line:   Path,
    fill:   Fill,
  },
}

/// Geometry of a single-series chart with gradient fill.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
  pub viewport: Viewport,
  pub range:    ValueRange,
  /// Empty when the axis is hidden.
  pub ticks:    Vec<Tick>,
  pub plot:     Plot,
}

impl LineChart {
  pub fn layout(points: &[ChartPoint], viewport: Viewport, options: &LineChartOptions) -> Self {
    let range = value_range(points.iter().map(|p| p.value), 0.0, 100.0);
    let ticks = if options.show_axis { viewport.ticks(&range) } else { Vec::new() };

    if points.len() < 2 {
      return Self { viewport, range, ticks, plot: Plot::Placeholder(viewport.placeholder()) };
    }

    let stroke = if options.stroke.trim().is_empty() {
      DEFAULT_STROKE.to_string()
    } else {
      options.stroke.clone()
    };
    let plotted = viewport.plot(points, &range);
    let line = trace_smooth(&points_of(&plotted), options.smoothness);

    let mut area = line.clone();
    area.line_to(Point::new(viewport.plot_right(), viewport.plot_bottom()));
    area.line_to(Point::new(viewport.plot_left(), viewport.plot_bottom()));
    area.close();
    let fill = Fill {
      path:   area,
      top:    viewport.plot_top(),
      bottom: viewport.plot_bottom(),
      stops:  [
        GradientStop { offset: 0.0, color: with_alpha(&stroke, 0.35) },
        GradientStop { offset: 1.0, color: with_alpha(&stroke, 0.05) },
      ],
    };

    Self {
      viewport,
      range,
      ticks,
      plot: Plot::Curve { stroke, points: plotted, line, fill },
    }
  }

  /// Hover targets; empty for a placeholder.
  pub fn targets(&self) -> &[PlotPoint] {
    match &self.plot {
      Plot::Curve { points, .. } => points,
      Plot::Placeholder(_) => &[],
    }
  }
}

// ─── Multi-series chart ──────────────────────────────────────────────────────

/// One stroked line of the overlay chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesLine {
  pub name:   String,
  pub stroke: String,
  pub points: Vec<PlotPoint>,
  pub path:   Path,
}

/// Geometry of the overlay chart: several unfilled lines over one shared
/// value range.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiLineChart {
  pub viewport:    Viewport,
  pub range:       ValueRange,
  pub ticks:       Vec<Tick>,
  pub lines:       Vec<SeriesLine>,
  /// Present when there are no series at all.
  pub placeholder: Option<Segment>,
  /// Every line's points, labelled with the series name.
  pub targets:     Vec<PlotPoint>,
}

impl MultiLineChart {
  /// Each series is spaced across the full width by its own point count;
  /// empty series are skipped.
  pub fn layout(series: &[Series], viewport: Viewport, smoothness: f64) -> Self {
    let range = value_range(
      series.iter().flat_map(|s| s.points.iter().map(|p| p.value)),
      0.0,
      100.0,
    );
    let ticks = viewport.ticks(&range);

    if series.is_empty() {
      return Self {
        viewport,
        range,
        ticks,
        lines: Vec::new(),
        placeholder: Some(viewport.placeholder()),
        targets: Vec::new(),
      };
    }

    let mut lines = Vec::new();
    let mut targets = Vec::new();
    for s in series.iter().filter(|s| !s.points.is_empty()) {
      let mut plotted = viewport.plot(&s.points, &range);
      for p in &mut plotted {
        p.label = if p.label.is_empty() {
          s.name.clone()
        } else {
          format!("{}: {}", s.name, p.label)
        };
      }
      let path = trace_smooth(&points_of(&plotted), smoothness);
      targets.extend(plotted.iter().cloned());
      lines.push(SeriesLine {
        name: s.name.clone(),
        stroke: if s.color.trim().is_empty() {
          DEFAULT_STROKE.to_string()
        } else {
          s.color.clone()
        },
        points: plotted,
        path,
      });
    }

    Self { viewport, range, ticks, lines, placeholder: None, targets }
  }
}
