//! Chart geometry engine.
//!
//! Everything here is surface-independent: callers get value ranges, tick
//! positions, path commands and hit targets, and draw them however their
//! surface draws (SVG, a terminal canvas, ...). Nothing in this module keeps
//! state between calls.

pub mod color;
pub mod hover;
pub mod layout;
pub mod path;
pub mod scale;

pub use color::{parse_color, with_alpha};
pub use hover::{PlotPoint, nearest, tooltip};
pub use layout::{
  Fill, GradientStop, LineChart, LineChartOptions, Margins, MultiLineChart, Plot,
  Segment, SeriesLine, Tick, Viewport,
};
pub use path::{Path, PathCommand, trace_smooth};
pub use scale::{ValueRange, scale_value, ticks, value_range};

/// Default curve smoothness.
pub const DEFAULT_SMOOTHNESS: f64 = 0.35;

/// Default stroke when a series has no colour of its own.
pub const DEFAULT_STROKE: &str = "#2aa9ff";

/// A position on the drawing surface, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

/// One data value with its hover label.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
  pub value: f64,
  pub label: String,
}

impl ChartPoint {
  pub fn new(value: f64, label: impl Into<String>) -> Self {
    Self { value, label: label.into() }
  }
}

/// A named, coloured sequence of points for the overlay chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
  pub name:   String,
  pub color:  String,
  pub points: Vec<ChartPoint>,
}

/// Clamp a smoothness setting into `[0, 1]`; non-finite input falls back to
/// the default.
pub fn clamp_smoothness(value: f64) -> f64 {
  if value.is_finite() {
    value.clamp(0.0, 1.0)
  } else {
    DEFAULT_SMOOTHNESS
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn smoothness_is_clamped() {
    assert_eq!(clamp_smoothness(-1.0), 0.0);
    assert_eq!(clamp_smoothness(2.0), 1.0);
    assert_eq!(clamp_smoothness(0.5), 0.5);
    assert_eq!(clamp_smoothness(f64::NAN), DEFAULT_SMOOTHNESS);
  }
}
