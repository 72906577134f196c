//! Hit targets and nearest-point lookup for hover tooltips.

use crate::format::fixed1;

/// A plotted point the pointer can land on.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
  pub x:     f64,
  pub y:     f64,
  pub value: f64,
  pub label: String,
}

/// The point whose x is closest to `x`. Linear scan; on an exact tie the
/// earlier point wins.
pub fn nearest(points: &[PlotPoint], x: f64) -> Option<&PlotPoint> {
  let mut iter = points.iter();
  let mut best = iter.next()?;
  for point in iter {
    if (point.x - x).abs() < (best.x - x).abs() {
      best = point;
    }
  }
  Some(best)
}

/// Tooltip text: `"label · 82.5%"`, or just the value without a label.
pub fn tooltip(point: &PlotPoint) -> String {
  if point.label.is_empty() {
    format!("{}%", fixed1(point.value))
  } else {
    format!("{} · {}%", point.label, fixed1(point.value))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn at(x: f64, label: &str) -> PlotPoint {
    PlotPoint { x, y: 0.0, value: 82.25, label: label.into() }
  }

  #[test]
  fn picks_closest_x() {
    let points = [at(10.0, "a"), at(50.0, "b"), at(90.0, "c")];
    assert_eq!(nearest(&points, 60.0).unwrap().label, "b");
    assert_eq!(nearest(&points, -100.0).unwrap().label, "a");
    assert_eq!(nearest(&points, 1000.0).unwrap().label, "c");
  }

  #[test]
  fn exact_tie_keeps_first() {
    let points = [at(10.0, "a"), at(30.0, "b")];
    assert_eq!(nearest(&points, 20.0).unwrap().label, "a");
    let stacked = [at(10.0, "first"), at(10.0, "second")];
    assert_eq!(nearest(&stacked, 10.0).unwrap().label, "first");
  }

  #[test]
  fn empty_has_no_target() {
    assert!(nearest(&[], 5.0).is_none());
  }

  #[test]
  fn tooltip_text() {
    assert_eq!(tooltip(&at(0.0, "Quiz 1")), "Quiz 1 · 82.3%");
    assert_eq!(tooltip(&at(0.0, "")), "82.3%");
  }
}
