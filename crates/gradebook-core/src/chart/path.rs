//! Path commands and the smoothed curve tracer.

use std::fmt::Write as _;

use super::{Point, clamp_smoothness};

/// One drawing instruction, in the vocabulary shared by canvas and SVG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
  MoveTo(Point),
  LineTo(Point),
  CubicTo { c1: Point, c2: Point, to: Point },
  Close,
}

/// An ordered list of path commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
  commands: Vec<PathCommand>,
}

impl Path {
  pub fn new() -> Self { Self::default() }

  pub fn commands(&self) -> &[PathCommand] { &self.commands }

  pub fn is_empty(&self) -> bool { self.commands.is_empty() }

  pub fn move_to(&mut self, p: Point) { self.commands.push(PathCommand::MoveTo(p)); }

  pub fn line_to(&mut self, p: Point) { self.commands.push(PathCommand::LineTo(p)); }

  pub fn cubic_to(&mut self, c1: Point, c2: Point, to: Point) {
    self.commands.push(PathCommand::CubicTo { c1, c2, to });
  }

  pub fn close(&mut self) { self.commands.push(PathCommand::Close); }

  /// SVG path data (`d` attribute), two decimals per coordinate.
  pub fn to_svg_data(&self) -> String {
    let mut out = String::new();
    for command in &self.commands {
      if !out.is_empty() {
        out.push(' ');
      }
      // Writing into a String cannot fail.
      let _ = match command {
        PathCommand::MoveTo(p) => write!(out, "M{:.2},{:.2}", p.x, p.y),
        PathCommand::LineTo(p) => write!(out, "L{:.2},{:.2}", p.x, p.y),
        PathCommand::CubicTo { c1, c2, to } => write!(
          out,
          "C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
          c1.x, c1.y, c2.x, c2.y, to.x, to.y
        ),
        PathCommand::Close => write!(out, "Z"),
      };
    }
    out
  }

  /// Approximate the path with straight polylines, sampling each cubic at
  /// `steps` points. One polyline per subpath.
  pub fn flatten(&self, steps: usize) -> Vec<Vec<Point>> {
    let steps = steps.max(1);
    let mut lines: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut start: Option<Point> = None;

    for command in &self.commands {
      match *command {
        PathCommand::MoveTo(p) => {
          if current.len() > 1 {
            lines.push(std::mem::take(&mut current));
          }
          current.clear();
          current.push(p);
          start = Some(p);
        }
        PathCommand::LineTo(p) => current.push(p),
        PathCommand::CubicTo { c1, c2, to } => {
          let Some(&from) = current.last() else {
            current.push(to);
            continue;
          };
          for i in 1..=steps {
            let t = i as f64 / steps as f64;
            current.push(cubic_point(from, c1, c2, to, t));
          }
        }
        PathCommand::Close => {
          if let Some(s) = start {
            current.push(s);
          }
        }
      }
    }
    if current.len() > 1 {
      lines.push(current);
    }
    lines
  }
}

fn cubic_point(p0: Point, c1: Point, c2: Point, p3: Point, t: f64) -> Point {
  let u = 1.0 - t;
  let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
  Point::new(
    a * p0.x + b * c1.x + c * c2.x + d * p3.x,
    a * p0.y + b * c1.y + c * c2.y + d * p3.y,
  )
}

/// Trace a curve through `points`.
///
/// `smoothness` is clamped to `[0, 1]`; 0 gives straight segments. Otherwise
/// each segment `p1 → p2` is a cubic whose control points follow the
/// Catmull-Rom tangents `(p2 - p0)` and `(p3 - p1)` scaled by
/// `smoothness / 6`, with neighbours clamped at the ends of the sequence.
pub fn trace_smooth(points: &[Point], smoothness: f64) -> Path {
  let mut path = Path::new();
  let Some(&first) = points.first() else {
    return path;
  };
  path.move_to(first);
  if points.len() < 2 {
    return path;
  }

  let s = clamp_smoothness(smoothness);
  if s == 0.0 {
    for &p in &points[1..] {
      path.line_to(p);
    }
    return path;
  }

  let factor = s / 6.0;
  for i in 0..points.len() - 1 {
    let p0 = points[i.saturating_sub(1)];
    let p1 = points[i];
    let p2 = points[i + 1];
    let p3 = *points.get(i + 2).unwrap_or(&p2);
    let c1 = Point::new(p1.x + (p2.x - p0.x) * factor, p1.y + (p2.y - p0.y) * factor);
    let c2 = Point::new(p2.x - (p3.x - p1.x) * factor, p2.y - (p3.y - p1.y) * factor);
    path.cubic_to(c1, c2, p2);
  }
  path
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pts() -> Vec<Point> {
    vec![
      Point::new(0.0, 0.0),
      Point::new(6.0, 6.0),
      Point::new(12.0, 0.0),
    ]
  }

  #[test]
  fn empty_and_single_point() {
    assert!(trace_smooth(&[], 0.35).is_empty());
    let single = trace_smooth(&[Point::new(1.0, 2.0)], 0.35);
    assert_eq!(single.commands(), [PathCommand::MoveTo(Point::new(1.0, 2.0))]);
  }

  #[test]
  fn zero_smoothness_is_straight() {
    let path = trace_smooth(&pts(), 0.0);
    assert_eq!(
      path.commands(),
      [
        PathCommand::MoveTo(Point::new(0.0, 0.0)),
        PathCommand::LineTo(Point::new(6.0, 6.0)),
        PathCommand::LineTo(Point::new(12.0, 0.0)),
      ]
    );
  }

  #[test]
  fn control_points_follow_neighbours() {
    let path = trace_smooth(&pts(), 0.6);
    // factor = 0.1
    let cmds = path.commands();
    assert_eq!(cmds.len(), 3);
    // First segment: p0 clamps to p1 = (0,0); p3 = (12,0).
    let PathCommand::CubicTo { c1, c2, to } = cmds[1] else {
      panic!("expected cubic");
    };
    assert!((c1.x - 0.6).abs() < 1e-9 && (c1.y - 0.6).abs() < 1e-9);
    assert!((c2.x - 4.8).abs() < 1e-9 && (c2.y - 6.0).abs() < 1e-9);
    assert_eq!(to, Point::new(6.0, 6.0));
    // Last segment: p3 clamps to p2 = (12,0).
    let PathCommand::CubicTo { c1, c2, .. } = cmds[2] else {
      panic!("expected cubic");
    };
    assert!((c1.x - 7.2).abs() < 1e-9 && (c1.y - 6.0).abs() < 1e-9);
    assert!((c2.x - 11.4).abs() < 1e-9 && (c2.y - 0.6).abs() < 1e-9);
  }

  #[test]
  fn smoothness_above_one_is_clamped() {
    assert_eq!(trace_smooth(&pts(), 5.0), trace_smooth(&pts(), 1.0));
  }

  #[test]
  fn svg_data() {
    let mut path = trace_smooth(&pts(), 0.0);
    path.close();
    assert_eq!(path.to_svg_data(), "M0.00,0.00 L6.00,6.00 L12.00,0.00 Z");
  }

  #[test]
  fn flatten_samples_cubics_and_hits_endpoints() {
    let path = trace_smooth(&pts(), 0.35);
    let lines = path.flatten(8);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].len(), 1 + 2 * 8);
    let last = *lines[0].last().unwrap();
    assert!((last.x - 12.0).abs() < 1e-9 && last.y.abs() < 1e-9);
  }
}
