//! Value-range autoscaling and tick generation.

/// Vertical extent of a plot in data units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
  pub min:     f64,
  pub max:     f64,
  /// Whether the bounds were snapped to multiples of five. When the snapped
  /// span would fall below ten the padded bounds are kept instead.
  pub snapped: bool,
}

impl ValueRange {
  pub fn span(&self) -> f64 { self.max - self.min }
}

impl Default for ValueRange {
  fn default() -> Self { Self { min: 0.0, max: 100.0, snapped: true } }
}

/// Autoscale a range around `values`.
///
/// Non-finite values are ignored; with none left the range is `0..100`. A
/// single repeated value is widened by 5 each way. The extent is padded by
/// `max(10, 20%)` each side, clamped to `clamp_min..clamp_max` (non-finite
/// clamps fall back to 0 and 100), then shrunk to the multiples of five it
/// contains if those still span at least 10.
pub fn value_range<I>(values: I, clamp_min: f64, clamp_max: f64) -> ValueRange
where
  I: IntoIterator<Item = f64>,
{
  let mut extent: Option<(f64, f64)> = None;
  for v in values.into_iter().filter(|v| v.is_finite()) {
    extent = Some(match extent {
      Some((lo, hi)) => (lo.min(v), hi.max(v)),
      None => (v, v),
    });
  }
  let Some((mut lo, mut hi)) = extent else {
    return ValueRange::default();
  };

  if lo == hi {
    lo -= 5.0;
    hi += 5.0;
  }
  let range = (hi - lo).max(1.0);
  let padding = (range * 0.2).max(10.0);
  let clamp_min = if clamp_min.is_finite() { clamp_min } else { 0.0 };
  let clamp_max = if clamp_max.is_finite() { clamp_max } else { 100.0 };

  let min = clamp_min.max(lo - padding);
  let mut max = clamp_max.min(hi + padding);
  if max - min < 1.0 {
    max = min + 1.0;
  }

  let tick_min = (min / 5.0).ceil() * 5.0;
  let tick_max = (max / 5.0).floor() * 5.0;
  if tick_max - tick_min >= 10.0 {
    ValueRange { min: tick_min, max: tick_max, snapped: true }
  } else {
    ValueRange { min, max, snapped: false }
  }
}

/// Axis tick values between `min` and `max`, as multiples of five.
///
/// The bounds are widened to multiples of five and the step is the smallest
/// multiple of five giving at most about `desired` intervals. Degenerate
/// input yields the quartiles of `0..100`.
pub fn ticks(min: f64, max: f64, desired: usize) -> Vec<f64> {
  if !min.is_finite() || !max.is_finite() || min == max {
    return vec![0.0, 25.0, 50.0, 75.0, 100.0];
  }
  let rounded_min = (min / 5.0).floor() * 5.0;
  let rounded_max = (max / 5.0).ceil() * 5.0;
  let range = (rounded_max - rounded_min).max(5.0);
  let desired = desired.max(1) as f64;
  let step = (range / (desired * 5.0)).ceil().max(1.0) * 5.0;

  let mut out = Vec::new();
  let mut value = rounded_min;
  let mut i = 0u32;
  while value <= rounded_max + 1e-4 {
    out.push(value);
    i += 1;
    value = rounded_min + step * f64::from(i);
  }
  if out.is_empty() {
    out = vec![rounded_min, rounded_max];
  }
  out
}

/// Linear map of `value` from `min..max` onto `start..end`. Degenerate input
/// maps to the midpoint.
pub fn scale_value(value: f64, min: f64, max: f64, start: f64, end: f64) -> f64 {
  if !value.is_finite() || min == max {
    return (start + end) / 2.0;
  }
  start + ((value - min) / (max - min)) * (end - start)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_input_is_full_scale() {
    let r = value_range(Vec::<f64>::new(), 0.0, 100.0);
    assert_eq!((r.min, r.max), (0.0, 100.0));
    let r = value_range(vec![f64::NAN, f64::INFINITY], 0.0, 100.0);
    assert_eq!((r.min, r.max), (0.0, 100.0));
  }

  #[test]
  fn single_point_is_padded_and_snapped() {
    let r = value_range(vec![70.0], 0.0, 100.0);
    assert_eq!((r.min, r.max), (55.0, 85.0));
    assert!(r.snapped);
    assert!(r.span() >= 10.0);
  }

  #[test]
  fn wide_range_uses_twenty_percent_padding() {
    // 20..80 spans 60, padding 12 → 8..92 → snapped 10..90.
    let r = value_range(vec![20.0, 80.0], 0.0, 100.0);
    assert_eq!((r.min, r.max), (10.0, 90.0));
  }

  #[test]
  fn clamps_to_caller_bounds() {
    let r = value_range(vec![2.0, 98.0], 0.0, 100.0);
    assert_eq!((r.min, r.max), (0.0, 100.0));
    let r = value_range(vec![100.0], 0.0, 100.0);
    assert_eq!((r.min, r.max), (85.0, 100.0));
  }

  #[test]
  fn out_of_bounds_values_keep_padded_range() {
    // A score above its total: 150 → 135..165, clamped to 135..100, widened
    // to 135..136. No multiples of five span 10, so the padded bounds stay.
    let r = value_range(vec![150.0], 0.0, 100.0);
    assert!(!r.snapped);
    assert_eq!((r.min, r.max), (135.0, 136.0));
  }

  #[test]
  fn non_finite_clamps_fall_back() {
    let r = value_range(vec![50.0], f64::NAN, f64::NAN);
    assert_eq!((r.min, r.max), (35.0, 65.0));
  }

  #[test]
  fn ticks_full_scale() {
    assert_eq!(ticks(0.0, 100.0, 4), [0.0, 25.0, 50.0, 75.0, 100.0]);
  }

  #[test]
  fn ticks_narrow_range() {
    assert_eq!(ticks(55.0, 85.0, 4), [55.0, 65.0, 75.0, 85.0]);
    assert_eq!(ticks(52.0, 63.0, 4), [50.0, 55.0, 60.0, 65.0]);
  }

  #[test]
  fn ticks_are_multiples_of_five() {
    for t in ticks(13.0, 87.0, 4) {
      assert_eq!(t % 5.0, 0.0);
    }
  }

  #[test]
  fn degenerate_ticks() {
    assert_eq!(ticks(50.0, 50.0, 4), [0.0, 25.0, 50.0, 75.0, 100.0]);
    assert_eq!(ticks(f64::NAN, 50.0, 4), [0.0, 25.0, 50.0, 75.0, 100.0]);
    assert_eq!(ticks(0.0, 100.0, 0), ticks(0.0, 100.0, 1));
  }

  #[test]
  fn scale_value_maps_linearly() {
    assert_eq!(scale_value(50.0, 0.0, 100.0, 0.0, 200.0), 100.0);
    assert_eq!(scale_value(50.0, 10.0, 10.0, 0.0, 200.0), 100.0);
    assert_eq!(scale_value(f64::NAN, 0.0, 100.0, 0.0, 200.0), 100.0);
  }
}
