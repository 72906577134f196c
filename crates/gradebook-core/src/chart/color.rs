//! Colour string helpers.

/// Re-express `color` as `rgba(r, g, b, alpha)`.
///
/// Accepts `#rgb`, `#rrggbb`, `rgb(...)` and `rgba(...)`. An empty string
/// becomes transparent-capable black; anything else is returned unchanged.
pub fn with_alpha(color: &str, alpha: f64) -> String {
  let value = color.trim();
  if value.is_empty() {
    return format!("rgba(0, 0, 0, {alpha})");
  }
  if value.starts_with("rgb")
    && let Some([r, g, b]) = functional_channels(value)
  {
    return format!("rgba({r}, {g}, {b}, {alpha})");
  }
  if let Some([r, g, b]) = hex_channels(value) {
    return format!("rgba({r}, {g}, {b}, {alpha})");
  }
  value.to_string()
}

/// Parse a colour into 8-bit channels, for surfaces that need raw RGB.
pub fn parse_color(color: &str) -> Option<(u8, u8, u8)> {
  let value = color.trim();
  if let Some([r, g, b]) = hex_channels(value) {
    return Some((r, g, b));
  }
  let [r, g, b] = functional_channels(value)?;
  let to_u8 = |c: f64| c.round().clamp(0.0, 255.0) as u8;
  Some((to_u8(r), to_u8(g), to_u8(b)))
}

fn hex_channels(value: &str) -> Option<[u8; 3]> {
  let hex = value.strip_prefix('#')?;
  let expanded: String = match hex.len() {
    3 => hex.chars().flat_map(|c| [c, c]).collect(),
    6 => hex.to_string(),
    _ => return None,
  };
  let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
  Some([channel(0)?, channel(2)?, channel(4)?])
}

fn functional_channels(value: &str) -> Option<[f64; 3]> {
  let inner = value
    .strip_prefix("rgba(")
    .or_else(|| value.strip_prefix("rgb("))?
    .trim_end()
    .trim_end_matches(')');
  let parts: Vec<f64> = inner
    .split(',')
    .map(|p| p.trim().parse::<f64>())
    .collect::<Result<_, _>>()
    .ok()?;
  match parts.as_slice() {
    [r, g, b, ..] => Some([*r, *g, *b]),
    _ => None,
  }
}
