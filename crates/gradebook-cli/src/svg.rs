//! SVG export of chart geometry.
//!
//! Documents are generated with `quick-xml`'s writer, which escapes every
//! attribute value and text node.

use gradebook_core::chart::{
  Fill, LineChart, MultiLineChart, Plot, Segment, Tick, Viewport, tooltip,
};
use quick_xml::{
  Writer,
  events::{BytesEnd, BytesStart, BytesText, Event},
};

const NS_SVG: &str = "http://www.w3.org/2000/svg";
const AXIS_COLOR: &str = "#7a8292";
const FONT_FAMILY: &str = "system-ui, sans-serif";
const FONT_SIZE: &str = "11";

type SvgWriter = Writer<Vec<u8>>;

/// Standalone document for a single-series chart.
pub fn line_chart(chart: &LineChart) -> anyhow::Result<String> {
  let mut w = open(&chart.viewport)?;
  match &chart.plot {
    Plot::Placeholder(segment) => {
      axis(&mut w, &chart.viewport, &chart.ticks)?;
      segment_line(&mut w, segment)?;
    }
    Plot::Curve { stroke, points, line, fill } => {
      gradient(&mut w, fill)?;
      axis(&mut w, &chart.viewport, &chart.ticks)?;
      let area = fill.path.to_svg_data();
      let curve = line.to_svg_data();
      empty(&mut w, "path", &[
        ("d", area.as_str()),
        ("fill", "url(#area)"),
        ("stroke", "none"),
      ])?;
      empty(&mut w, "path", &[
        ("d", curve.as_str()),
        ("fill", "none"),
        ("stroke", stroke.as_str()),
        ("stroke-width", "2.5"),
        ("stroke-linecap", "round"),
      ])?;
      for p in points {
        let (cx, cy) = (coord(p.x), coord(p.y));
        start(&mut w, "circle", &[
          ("cx", cx.as_str()),
          ("cy", cy.as_str()),
          ("r", "3"),
          ("fill", stroke.as_str()),
        ])?;
        text_element(&mut w, "title", &[], &tooltip(p))?;
        end(&mut w, "circle")?;
      }
    }
  }
  close(w)
}

/// Standalone document for the multi-subject overlay.
pub fn multi_line_chart(chart: &MultiLineChart) -> anyhow::Result<String> {
  let mut w = open(&chart.viewport)?;
  axis(&mut w, &chart.viewport, &chart.ticks)?;
  if let Some(segment) = &chart.placeholder {
    segment_line(&mut w, segment)?;
  }
  for line in &chart.lines {
    let d = line.path.to_svg_data();
    start(&mut w, "path", &[
      ("d", d.as_str()),
      ("fill", "none"),
      ("stroke", line.stroke.as_str()),
      ("stroke-width", "2"),
      ("stroke-linecap", "round"),
    ])?;
    text_element(&mut w, "title", &[], &line.name)?;
    end(&mut w, "path")?;
  }
  close(w)
}

// ─── Pieces ──────────────────────────────────────────────────────────────────

fn coord(value: f64) -> String { format!("{value:.2}") }

fn open(viewport: &Viewport) -> anyhow::Result<SvgWriter> {
  let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
  let (width, height) = (viewport.width.to_string(), viewport.height.to_string());
  let view_box = format!("0 0 {width} {height}");
  start(&mut w, "svg", &[
    ("xmlns", NS_SVG),
    ("width", width.as_str()),
    ("height", height.as_str()),
    ("viewBox", view_box.as_str()),
  ])?;
  Ok(w)
}

fn close(mut w: SvgWriter) -> anyhow::Result<String> {
  end(&mut w, "svg")?;
  let mut document = String::from_utf8(w.into_inner())?;
  document.push('\n');
  Ok(document)
}

fn gradient(w: &mut SvgWriter, fill: &Fill) -> anyhow::Result<()> {
  let (top, bottom) = (coord(fill.top), coord(fill.bottom));
  start(w, "defs", &[])?;
  start(w, "linearGradient", &[
    ("id", "area"),
    ("gradientUnits", "userSpaceOnUse"),
    ("x1", "0"),
    ("y1", top.as_str()),
    ("x2", "0"),
    ("y2", bottom.as_str()),
  ])?;
  for stop in &fill.stops {
    let offset = stop.offset.to_string();
    empty(w, "stop", &[("offset", offset.as_str()), ("stop-color", stop.color.as_str())])?;
  }
  end(w, "linearGradient")?;
  end(w, "defs")
}

/// Tick labels at both edges, vertically centred on the tick.
fn axis(w: &mut SvgWriter, viewport: &Viewport, ticks: &[Tick]) -> anyhow::Result<()> {
  let right = coord(viewport.width - 4.0);
  for tick in ticks {
    let y = coord(tick.y);
    let label = [
      ("y", y.as_str()),
      ("fill", AXIS_COLOR),
      ("font-family", FONT_FAMILY),
      ("font-size", FONT_SIZE),
      ("dominant-baseline", "middle"),
    ];
    let mut left_attrs = vec![("x", "4")];
    left_attrs.extend(label);
    text_element(w, "text", &left_attrs, &tick.label)?;
    let mut right_attrs = vec![("x", right.as_str())];
    right_attrs.extend(label);
    right_attrs.push(("text-anchor", "end"));
    text_element(w, "text", &right_attrs, &tick.label)?;
  }
  Ok(())
}

fn segment_line(w: &mut SvgWriter, segment: &Segment) -> anyhow::Result<()> {
  let (x1, y1) = (coord(segment.from.x), coord(segment.from.y));
  let (x2, y2) = (coord(segment.to.x), coord(segment.to.y));
  empty(w, "line", &[
    ("x1", x1.as_str()),
    ("y1", y1.as_str()),
    ("x2", x2.as_str()),
    ("y2", y2.as_str()),
    ("stroke", segment.stroke.as_str()),
    ("stroke-width", "2"),
  ])
}

// ── Writer helpers ──

fn element<'a>(name: &'a str, attrs: &[(&str, &str)]) -> BytesStart<'a> {
  BytesStart::new(name).with_attributes(attrs.iter().copied())
}

fn start(w: &mut SvgWriter, name: &str, attrs: &[(&str, &str)]) -> anyhow::Result<()> {
  w.write_event(Event::Start(element(name, attrs)))?;
  Ok(())
}

fn end(w: &mut SvgWriter, name: &str) -> anyhow::Result<()> {
  w.write_event(Event::End(BytesEnd::new(name)))?;
  Ok(())
}

fn empty(w: &mut SvgWriter, name: &str, attrs: &[(&str, &str)]) -> anyhow::Result<()> {
  w.write_event(Event::Empty(element(name, attrs)))?;
  Ok(())
}

fn text_element(
  w: &mut SvgWriter,
  name: &str,
  attrs: &[(&str, &str)],
  text: &str,
) -> anyhow::Result<()> {
  start(w, name, attrs)?;
  w.write_event(Event::Text(BytesText::new(text)))?;
  end(w, name)
}
