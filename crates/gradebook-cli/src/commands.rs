//! One-shot subcommands: mutations, text reports and chart export.

use std::{io::Write, path::PathBuf};

use anyhow::{Context as _, bail};
use clap::{Args, Subcommand};
use gradebook_core::{
  calendar::{MonthCursor, MonthGrid, index_events},
  chart::{LineChart, LineChartOptions, MultiLineChart, Viewport, clamp_smoothness},
  format::{self, fixed1},
  record::{NewAssessment, NewUpcoming},
  report::{
    DIGEST_LIMIT, Overview, UpcomingDigest, assessment_table, insights, subject_cards,
    subject_history, upcoming_digest,
  },
  stats::{overall_trend, subject_series, subject_trend},
  store::{Gradebook, Persistence},
};
use tracing::info;

use crate::{settings::Settings, svg};

// ─── Arguments ────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Add, remove or recolour subjects.
  #[command(subcommand)]
  Subject(SubjectCommand),

  /// Record or remove marked assessments.
  #[command(subcommand)]
  Assessment(AssessmentCommand),

  /// Schedule or remove upcoming assessments.
  #[command(subcommand)]
  Upcoming(UpcomingCommand),

  /// Overall average, insights, subject cards and what is due next.
  Overview,

  /// Assessments, newest first.
  List {
    /// Only this subject.
    #[arg(long)]
    subject: Option<String>,
  },

  /// Month grid of upcoming assessments.
  Calendar {
    /// Month to show (default: the current month).
    #[arg(long, value_name = "YYYY-MM")]
    month: Option<String>,
  },

  /// Export a trend chart as SVG.
  Chart(ChartArgs),

  /// Show or set the curve smoothness (0 to 1).
  Smoothness { value: Option<f64> },

  /// Delete every subject, assessment and upcoming item.
  Reset {
    /// Confirm the reset.
    #[arg(long)]
    yes: bool,
  },

  /// Interactive dashboard (the default).
  Tui,
}

#[derive(Subcommand, Debug)]
pub enum SubjectCommand {
  /// List subjects with their averages.
  List,
  Add { name: String },
  /// Remove a subject together with its assessments and upcoming items.
  Rm { name: String },
  /// Change a subject's display colour.
  Color { name: String, color: String },
}

#[derive(Subcommand, Debug)]
pub enum AssessmentCommand {
  Add {
    subject: String,
    name:    String,
    score:   f64,
    total:   f64,
    #[arg(long)]
    weight:  Option<f64>,
    /// Defaults to today.
    #[arg(long, value_name = "YYYY-MM-DD")]
    date:    Option<String>,
    /// Create the subject if it does not exist.
    #[arg(long)]
    create:  bool,
  },
  /// Remove by id or unique id prefix.
  Rm { subject: String, id: String },
}

#[derive(Subcommand, Debug)]
pub enum UpcomingCommand {
  /// Soonest first.
  List {
    /// Show everything instead of the first few.
    #[arg(long)]
    all: bool,
  },
  Add {
    subject: String,
    name:    String,
    #[arg(value_name = "YYYY-MM-DD")]
    date:    String,
    #[arg(long)]
    notes:   Option<String>,
  },
  /// Remove by id or unique id prefix.
  Rm { subject: String, id: String },
}

#[derive(Args, Debug)]
pub struct ChartArgs {
  #[command(subcommand)]
  pub kind:       ChartKind,
  /// Output file (default: stdout).
  #[arg(short, long, global = true, value_name = "FILE")]
  pub out:        Option<PathBuf>,
  #[arg(long, global = true)]
  pub width:      Option<f64>,
  #[arg(long, global = true)]
  pub height:     Option<f64>,
  #[arg(long, global = true)]
  pub smoothness: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum ChartKind {
  /// Running weighted average across every subject.
  Overall,
  /// One line per subject.
  Subjects,
  /// A single subject's percentages.
  Subject { name: String },
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

/// Run a one-shot command. `Tui` is handled by the caller.
pub fn run<P: Persistence>(
  book: &mut Gradebook<P>,
  settings: &Settings,
  command: Command,
  out: &mut dyn Write,
) -> anyhow::Result<()> {
  match command {
    Command::Subject(cmd) => subject(book, cmd, out),
    Command::Assessment(cmd) => assessment(book, cmd, out),
    Command::Upcoming(cmd) => upcoming(book, cmd, out),
    Command::Overview => overview(book, out),
    Command::List { subject } => list(book, subject.as_deref(), out),
    Command::Calendar { month } => calendar(book, month.as_deref(), out),
    Command::Chart(args) => chart(book, settings, args, out),
    Command::Smoothness { value } => {
      let value = match value {
        Some(v) => book.set_smoothness(v)?,
        None => book.smoothness(),
      };
      writeln!(out, "{value}")?;
      Ok(())
    }
    Command::Reset { yes } => {
      if !yes {
        bail!("refusing to reset without --yes");
      }
      book.reset()?;
      writeln!(out, "All data cleared.")?;
      Ok(())
    }
    Command::Tui => bail!("the dashboard needs a terminal"),
  }
}

// ─── Lookups ──────────────────────────────────────────────────────────────────

fn subject_id<P: Persistence>(book: &Gradebook<P>, name: &str) -> anyhow::Result<String> {
  match book.find_subject_by_name(name) {
    Some(subject) => Ok(subject.id.clone()),
    None => bail!("no subject named {name:?}"),
  }
}

/// Resolve an exact id or a prefix matching exactly one id.
fn resolve_id<'a>(ids: impl IntoIterator<Item = &'a str>, wanted: &str) -> anyhow::Result<String> {
  let ids: Vec<&str> = ids.into_iter().collect();
  if ids.contains(&wanted) {
    return Ok(wanted.to_string());
  }
  let matches: Vec<&str> = ids.into_iter().filter(|id| id.starts_with(wanted)).collect();
  match matches.as_slice() {
    [id] => Ok(id.to_string()),
    [] => bail!("no record with id {wanted:?}"),
    _ => bail!("id prefix {wanted:?} is ambiguous"),
  }
}

/// First eight characters of an id.
pub fn short_id(id: &str) -> String { id.chars().take(8).collect() }

// ─── Mutations ────────────────────────────────────────────────────────────────

fn subject<P: Persistence>(
  book: &mut Gradebook<P>,
  cmd: SubjectCommand,
  out: &mut dyn Write,
) -> anyhow::Result<()> {
  match cmd {
    SubjectCommand::List => {
      for card in subject_cards(book.data()) {
        writeln!(out, "{:<3} {:<24} {}", card.initials, card.name, card.summary())?;
      }
    }
    SubjectCommand::Add { name } => {
      let subject = book.add_subject(&name)?;
      info!(name = %subject.name, "subject added");
      writeln!(out, "Subject added: {} ({})", subject.name, subject.color)?;
    }
    SubjectCommand::Rm { name } => {
      let id = subject_id(book, &name)?;
      let removed = book.delete_subject(&id)?;
      writeln!(
        out,
        "Removed {} with {} assessments and {} upcoming items.",
        removed.name,
        removed.assessments.len(),
        removed.upcoming.len()
      )?;
    }
    SubjectCommand::Color { name, color } => {
      let id = subject_id(book, &name)?;
      if book.set_subject_color(&id, &color)? {
        writeln!(out, "{} is now {}.", name.trim(), color.trim())?;
      } else {
        writeln!(out, "{} already uses {}.", name.trim(), color.trim())?;
      }
    }
  }
  Ok(())
}

fn assessment<P: Persistence>(
  book: &mut Gradebook<P>,
  cmd: AssessmentCommand,
  out: &mut dyn Write,
) -> anyhow::Result<()> {
  match cmd {
    AssessmentCommand::Add { subject, name, score, total, weight, date, create } => {
      let id = if create {
        book.get_or_create_subject(&subject)?.id
      } else {
        subject_id(book, &subject)?
      };
      let mut input = NewAssessment::new(name, score, total);
      input.weight = weight;
      input.date = date;
      let added = book.add_assessment(&id, input)?;
      let percentage = if added.total > 0.0 { added.score / added.total * 100.0 } else { 0.0 };
      writeln!(
        out,
        "Added {} [{}]: {}%",
        added.name,
        short_id(&added.id),
        fixed1(percentage)
      )?;
    }
    AssessmentCommand::Rm { subject, id } => {
      let subject_id = subject_id(book, &subject)?;
      let ids = book
        .find_subject(&subject_id)
        .map(|s| s.assessments.iter().map(|a| a.id.clone()).collect::<Vec<_>>())
        .unwrap_or_default();
      let id = resolve_id(ids.iter().map(String::as_str), &id)?;
      let removed = book.remove_assessment(&subject_id, &id)?;
      writeln!(out, "Removed {}.", removed.name)?;
    }
  }
  Ok(())
}

fn upcoming<P: Persistence>(
  book: &mut Gradebook<P>,
  cmd: UpcomingCommand,
  out: &mut dyn Write,
) -> anyhow::Result<()> {
  match cmd {
    UpcomingCommand::List { all } => {
      let limit = if all { usize::MAX } else { DIGEST_LIMIT };
      write_digest(&upcoming_digest(book.data(), book.today(), limit), out)?;
    }
    UpcomingCommand::Add { subject, name, date, notes } => {
      let id = subject_id(book, &subject)?;
      let mut input = NewUpcoming::new(name, date);
      if let Some(notes) = notes {
        input = input.notes(notes);
      }
      let item = book.add_upcoming(&id, input)?;
      writeln!(
        out,
        "Scheduled {} [{}] for {}.",
        item.name,
        short_id(&item.id),
        format::short_date(&item.date)
      )?;
    }
    UpcomingCommand::Rm { subject, id } => {
      let subject_id = subject_id(book, &subject)?;
      let ids = book
        .find_subject(&subject_id)
        .map(|s| s.upcoming.iter().map(|u| u.id.clone()).collect::<Vec<_>>())
        .unwrap_or_default();
      let id = resolve_id(ids.iter().map(String::as_str), &id)?;
      let removed = book.remove_upcoming(&subject_id, &id)?;
      writeln!(out, "Removed {}.", removed.name)?;
    }
  }
  Ok(())
}

// ─── Reports ──────────────────────────────────────────────────────────────────

fn overview<P: Persistence>(book: &Gradebook<P>, out: &mut dyn Write) -> anyhow::Result<()> {
  let data = book.data();
  let overview = Overview::build(data);

  writeln!(
    out,
    "Overall      {}% {}  {}",
    format::percent(overview.average),
    format::grade(overview.grade),
    overview.caption()
  )?;
  writeln!(
    out,
    "Subjects     {}  Assessments {}  Best grade {}",
    overview.subject_count,
    overview.assessment_count,
    format::grade(overview.best_grade)
  )?;
  match &overview.top_subject {
    Some(top) => writeln!(
      out,
      "Top subject  {}  {}  ({} assessments logged)",
      top.subject.name,
      top.detail(),
      top.subject.assessments.len()
    )?,
    None => writeln!(out, "Top subject  No data yet")?,
  }
  match &overview.latest {
    Some(latest) => writeln!(
      out,
      "Latest       {}  {}  {}",
      latest.view.assessment.name,
      latest.detail(),
      latest.meta()
    )?,
    None => writeln!(out, "Latest       Nothing logged")?,
  }

  writeln!(out, "\nInsights")?;
  for insight in insights(&overview) {
    writeln!(out, "  {:<18} {}", insight.title, insight.detail)?;
  }

  writeln!(out, "\nSubjects")?;
  let cards = subject_cards(data);
  if cards.is_empty() {
    writeln!(out, "  No subjects yet. Add a subject to start tracking results.")?;
  }
  for card in cards {
    writeln!(out, "  {:<3} {:<24} {}", card.initials, card.name, card.summary())?;
  }

  writeln!(out, "\nUpcoming")?;
  write_digest(&upcoming_digest(data, book.today(), DIGEST_LIMIT), out)
}

fn write_digest(digest: &UpcomingDigest, out: &mut dyn Write) -> anyhow::Result<()> {
  if digest.rows.is_empty() {
    writeln!(out, "  No upcoming assessments yet.")?;
  }
  for row in &digest.rows {
    let tag = if row.overdue { "  [overdue]" } else { "" };
    writeln!(out, "  {:<24} {}  [{}]{tag}", row.name, row.meta(true), short_id(&row.id))?;
  }
  if let Some(more) = digest.more_label() {
    writeln!(out, "  {more}")?;
  }
  Ok(())
}

fn list<P: Persistence>(
  book: &Gradebook<P>,
  subject: Option<&str>,
  out: &mut dyn Write,
) -> anyhow::Result<()> {
  let rows = match subject {
    Some(name) => match book.find_subject_by_name(name) {
      Some(subject) => subject_history(subject),
      None => bail!("no subject named {name:?}"),
    },
    None => assessment_table(book.data()),
  };
  if rows.is_empty() {
    writeln!(out, "No assessments logged yet.")?;
    return Ok(());
  }
  writeln!(
    out,
    "{:<8}  {:<16} {:<20} {:>12} {:>6} {:>7} {:<3} {}",
    "ID", "SUBJECT", "ASSESSMENT", "SCORE", "WEIGHT", "%", "GR", "DATE"
  )?;
  for row in rows {
    writeln!(
      out,
      "{:<8}  {:<16} {:<20} {:>12} {:>6} {:>7} {:<3} {}",
      short_id(&row.id),
      row.subject,
      row.name,
      row.score,
      row.weight,
      fixed1(row.percentage),
      format::grade(row.grade),
      row.date
    )?;
  }
  Ok(())
}

/// Parse `YYYY-MM` into a zero-based month cursor.
pub fn parse_month(value: &str) -> anyhow::Result<MonthCursor> {
  let (year, month) = value
    .trim()
    .split_once('-')
    .with_context(|| format!("expected YYYY-MM, got {value:?}"))?;
  let year: i32 = year.parse().with_context(|| format!("bad year in {value:?}"))?;
  let month: u32 = month.parse().with_context(|| format!("bad month in {value:?}"))?;
  if !(1..=12).contains(&month) {
    bail!("month must be between 1 and 12, got {month}");
  }
  Ok(MonthCursor { year, month_index: month - 1 })
}

fn calendar<P: Persistence>(
  book: &Gradebook<P>,
  month: Option<&str>,
  out: &mut dyn Write,
) -> anyhow::Result<()> {
  let cursor = match month {
    Some(value) => parse_month(value)?,
    None => MonthCursor::containing(book.today().date),
  };
  let index = index_events(book.data(), book.today());
  let grid = MonthGrid::build(cursor.year, cursor.month_index, &index, book.today())
    .context("month is out of range")?;
  write!(out, "{}", calendar_text(&grid))?;
  Ok(())
}

/// Plain-text month grid. Muted days are parenthesised, today is bracketed,
/// and `*` marks days with events. Events for the month follow the grid.
pub fn calendar_text(grid: &MonthGrid) -> String {
  let mut text = format!("{}\n", grid.heading);
  text.push_str(" Mo   Tu   We   Th   Fr   Sa   Su\n");
  for week in grid.weeks() {
    let cells: Vec<String> = week
      .iter()
      .map(|cell| {
        let day = cell.day();
        let mark = if cell.events.is_empty() { ' ' } else { '*' };
        if cell.is_today {
          format!("[{day:>2}]{mark}")
        } else if cell.muted {
          format!("({day:>2}){mark}")
        } else {
          format!(" {day:>2} {mark}")
        }
      })
      .collect();
    text.push_str(cells.join("").trim_end());
    text.push('\n');
  }

  for cell in grid.cells.iter().filter(|c| !c.muted && !c.events.is_empty()) {
    for event in &cell.events {
      let tag = if event.overdue { "  [overdue]" } else { "" };
      text.push_str(&format!(
        "  {:>6}  {} ({}){tag}\n",
        format::short_date(&cell.key),
        event.name,
        event.subject
      ));
    }
    if cell.overflow > 0 {
      text.push_str(&format!("          +{} more\n", cell.overflow));
    }
  }
  text
}

// ─── Charts ───────────────────────────────────────────────────────────────────

fn chart<P: Persistence>(
  book: &Gradebook<P>,
  settings: &Settings,
  args: ChartArgs,
  out: &mut dyn Write,
) -> anyhow::Result<()> {
  let width = args.width.unwrap_or(settings.chart_width);
  let height = args.height.unwrap_or(settings.chart_height);
  let smoothness = args
    .smoothness
    .or(settings.smoothness)
    .map_or(book.smoothness(), clamp_smoothness);

  let document = match args.kind {
    ChartKind::Overall => {
      let options = LineChartOptions { smoothness, ..LineChartOptions::default() };
      svg::line_chart(&LineChart::layout(
        &overall_trend(book.data()),
        Viewport::line(width, height),
        &options,
      ))?
    }
    ChartKind::Subject { name } => {
      let Some(subject) = book.find_subject_by_name(&name) else {
        bail!("no subject named {name:?}");
      };
      let options = LineChartOptions {
        stroke: subject.color.clone(),
        smoothness,
        ..LineChartOptions::default()
      };
      svg::line_chart(&LineChart::layout(
        &subject_trend(subject),
        Viewport::line(width, height),
        &options,
      ))?
    }
    ChartKind::Subjects => svg::multi_line_chart(&MultiLineChart::layout(
      &subject_series(book.data()),
      Viewport::multi(width, height),
      smoothness,
    ))?,
  };

  match args.out {
    Some(path) => {
      std::fs::write(&path, document)
        .with_context(|| format!("failed to write {}", path.display()))?;
      writeln!(out, "Wrote {}", path.display())?;
    }
    None => out.write_all(document.as_bytes())?,
  }
  Ok(())
}
