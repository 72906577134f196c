//! `gradebook`: track marks, averages and upcoming assessments from the
//! terminal.
//!
//! # Usage
//!
//! ```text
//! gradebook                                   # interactive dashboard
//! gradebook assessment add Maths Quiz1 8 10 --create
//! gradebook overview
//! gradebook chart subjects --out subjects.svg
//! ```

mod app;
mod commands;
mod settings;
mod svg;
mod ui;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use commands::Command;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use gradebook_core::{date::Today, store::Gradebook};
use gradebook_store_sqlite::SqliteStore;
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::{Settings, expand_tilde};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "gradebook", version, about = "Grade tracking dashboard")]
struct Cli {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", env = "GRADEBOOK_CONFIG")]
  config: Option<PathBuf>,

  /// SQLite file to use instead of the configured one.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
  // Logs go to stderr so they never mix with report output.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut settings = Settings::load(cli.config.as_deref())?;
  if let Some(path) = cli.store {
    settings.store_path = expand_tilde(&path);
  }

  if let Some(parent) = settings.store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let store = SqliteStore::open(&settings.store_path)
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  let mut book = Gradebook::open(store, Today::now()).context("failed to load gradebook")?;

  match cli.command.unwrap_or(Command::Tui) {
    Command::Tui => run_dashboard(App::new(book, settings)),
    command => {
      let mut stdout = io::stdout().lock();
      commands::run(&mut book, &settings, command, &mut stdout)
    }
  }
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

fn run_dashboard(mut app: App<SqliteStore>) -> Result<()> {
  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app);

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<SqliteStore>,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    if !event::poll(Duration::from_millis(250)).context("polling events")? {
      continue;
    }
    match event::read().context("reading event")? {
      Event::Key(key) if key.kind == KeyEventKind::Press => {
        if !app.handle_key(key) {
          break;
        }
      }
      // Resize and everything else just redraws.
      _ => {}
    }
  }

  Ok(())
}
