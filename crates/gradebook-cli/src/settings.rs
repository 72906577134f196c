//! Layered configuration: built-in defaults, an optional TOML file, then
//! `GRADEBOOK_*` environment variables. Command-line flags are applied on
//! top by the caller.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/gradebook/config.toml";
pub const DEFAULT_STORE_PATH: &str = "~/.local/share/gradebook/gradebook.sqlite3";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite file holding the dataset.
  pub store_path:   PathBuf,
  /// Logical size of exported and on-screen charts.
  pub chart_width:  f64,
  pub chart_height: f64,
  /// Overrides the stored smoothness when drawing charts.
  #[serde(default)]
  pub smoothness:   Option<f64>,
}

impl Settings {
  pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
    let path = expand_tilde(config_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH)));

    let mut settings: Settings = config::Config::builder()
      .set_default("store_path", DEFAULT_STORE_PATH)?
      .set_default("chart_width", 640.0)?
      .set_default("chart_height", 240.0)?
      .add_source(config::File::from(path.as_path()).required(false))
      .add_source(config::Environment::with_prefix("GRADEBOOK"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?
      .try_deserialize()
      .context("failed to deserialise settings")?;

    settings.store_path = expand_tilde(&settings.store_path);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_paths_are_untouched() {
    assert_eq!(expand_tilde(Path::new("/tmp/x.sqlite3")), PathBuf::from("/tmp/x.sqlite3"));
    assert_eq!(expand_tilde(Path::new("rel/~/x")), PathBuf::from("rel/~/x"));
  }

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let settings = Settings::load(Some(Path::new("/nonexistent/gradebook.toml"))).unwrap();
    assert_eq!(settings.chart_width, 640.0);
    assert_eq!(settings.chart_height, 240.0);
    assert!(settings.store_path.ends_with("gradebook.sqlite3"));
  }
}
