//! Pipeline configuration describing which passes run and what they skip.

use std::fs;
use std::path::Path;

use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "minifier.config.json";

/// Number of combined bundle files retained per cache directory.
const DEFAULT_KEEP_COMBINED: usize = 5;

/// Options controlling the minification pipeline.
///
/// Defaults match the behavior of a freshly installed site: both kinds are
/// minified individually, nothing is combined, nothing is excluded.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MinifierConfig {
  /// Run the stylesheet pass.
  pub enabled: bool,
  /// Run the script pass.
  pub js_enabled: bool,
  /// Combine eligible stylesheets into one bundle instead of minifying
  /// them individually.
  pub combine_css: bool,
  /// Combine eligible scripts into one bundle instead of minifying them
  /// individually.
  pub combine_js: bool,
  /// Include already-minified stylesheets as combination members.
  pub combine_all_css: bool,
  /// Include already-minified scripts as combination members.
  pub combine_all_js: bool,
  /// Newline-separated URL substrings; a reference containing any of them
  /// is never processed.
  pub exclude_paths: String,
  /// Emit verbose diagnostics and raise missing-file logs to warnings.
  pub debug: bool,
  /// Pack derived and combined script output through the best-effort
  /// base64 obfuscation transform.
  pub js_obfuscate: bool,
  /// Site base prefix prepended to generated bundle URLs, e.g. `/subsite`.
  pub base_path: String,
  /// How many combined bundles to keep per cache directory after eviction.
  pub keep_combined: usize,
}

impl Default for MinifierConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      js_enabled: true,
      combine_css: false,
      combine_js: false,
      combine_all_css: false,
      combine_all_js: false,
      exclude_paths: String::new(),
      debug: false,
      js_obfuscate: false,
      base_path: String::new(),
      keep_combined: DEFAULT_KEEP_COMBINED,
    }
  }
}

impl MinifierConfig {
  /// Attempt to load configuration from the project root.
  ///
  /// When the configuration file does not exist or fails to parse we fall
  /// back to defaults so the pipeline can keep operating.
  pub fn discover(project_root: &Path) -> Self {
    let candidate = project_root.join(DEFAULT_CONFIG_FILE);
    Self::from_path(&candidate).unwrap_or_default()
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Exclusion substrings parsed from `exclude_paths`.
  ///
  /// Lines are trimmed and empty entries discarded.
  pub fn exclude_list(&self) -> Vec<&str> {
    self
      .exclude_paths
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .collect()
  }
}
