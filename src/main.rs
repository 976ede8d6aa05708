//! Command-line front end: run the pipeline over an HTML file on disk.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use site_minifier::{MinifierConfig, PageProcessor};

/// Minify and combine the assets referenced by a rendered HTML document.
#[derive(Debug, Parser)]
#[command(name = "site_minifier", version, about)]
struct Cli {
  /// HTML document to process.
  input: PathBuf,

  /// Project root that asset references resolve against.
  #[arg(long)]
  root: PathBuf,

  /// JSON configuration file (defaults to `<root>/minifier.config.json`).
  #[arg(long)]
  config: Option<PathBuf>,

  /// Write the rewritten document here instead of stdout.
  #[arg(long)]
  output: Option<PathBuf>,

  /// Enable debug-level diagnostics.
  #[arg(long)]
  verbose: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_filter = if cli.verbose {
    "site_minifier=debug"
  } else {
    "site_minifier=info"
  };
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
    )
    .with_writer(std::io::stderr)
    .init();

  let config = match &cli.config {
    Some(path) => MinifierConfig::from_path(path)
      .with_context(|| format!("failed to load configuration from {}", path.display()))?,
    None => MinifierConfig::discover(&cli.root),
  };

  let html = fs::read_to_string(&cli.input)
    .with_context(|| format!("failed to read {}", cli.input.display()))?;

  let processor = PageProcessor::new(&cli.root, &config);
  let rewritten = processor.process(&html);

  match &cli.output {
    Some(path) => fs::write(path, rewritten)
      .with_context(|| format!("failed to write {}", path.display()))?,
    None => print!("{rewritten}"),
  }

  Ok(())
}
