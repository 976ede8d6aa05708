//! The pluggable minify capability and its default engines.
//!
//! The pipeline only ever talks to [`AssetMinifier`]; the bundled
//! implementation routes CSS through `lightningcss` and JavaScript through
//! `oxc`. Tests (and embedders with their own toolchains) substitute the
//! seam without touching the rest of the pipeline.

mod css;
mod js;
mod pack;

pub use pack::pack_script;

use thiserror::Error;

use crate::models::AssetKind;

/// Why a minify invocation was rejected.
///
/// Carried as the source of [`crate::ProcessError::Minify`]; the pipeline
/// downgrades every variant to "skip this reference".
#[derive(Debug, Error)]
pub enum MinifyFailure {
  /// The source bytes are not valid UTF-8.
  #[error("source is not valid UTF-8")]
  Encoding(#[from] std::str::Utf8Error),

  /// The source failed to parse.
  #[error("parse failed: {0}")]
  Parse(String),

  /// The engine could not print minified output.
  #[error("output generation failed: {0}")]
  Print(String),
}

/// Capability that shrinks asset content, one kind at a time.
pub trait AssetMinifier {
  /// Produce minified bytes for `source`, or a failure that leaves the
  /// original reference untouched.
  fn minify(&self, kind: AssetKind, source: &[u8]) -> Result<Vec<u8>, MinifyFailure>;
}

/// The crate's stock minifier: `lightningcss` for styles, `oxc` for scripts.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMinifier;

impl AssetMinifier for DefaultMinifier {
  fn minify(&self, kind: AssetKind, source: &[u8]) -> Result<Vec<u8>, MinifyFailure> {
    match kind {
      AssetKind::Style => css::minify_css(source),
      AssetKind::Script => js::minify_js(source),
    }
  }
}
