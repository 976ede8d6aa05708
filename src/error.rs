//! Error taxonomy for per-reference processing failures.
//!
//! None of these abort a render pass. The reference that produced the error
//! is left untouched in the markup, the failure is logged, and processing
//! moves on to the next reference; the pass as a whole never fails.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::minify::MinifyFailure;

/// Failure while processing a single asset reference.
#[derive(Debug, Error)]
pub enum ProcessError {
  /// The reference canonicalizes outside the project root.
  #[error("`{reference}` resolves outside the project root")]
  Traversal {
    /// Offending reference as it appeared in the markup.
    reference: String,
  },

  /// The resolved source file does not exist.
  #[error("source file not found: {}", path.display())]
  NotFound {
    /// Absolute path that was probed.
    path: PathBuf,
  },

  /// A cache directory or derived artifact could not be written.
  #[error("failed to write {}", path.display())]
  Write {
    /// Directory or file that failed.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: io::Error,
  },

  /// The minify capability rejected the source content.
  #[error("minification failed for `{reference}`")]
  Minify {
    /// Reference whose content failed to minify.
    reference: String,
    /// Seam-level failure detail.
    #[source]
    source: MinifyFailure,
  },
}
