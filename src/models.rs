//! Data structures flowing through a render pass.

use std::ops::Range;
use std::path::PathBuf;

/// The two asset families the pipeline processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
  /// Stylesheet references (`<link href="….css">`).
  Style,
  /// Script references (`<script src="….js">`).
  Script,
}

impl AssetKind {
  /// Short label used in log output and generated comments.
  pub fn label(self) -> &'static str {
    match self {
      Self::Style => "css",
      Self::Script => "js",
    }
  }

  /// File extension of combined bundle files for this kind.
  pub fn bundle_extension(self) -> &'static str {
    self.label()
  }

  /// Cache directory for combined bundles, relative to the project root.
  pub fn cache_dir(self) -> &'static str {
    match self {
      Self::Style => "media/cache/css",
      Self::Script => "media/cache/js",
    }
  }

  /// URL markers identifying a reference that already points at derived output.
  pub fn derived_markers(self) -> &'static [&'static str] {
    match self {
      Self::Style => &[".min.css"],
      Self::Script => &[".min.js", ".obf.js"],
    }
  }

  /// Suffix appended to a source file's stem when writing its derived sibling.
  ///
  /// Script output switches to the obfuscated marker when the packer stage is
  /// enabled, so packed and plainly minified artifacts never collide.
  pub fn derived_suffix(self, obfuscate: bool) -> &'static str {
    match self {
      Self::Style => ".min.css",
      Self::Script => {
        if obfuscate {
          ".obf.js"
        } else {
          ".min.js"
        }
      }
    }
  }
}

/// A stylesheet or script reference found in the document.
///
/// Produced by the scanner in document order; `ordinal` is the only ordering
/// key and survives every later transformation. The byte spans index the
/// scanned document, so replacements operate on exact positions rather than
/// text equality.
#[derive(Debug, Clone)]
pub struct AssetReference {
  /// URL exactly as captured from the tag, including any query string.
  pub raw_url: String,
  /// URL with the query string stripped.
  pub clean_url: String,
  /// Query string following `?`, when present.
  pub query: Option<String>,
  /// Asset family the reference belongs to.
  pub kind: AssetKind,
  /// Byte range of the full tag within the scanned document.
  pub tag_span: Range<usize>,
  /// Byte range of the URL attribute value within the scanned document.
  pub url_span: Range<usize>,
  /// Zero-based position among references of the same kind.
  pub ordinal: usize,
}

/// A reference that passed eligibility and resolved to a file on disk.
#[derive(Debug)]
pub struct ResolvedAsset<'a> {
  /// The originating reference.
  pub reference: &'a AssetReference,
  /// Canonical absolute path inside the project root.
  pub absolute_path: PathBuf,
  /// Whether the reference already carries a derived marker for its kind.
  ///
  /// Such members are spliced into bundles verbatim instead of being
  /// minified a second time.
  pub derived: bool,
}

/// A combined, minified artifact aggregating several sources of one kind.
///
/// Identity is a pure function of `payload`: the stored filename derives from
/// the content hash, so builds producing identical bytes converge on a single
/// file regardless of which request wrote it first.
#[derive(Debug, Clone)]
pub struct Bundle {
  /// Asset family the bundle serves.
  pub kind: AssetKind,
  /// First eight lowercase hex characters of the payload digest.
  pub content_hash: String,
  /// Absolute paths of the files that contributed, in document order.
  pub member_paths: Vec<PathBuf>,
  /// Combined minified bytes as they will be stored.
  pub payload: Vec<u8>,
  /// Ordinals of the references consumed by this bundle.
  pub contributors: Vec<usize>,
}

impl Bundle {
  /// File name the bundle is stored under.
  pub fn filename(&self) -> String {
    format!(
      "combined-{}.{}",
      self.content_hash,
      self.kind.bundle_extension()
    )
  }
}
