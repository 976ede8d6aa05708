//! The per-kind pipeline driver and markup rewriter.
//!
//! Edits are collected as `(byte span, replacement)` pairs against the
//! scanned document and applied back-to-front, so every span stays valid
//! while earlier ones are spliced. Stylesheets and scripts run as fully
//! independent passes.

use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::asset_paths::{FilterMode, is_derived, is_eligible, resolve_reference};
use crate::cache::{evict_oldest, persist_bundle, refresh_derived};
use crate::combine::build_bundle;
use crate::config::MinifierConfig;
use crate::error::ProcessError;
use crate::minify::{AssetMinifier, DefaultMinifier};
use crate::models::{AssetKind, AssetReference, ResolvedAsset};
use crate::scan::scan_references;

/// Drives the minification pipeline over one rendered document.
///
/// The project root, configuration and minify seam are explicit fields;
/// there is no ambient host state. A processor is cheap to construct per
/// render pass.
pub struct PageProcessor<'a, M = DefaultMinifier> {
  project_root: &'a Path,
  config: &'a MinifierConfig,
  minifier: M,
}

impl<'a> PageProcessor<'a, DefaultMinifier> {
  /// Processor backed by the crate's stock minification engines.
  pub fn new(project_root: &'a Path, config: &'a MinifierConfig) -> Self {
    Self::with_minifier(project_root, config, DefaultMinifier)
  }
}

impl<'a, M: AssetMinifier> PageProcessor<'a, M> {
  /// Processor backed by a caller-supplied minify capability.
  pub fn with_minifier(
    project_root: &'a Path,
    config: &'a MinifierConfig,
    minifier: M,
  ) -> Self {
    Self {
      project_root,
      config,
      minifier,
    }
  }

  /// Rewrite the document, minifying or combining its local assets.
  ///
  /// Never fails: every per-reference error downgrades to leaving that
  /// reference exactly as it appeared, and in the worst case the input is
  /// returned unchanged.
  pub fn process(&self, html: &str) -> String {
    let mut body = html.to_string();
    if self.config.enabled {
      body = self.process_kind(&body, AssetKind::Style);
    }
    if self.config.js_enabled {
      body = self.process_kind(&body, AssetKind::Script);
    }
    body
  }

  fn process_kind(&self, html: &str, kind: AssetKind) -> String {
    let references = scan_references(html, kind);
    if references.is_empty() {
      return html.to_string();
    }

    let combine = match kind {
      AssetKind::Style => self.config.combine_css,
      AssetKind::Script => self.config.combine_js,
    };
    if combine {
      self.combine_pass(html, kind, &references)
    } else {
      self.individual_pass(html, kind, &references)
    }
  }

  fn individual_pass(
    &self,
    html: &str,
    kind: AssetKind,
    references: &[AssetReference],
  ) -> String {
    let exclude_list = self.config.exclude_list();
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    for reference in references {
      if !is_eligible(&reference.clean_url, &exclude_list, kind, FilterMode::Individual) {
        tracing::debug!(url = %reference.raw_url, "reference not eligible; left as-is");
        continue;
      }

      match self.refresh_reference(reference) {
        Ok(mut url) => {
          if let Some(query) = &reference.query {
            url.push('?');
            url.push_str(query);
          }
          edits.push((reference.url_span.clone(), url));
        }
        Err(err) => self.log_skip(reference, &err),
      }
    }

    apply_edits(html, edits)
  }

  fn refresh_reference(&self, reference: &AssetReference) -> Result<String, ProcessError> {
    let path = resolve_reference(&reference.clean_url, self.project_root)?;
    if !path.is_file() {
      return Err(ProcessError::NotFound { path });
    }
    refresh_derived(&path, reference, &self.minifier, self.config)
  }

  fn combine_pass(
    &self,
    html: &str,
    kind: AssetKind,
    references: &[AssetReference],
  ) -> String {
    let exclude_list = self.config.exclude_list();
    let include_derived = match kind {
      AssetKind::Style => self.config.combine_all_css,
      AssetKind::Script => self.config.combine_all_js,
    };
    let mode = FilterMode::Combine { include_derived };

    let mut resolved: Vec<ResolvedAsset<'_>> = Vec::new();
    for reference in references {
      if !is_eligible(&reference.clean_url, &exclude_list, kind, mode) {
        tracing::debug!(url = %reference.raw_url, "reference not eligible; tag kept");
        continue;
      }
      match resolve_reference(&reference.clean_url, self.project_root) {
        Ok(path) if path.is_file() => {
          if self.config.debug {
            tracing::debug!(path = %path.display(), "adding file to combination");
          }
          resolved.push(ResolvedAsset {
            reference,
            absolute_path: path,
            derived: is_derived(&reference.clean_url, kind),
          });
        }
        Ok(path) => self.log_skip(reference, &ProcessError::NotFound { path }),
        Err(err) => self.log_skip(reference, &err),
      }
    }

    let Some(bundle) = build_bundle(&resolved, kind, &self.minifier, self.config) else {
      return html.to_string();
    };

    let url = match persist_bundle(&bundle, self.project_root, &self.config.base_path) {
      Ok(url) => url,
      Err(err) => {
        tracing::error!(kind = kind.label(), %err, "failed to store combined bundle");
        return html.to_string();
      }
    };
    if self.config.debug {
      tracing::info!(filename = %bundle.filename(), kind = kind.label(), "created combined file");
    }

    evict_oldest(
      &self.project_root.join(kind.cache_dir()),
      "combined-",
      &format!(".{}", kind.bundle_extension()),
      self.config.keep_combined,
    );

    let combined_tag = match kind {
      AssetKind::Style => format!(r#"<link href="{url}" rel="stylesheet">"#),
      AssetKind::Script => format!(r#"<script src="{url}"></script>"#),
    };

    // The combined tag lands at the first contributor's position; every
    // other contributing tag is deleted outright. Ineligible tags between
    // them are untouched.
    let first = bundle.contributors.first().copied();
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    for reference in references {
      if !bundle.contributors.contains(&reference.ordinal) {
        continue;
      }
      let span = match kind {
        AssetKind::Script => extend_over_closing_tag(html, reference.tag_span.clone()),
        AssetKind::Style => reference.tag_span.clone(),
      };
      let replacement = if Some(reference.ordinal) == first {
        combined_tag.clone()
      } else {
        String::new()
      };
      edits.push((span, replacement));
    }

    apply_edits(html, edits)
  }

  fn log_skip(&self, reference: &AssetReference, err: &ProcessError) {
    match err {
      ProcessError::Traversal { .. } => {
        tracing::warn!(url = %reference.raw_url, "security: {err}");
      }
      ProcessError::NotFound { .. } => {
        if self.config.debug {
          tracing::warn!(url = %reference.raw_url, "{err}");
        } else {
          tracing::debug!(url = %reference.raw_url, "{err}");
        }
      }
      ProcessError::Write { .. } | ProcessError::Minify { .. } => {
        tracing::error!(url = %reference.raw_url, "{err}");
      }
    }
  }
}

fn closing_script_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN
    .get_or_init(|| Regex::new(r"(?i)^\s*</script\s*>").expect("invalid closing tag regex"))
}

/// Script references are never self-closing, so a replaced or deleted tag
/// absorbs its immediately trailing closing tag.
fn extend_over_closing_tag(html: &str, span: Range<usize>) -> Range<usize> {
  match closing_script_pattern().find(&html[span.end..]) {
    Some(found) => span.start..span.end + found.end(),
    None => span,
  }
}

fn apply_edits(html: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
  if edits.is_empty() {
    return html.to_string();
  }

  edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
  let mut output = html.to_string();
  for (span, replacement) in edits {
    output.replace_range(span, &replacement);
  }
  output
}
