//! Eligibility classification for scanned references.

use crate::models::AssetKind;

/// Which pipeline the eligibility decision is being made for.
#[derive(Debug, Clone, Copy)]
pub enum FilterMode {
  /// Per-file minification; already-derived files are never reprocessed.
  Individual,
  /// Bundle combination; `include_derived` admits already-derived files as
  /// members (their bytes are spliced verbatim).
  Combine {
    /// Mirror of the `combine_all_*` configuration flag for this kind.
    include_derived: bool,
  },
}

/// Whether the URL already points at derived output for its kind.
pub fn is_derived(clean_url: &str, kind: AssetKind) -> bool {
  kind
    .derived_markers()
    .iter()
    .any(|marker| clean_url.contains(marker))
}

fn is_external(clean_url: &str) -> bool {
  clean_url.starts_with("//") || clean_url.starts_with("http")
}

fn is_excluded(clean_url: &str, exclude_list: &[&str]) -> bool {
  exclude_list
    .iter()
    .any(|substring| clean_url.contains(substring))
}

/// Decide whether a reference should be processed at all.
///
/// Rules in order: configured exclusion substrings win, then external URLs
/// (protocol-relative or absolute) are skipped, then already-derived files
/// are skipped unless combination mode explicitly admits them.
pub fn is_eligible(
  clean_url: &str,
  exclude_list: &[&str],
  kind: AssetKind,
  mode: FilterMode,
) -> bool {
  if is_excluded(clean_url, exclude_list) || is_external(clean_url) {
    return false;
  }

  if is_derived(clean_url, kind) {
    return matches!(mode, FilterMode::Combine {
      include_derived: true
    });
  }

  true
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn excluded_substrings_always_win() {
    assert!(!is_eligible(
      "/media/vendor/jquery.js",
      &["vendor"],
      AssetKind::Script,
      FilterMode::Combine {
        include_derived: true
      },
    ));
  }

  #[test]
  fn external_urls_are_never_eligible() {
    for url in ["//cdn.example.com/a.css", "http://x/a.css", "https://x/a.css"] {
      assert!(!is_eligible(url, &[], AssetKind::Style, FilterMode::Individual));
    }
  }

  #[test]
  fn derived_files_skip_individual_mode() {
    assert!(!is_eligible(
      "/css/site.min.css",
      &[],
      AssetKind::Style,
      FilterMode::Individual,
    ));
    assert!(!is_eligible(
      "/js/app.obf.js",
      &[],
      AssetKind::Script,
      FilterMode::Individual,
    ));
  }

  #[test]
  fn combine_all_admits_derived_files_in_combination_only() {
    assert!(is_eligible(
      "/css/site.min.css",
      &[],
      AssetKind::Style,
      FilterMode::Combine {
        include_derived: true
      },
    ));
    assert!(!is_eligible(
      "/css/site.min.css",
      &[],
      AssetKind::Style,
      FilterMode::Combine {
        include_derived: false
      },
    ));
  }

  #[test]
  fn plain_local_references_are_eligible() {
    assert!(is_eligible(
      "templates/site/css/a.css",
      &[],
      AssetKind::Style,
      FilterMode::Individual,
    ));
  }
}
