//! Regex scanner extracting asset references from rendered markup.
//!
//! Yields references in document order together with the byte spans of the
//! full tag and of the URL attribute value, so later rewriting can splice
//! exact positions instead of searching for tag text a second time. Both
//! quoting styles are matched as separate alternation arms.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{AssetKind, AssetReference};

fn style_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(
      r#"(?i)<link\b[^>]*\bhref\s*=\s*(?:"([^"]+?\.css(?:\?[^"]*)?)"|'([^']+?\.css(?:\?[^']*)?)')[^>]*>"#,
    )
    .expect("invalid stylesheet tag regex")
  })
}

fn script_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(
      r#"(?i)<script\b[^>]*\bsrc\s*=\s*(?:"([^"]+?\.js(?:\?[^"]*)?)"|'([^']+?\.js(?:\?[^']*)?)')[^>]*>"#,
    )
    .expect("invalid script tag regex")
  })
}

/// Collect all references of one kind from the document, in document order.
///
/// External and excluded URLs are still reported here; eligibility is the
/// filter layer's concern, not the scanner's.
pub fn scan_references(html: &str, kind: AssetKind) -> Vec<AssetReference> {
  let pattern = match kind {
    AssetKind::Style => style_pattern(),
    AssetKind::Script => script_pattern(),
  };

  pattern
    .captures_iter(html)
    .enumerate()
    .map(|(ordinal, caps)| {
      let tag = caps.get(0).expect("whole-match group always present");
      let url = caps
        .get(1)
        .or_else(|| caps.get(2))
        .expect("one quoting arm always captures");

      let raw_url = url.as_str().to_string();
      let (clean_url, query) = match raw_url.split_once('?') {
        Some((clean, query)) => (clean.to_string(), Some(query.to_string())),
        None => (raw_url.clone(), None),
      };

      AssetReference {
        raw_url,
        clean_url,
        query,
        kind,
        tag_span: tag.range(),
        url_span: url.range(),
        ordinal,
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn finds_stylesheet_links_in_document_order() {
    let html = r#"<head>
<link href="/templates/site/css/a.css" rel="stylesheet">
<link rel="stylesheet" href='/media/b.css?v=2'>
</head>"#;

    let refs = scan_references(html, AssetKind::Style);
    assert_eq!(refs.len(), 2);
    assert_eq!(refs[0].clean_url, "/templates/site/css/a.css");
    assert_eq!(refs[0].query, None);
    assert_eq!(refs[0].ordinal, 0);
    assert_eq!(refs[1].clean_url, "/media/b.css");
    assert_eq!(refs[1].query.as_deref(), Some("v=2"));
    assert_eq!(refs[1].ordinal, 1);
  }

  #[test]
  fn spans_index_the_exact_tag_and_url_bytes() {
    let html = r#"<p>x</p><script type="text/javascript" src="/media/app.js?t=9"></script>"#;

    let refs = scan_references(html, AssetKind::Script);
    assert_eq!(refs.len(), 1);
    assert_eq!(
      &html[refs[0].tag_span.clone()],
      r#"<script type="text/javascript" src="/media/app.js?t=9">"#
    );
    assert_eq!(&html[refs[0].url_span.clone()], "/media/app.js?t=9");
    assert_eq!(refs[0].raw_url, "/media/app.js?t=9");
  }

  #[test]
  fn external_urls_are_still_scanned() {
    let html = r#"<script src="http://cdn.example.com/lib.js"></script>"#;
    let refs = scan_references(html, AssetKind::Script);
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].clean_url, "http://cdn.example.com/lib.js");
  }

  #[test]
  fn matching_is_case_insensitive() {
    let html = r#"<LINK HREF="/css/site.CSS" REL="stylesheet">"#;
    assert_eq!(scan_references(html, AssetKind::Style).len(), 1);
  }

  #[test]
  fn ignores_tags_without_a_matching_extension() {
    let html = r#"<link href="/feed.xml" rel="alternate"><script src="/wasm/app.wasm"></script>"#;
    assert!(scan_references(html, AssetKind::Style).is_empty());
    assert!(scan_references(html, AssetKind::Script).is_empty());
  }
}
