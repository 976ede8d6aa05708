//! Combining eligible assets of one kind into a single hashed payload.

use std::fs;
use std::path::PathBuf;

use same_file::is_same_file;

use crate::config::MinifierConfig;
use crate::minify::{AssetMinifier, pack_script};
use crate::models::{AssetKind, Bundle, ResolvedAsset};

/// Build a bundle from resolved assets, in the order they appeared in the
/// document.
///
/// Each physical file contributes once: a second reference to the same file
/// is skipped and its tag left in place. Members whose reference already
/// carries a derived marker are spliced verbatim; everything else passes
/// through the minify seam, and a member that fails to minify is dropped
/// from the bundle (its tag survives) without affecting the rest. Every
/// member is prefixed with a delimiter comment naming the originating
/// reference.
///
/// Returns `None` when nothing contributed; no file is written and the
/// markup stays untouched.
pub fn build_bundle<M: AssetMinifier>(
  assets: &[ResolvedAsset<'_>],
  kind: AssetKind,
  minifier: &M,
  config: &MinifierConfig,
) -> Option<Bundle> {
  let mut payload: Vec<u8> = Vec::new();
  let mut member_paths: Vec<PathBuf> = Vec::new();
  let mut contributors: Vec<usize> = Vec::new();

  for asset in assets {
    let path = &asset.absolute_path;
    let already_included = member_paths
      .iter()
      .any(|seen| is_same_file(seen, path).unwrap_or_else(|_| seen == path));
    if already_included {
      tracing::debug!(
        path = %path.display(),
        "file already bundled; later reference keeps its tag"
      );
      continue;
    }

    let content = match fs::read(path) {
      Ok(content) => content,
      Err(err) => {
        tracing::debug!(path = %path.display(), %err, "skipping unreadable combination member");
        continue;
      }
    };

    let content = if asset.derived {
      content
    } else {
      match minifier.minify(kind, &content) {
        Ok(minified) => minified,
        Err(err) => {
          tracing::error!(
            reference = %asset.reference.clean_url,
            %err,
            "minification failed; reference left as-is"
          );
          continue;
        }
      }
    };

    payload
      .extend_from_slice(format!("/* File: {} */\n", asset.reference.clean_url).as_bytes());
    payload.extend_from_slice(&content);
    payload.push(b'\n');
    member_paths.push(path.clone());
    contributors.push(asset.reference.ordinal);
  }

  if payload.is_empty() {
    return None;
  }

  if kind == AssetKind::Script && config.js_obfuscate {
    payload = pack_script(&payload);
  }

  let digest = blake3::hash(&payload);
  let content_hash = hex::encode(&digest.as_bytes()[..4]);

  Some(Bundle {
    kind,
    content_hash,
    member_paths,
    payload,
    contributors,
  })
}
