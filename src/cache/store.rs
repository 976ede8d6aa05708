//! Content-addressed bundle storage with bounded retention.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::ProcessError;
use crate::models::Bundle;

use super::modified_time;

/// Write a bundle under its hash-derived name and return its public URL.
///
/// The name is a function of the payload bytes, so a pre-existing file of
/// the same name already holds identical content and the overwrite is
/// harmless; concurrent renders converge on one stored artifact without
/// locking.
pub fn persist_bundle(
  bundle: &Bundle,
  project_root: &Path,
  base_path: &str,
) -> Result<String, ProcessError> {
  let cache_dir = project_root.join(bundle.kind.cache_dir());
  fs::create_dir_all(&cache_dir).map_err(|err| ProcessError::Write {
    path: cache_dir.clone(),
    source: err,
  })?;

  let filename = bundle.filename();
  let target = cache_dir.join(&filename);
  fs::write(&target, &bundle.payload).map_err(|err| ProcessError::Write {
    path: target,
    source: err,
  })?;

  Ok(format!(
    "{}/{}/{}",
    base_path.trim_end_matches('/'),
    bundle.kind.cache_dir(),
    filename
  ))
}

/// Delete bundle files beyond the `keep` most recently modified.
///
/// Best-effort housekeeping: listing or deletion failures are logged and
/// otherwise ignored, and never block the render pass.
pub fn evict_oldest(directory: &Path, prefix: &str, suffix: &str, keep: usize) {
  let entries = match fs::read_dir(directory) {
    Ok(entries) => entries,
    Err(err) => {
      tracing::debug!(directory = %directory.display(), %err, "skipping bundle eviction");
      return;
    }
  };

  let mut bundles: Vec<(PathBuf, SystemTime)> = Vec::new();
  for entry in entries.flatten() {
    let file_name = entry.file_name();
    let Some(name) = file_name.to_str() else {
      continue;
    };
    if !name.starts_with(prefix) || !name.ends_with(suffix) {
      continue;
    }
    if !entry.file_type().is_ok_and(|file_type| file_type.is_file()) {
      continue;
    }
    let modified = modified_time(&entry.path()).unwrap_or(SystemTime::UNIX_EPOCH);
    bundles.push((entry.path(), modified));
  }

  if bundles.len() <= keep {
    return;
  }

  bundles.sort_by(|a, b| b.1.cmp(&a.1));
  for (path, _) in bundles.into_iter().skip(keep) {
    if let Err(err) = fs::remove_file(&path) {
      tracing::warn!(path = %path.display(), %err, "failed to delete old combined file");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::AssetKind;
  use std::time::Duration;
  use tempfile::tempdir;

  fn bundle(payload: &[u8]) -> Bundle {
    Bundle {
      kind: AssetKind::Style,
      content_hash: "0a1b2c3d".into(),
      member_paths: Vec::new(),
      payload: payload.to_vec(),
      contributors: vec![0],
    }
  }

  #[test]
  fn persist_writes_the_payload_and_composes_the_public_url() {
    let temp = tempdir().unwrap();
    let url = persist_bundle(&bundle(b"body{}"), temp.path(), "").unwrap();

    assert_eq!(url, "/media/cache/css/combined-0a1b2c3d.css");
    let stored = temp.path().join("media/cache/css/combined-0a1b2c3d.css");
    assert_eq!(fs::read(stored).unwrap(), b"body{}");
  }

  #[test]
  fn persist_prepends_the_site_base_path() {
    let temp = tempdir().unwrap();
    let url = persist_bundle(&bundle(b"x"), temp.path(), "/subsite/").unwrap();
    assert_eq!(url, "/subsite/media/cache/css/combined-0a1b2c3d.css");
  }

  #[test]
  fn persist_overwrites_an_existing_name_without_error() {
    let temp = tempdir().unwrap();
    persist_bundle(&bundle(b"body{}"), temp.path(), "").unwrap();
    persist_bundle(&bundle(b"body{}"), temp.path(), "").unwrap();
  }

  #[test]
  fn eviction_keeps_the_most_recently_modified_files() {
    let temp = tempdir().unwrap();
    let directory = temp.path();

    for index in 0..7u64 {
      let path = directory.join(format!("combined-0000000{index}.css"));
      fs::write(&path, "x").unwrap();
      fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(index * 100))
        .unwrap();
    }
    fs::write(directory.join("unrelated.css"), "keep me").unwrap();

    evict_oldest(directory, "combined-", ".css", 5);

    let mut remaining: Vec<String> = fs::read_dir(directory)
      .unwrap()
      .flatten()
      .map(|entry| entry.file_name().to_string_lossy().into_owned())
      .collect();
    remaining.sort();
    assert_eq!(remaining, vec![
      "combined-00000002.css",
      "combined-00000003.css",
      "combined-00000004.css",
      "combined-00000005.css",
      "combined-00000006.css",
      "unrelated.css",
    ]);
  }

  #[test]
  fn eviction_is_a_noop_at_or_below_the_retention_count() {
    let temp = tempdir().unwrap();
    for index in 0..3 {
      fs::write(temp.path().join(format!("combined-{index}.js")), "x").unwrap();
    }

    evict_oldest(temp.path(), "combined-", ".js", 5);
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 3);
  }

  #[test]
  fn eviction_tolerates_a_missing_directory() {
    evict_oldest(Path::new("/nonexistent/cache"), "combined-", ".css", 5);
  }
}
