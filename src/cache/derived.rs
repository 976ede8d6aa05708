//! Per-source derived-artifact cache.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::time::SystemTime;

use crate::config::MinifierConfig;
use crate::error::ProcessError;
use crate::minify::{AssetMinifier, pack_script};
use crate::models::{AssetKind, AssetReference};

use super::modified_time;

/// Return an up-to-date derived URL for `source`, regenerating if stale.
///
/// The derived file is the source's sibling carrying the kind's derived
/// suffix. It is considered fresh iff it exists and its modification time is
/// not earlier than the source's; anything else triggers a full regeneration
/// (read, minify, optionally pack, single whole-file write). After a write
/// the derived file's mtime is bumped to now, which keeps the freshness
/// invariant intact on filesystems with coarse timestamp resolution.
///
/// The returned URL is the reference's own directory joined with the derived
/// file name, so it travels through whatever public URL scheme the original
/// reference used.
pub fn refresh_derived<M: AssetMinifier>(
  source: &Path,
  reference: &AssetReference,
  minifier: &M,
  config: &MinifierConfig,
) -> Result<String, ProcessError> {
  let Some(stem) = source.file_stem().and_then(|stem| stem.to_str()) else {
    return Err(ProcessError::NotFound {
      path: source.to_path_buf(),
    });
  };
  let Some(directory) = source.parent() else {
    return Err(ProcessError::NotFound {
      path: source.to_path_buf(),
    });
  };

  fs::create_dir_all(directory).map_err(|err| ProcessError::Write {
    path: directory.to_path_buf(),
    source: err,
  })?;

  let derived_name = format!("{stem}{}", reference.kind.derived_suffix(config.js_obfuscate));
  let derived_path = directory.join(&derived_name);

  let stale = match (modified_time(source), modified_time(&derived_path)) {
    (Some(source_time), Some(derived_time)) => source_time > derived_time,
    _ => true,
  };

  if stale {
    let content = fs::read(source).map_err(|err| read_failure(source, err))?;

    let minified =
      minifier
        .minify(reference.kind, &content)
        .map_err(|source| ProcessError::Minify {
          reference: reference.clean_url.clone(),
          source,
        })?;
    let output = if reference.kind == AssetKind::Script && config.js_obfuscate {
      pack_script(&minified)
    } else {
      minified
    };

    fs::write(&derived_path, &output).map_err(|err| ProcessError::Write {
      path: derived_path.clone(),
      source: err,
    })?;

    if let Err(err) = touch_now(&derived_path) {
      tracing::debug!(
        path = %derived_path.display(),
        %err,
        "could not bump derived file mtime"
      );
    }
  }

  Ok(match reference.clean_url.rsplit_once('/') {
    Some((url_dir, _)) => format!("{url_dir}/{derived_name}"),
    None => derived_name,
  })
}

fn read_failure(source: &Path, err: io::Error) -> ProcessError {
  if err.kind() == ErrorKind::NotFound {
    ProcessError::NotFound {
      path: source.to_path_buf(),
    }
  } else {
    ProcessError::Write {
      path: source.to_path_buf(),
      source: err,
    }
  }
}

fn touch_now(path: &Path) -> io::Result<()> {
  fs::File::options()
    .write(true)
    .open(path)?
    .set_modified(SystemTime::now())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::minify::MinifyFailure;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::time::Duration;
  use tempfile::tempdir;

  /// Squeezes whitespace and counts invocations.
  #[derive(Default)]
  struct CountingMinifier {
    calls: AtomicUsize,
  }

  impl AssetMinifier for CountingMinifier {
    fn minify(&self, _kind: AssetKind, source: &[u8]) -> Result<Vec<u8>, MinifyFailure> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(
        source
          .iter()
          .copied()
          .filter(|byte| !byte.is_ascii_whitespace())
          .collect(),
      )
    }
  }

  fn reference(clean_url: &str, kind: AssetKind) -> AssetReference {
    AssetReference {
      raw_url: clean_url.to_string(),
      clean_url: clean_url.to_string(),
      query: None,
      kind,
      tag_span: 0..0,
      url_span: 0..0,
      ordinal: 0,
    }
  }

  #[test]
  fn writes_a_minified_sibling_and_preserves_the_url_prefix() {
    let temp = tempdir().unwrap();
    let css_dir = temp.path().join("templates/x/css");
    fs::create_dir_all(&css_dir).unwrap();
    let source = css_dir.join("a.css");
    fs::write(&source, "body {\n  color: red;\n}\n").unwrap();

    let minifier = CountingMinifier::default();
    let config = MinifierConfig::default();
    let url = refresh_derived(
      &source,
      &reference("/templates/x/css/a.css", AssetKind::Style),
      &minifier,
      &config,
    )
    .unwrap();

    assert_eq!(url, "/templates/x/css/a.min.css");
    let derived = fs::read_to_string(css_dir.join("a.min.css")).unwrap();
    assert_eq!(derived, "body{color:red;}");
  }

  #[test]
  fn repeated_calls_reuse_the_fresh_artifact() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("app.js");
    fs::write(&source, "var a = 1;\n").unwrap();

    let minifier = CountingMinifier::default();
    let config = MinifierConfig::default();
    let reference = reference("app.js", AssetKind::Script);

    refresh_derived(&source, &reference, &minifier, &config).unwrap();
    refresh_derived(&source, &reference, &minifier, &config).unwrap();
    assert_eq!(minifier.calls.load(Ordering::SeqCst), 1);

    // Advance the source past the derived file: the next call regenerates.
    fs::File::options()
      .write(true)
      .open(&source)
      .unwrap()
      .set_modified(SystemTime::now() + Duration::from_secs(10))
      .unwrap();
    refresh_derived(&source, &reference, &minifier, &config).unwrap();
    assert_eq!(minifier.calls.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn obfuscation_switches_the_suffix_and_packs_the_output() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("media/app.js");
    fs::create_dir_all(source.parent().unwrap()).unwrap();
    fs::write(&source, "var x = 1;").unwrap();

    let config = MinifierConfig {
      js_obfuscate: true,
      ..MinifierConfig::default()
    };
    let url = refresh_derived(
      &source,
      &reference("/media/app.js", AssetKind::Script),
      &CountingMinifier::default(),
      &config,
    )
    .unwrap();

    assert_eq!(url, "/media/app.obf.js");
    let packed = fs::read_to_string(temp.path().join("media/app.obf.js")).unwrap();
    assert!(packed.starts_with("eval(atob(\""));
  }

  #[cfg(unix)]
  #[test]
  fn unwritable_directory_degrades_to_a_write_error() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempdir().unwrap();
    let css_dir = temp.path().join("css");
    fs::create_dir_all(&css_dir).unwrap();
    let source = css_dir.join("a.css");
    fs::write(&source, "body{}").unwrap();
    fs::set_permissions(&css_dir, fs::Permissions::from_mode(0o555)).unwrap();

    let err = refresh_derived(
      &source,
      &reference("/css/a.css", AssetKind::Style),
      &CountingMinifier::default(),
      &MinifierConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ProcessError::Write { .. }));

    fs::set_permissions(&css_dir, fs::Permissions::from_mode(0o755)).unwrap();
  }
}
