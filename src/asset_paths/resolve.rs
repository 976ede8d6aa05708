//! Mapping referenced URLs to contained absolute paths.

use std::path::{Path, PathBuf};

use crate::error::ProcessError;

/// Resolve a referenced asset URL against the project root.
///
/// Resolution rules, first match wins:
/// 1. a leading `/` anchors the reference at the project root;
/// 2. a `/modules/` segment anchors everything from that segment at the
///    root, regardless of how the reference was prefixed;
/// 3. a `/media/` segment does the same for media-served assets;
/// 4. anything else joins the root as a relative path.
///
/// Every resolution is then canonicalized and checked for containment:
/// the canonical project root must be a strict prefix of the canonical
/// result. A target that does not exist yet is canonicalized through its
/// parent directory with the file name re-appended, so derived files that
/// are about to be created still resolve. A parent that cannot be
/// canonicalized means the source cannot exist and yields
/// [`ProcessError::NotFound`]; an escape yields [`ProcessError::Traversal`].
pub fn resolve_reference(
  reference: &str,
  project_root: &Path,
) -> Result<PathBuf, ProcessError> {
  let resolved = if let Some(rooted) = reference.strip_prefix('/') {
    project_root.join(rooted)
  } else if let Some(position) = reference.find("/modules/") {
    project_root.join(&reference[position + 1..])
  } else if let Some(position) = reference.find("/media/") {
    project_root.join(&reference[position + 1..])
  } else {
    project_root.join(reference)
  };

  let canonical_root =
    project_root
      .canonicalize()
      .map_err(|_| ProcessError::NotFound {
        path: project_root.to_path_buf(),
      })?;

  let canonical = match resolved.canonicalize() {
    Ok(path) => path,
    Err(_) => {
      // Target absent: canonicalize the parent and re-append the name so
      // not-yet-written derived files still pass the containment check.
      let through_parent = resolved
        .parent()
        .zip(resolved.file_name())
        .and_then(|(parent, name)| parent.canonicalize().ok().map(|dir| dir.join(name)));
      match through_parent {
        Some(path) => path,
        None => return Err(ProcessError::NotFound { path: resolved }),
      }
    }
  };

  if canonical.starts_with(&canonical_root) && canonical != canonical_root {
    Ok(canonical)
  } else {
    Err(ProcessError::Traversal {
      reference: reference.to_string(),
    })
  }
}
