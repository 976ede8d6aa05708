//! On-disk caches: per-source derived siblings and combined bundle storage.
//!
//! Neither cache takes a lock. Derived files are keyed by deterministic
//! path and bundles by content hash, so concurrent render passes performing
//! the same work overwrite each other with identical bytes.

mod derived;
mod store;

pub use derived::refresh_derived;
pub use store::{evict_oldest, persist_bundle};

use std::path::Path;
use std::time::SystemTime;

/// Modification time of a file, when it exists and exposes one.
pub(crate) fn modified_time(path: &Path) -> Option<SystemTime> {
  path.metadata().and_then(|meta| meta.modified()).ok()
}
