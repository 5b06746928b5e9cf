//! Graceful filesystem probing.
//!
//! Resolution and discovery treat "not there" as an ordinary branch, so
//! every access error collapses to `None` instead of propagating.

use std::fs::{self, Metadata};
use std::path::Path;

/// Kind of entry found at a probed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

impl EntryKind {
    fn from_metadata(meta: &Metadata) -> Self {
        if meta.is_file() {
            Self::File
        } else if meta.is_dir() {
            Self::Dir
        } else {
            Self::Other
        }
    }
}

/// Stat a path, following symlinks. Any error yields `None`.
#[must_use]
pub fn stat_graceful(path: &Path) -> Option<Metadata> {
    match fs::metadata(path) {
        Ok(meta) => Some(meta),
        Err(err) => {
            tracing::trace!(path = %path.display(), error = %err, "probe miss");
            None
        }
    }
}

/// Kind of the entry at `path`, or `None` when it is absent or unreadable.
#[must_use]
pub fn probe(path: &Path) -> Option<EntryKind> {
    stat_graceful(path).map(|meta| EntryKind::from_metadata(&meta))
}
