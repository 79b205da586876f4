//! Identities and revisions for files not open in the editor.
//!
//! File-path identity and open-document identity are distinct key spaces;
//! [`FileId`] keeps them from colliding in the caches.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::cache::RevisionSource;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(String);

impl FileId {
    pub fn from_path(path: &Path) -> Self {
        Self(normalized_path(path).display().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn normalized_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Revision source for external files: the modification timestamp, probed
/// fresh on every lookup. A file that cannot be stat'ed has no current
/// revision, so cached entries for it evict.
#[derive(Debug, Default)]
pub struct FileRevisions;

impl RevisionSource<FileId, SystemTime> for FileRevisions {
    fn current_revision(
        &self,
        key: &FileId,
    ) -> Option<SystemTime> {
        std::fs::metadata(key.as_str()).ok()?.modified().ok()
    }
}
