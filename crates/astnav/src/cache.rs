//! Revision-stamped cache for fetched ASTs and token lists.
//!
//! An entry is valid only while the owning document's content revision is
//! unchanged. The current revision is re-queried from a [`RevisionSource`]
//! on every lookup; a revision passed by the caller is only ever used for
//! storage, never for validation.

use std::fmt::Debug;
use std::hash::Hash;

use dashmap::DashMap;
use tracing::debug;

/// Supplies the caller-visible current revision for a key: an edit counter
/// for open documents, a modification timestamp for external files.
pub trait RevisionSource<K, R> {
    /// `None` means the key no longer has a current revision at all (the
    /// document was closed, the file disappeared); lookups then miss.
    fn current_revision(
        &self,
        key: &K,
    ) -> Option<R>;
}

struct CacheEntry<R, V> {
    revision: R,
    payload: V,
}

/// Cache mapping a document or file identity to a previously fetched
/// payload, valid only while the revision matches. A stale hit evicts and
/// reports a miss, never returns old data.
///
/// Two independent instances exist in practice, one keyed by open-document
/// identity and one keyed by file path; the key type parameter keeps those
/// identity spaces from colliding.
pub struct VersionedCache<K, R, V> {
    entries: DashMap<K, CacheEntry<R, V>>,
}

impl<K, R, V> VersionedCache<K, R, V>
where
    K: Eq + Hash + Clone + Debug,
    R: PartialEq + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Store or overwrite the entry for `key`, stamped with `revision`.
    pub fn put(
        &self,
        key: K,
        revision: R,
        payload: V,
    ) {
        self.entries.insert(
            key,
            CacheEntry {
                revision,
                payload,
            },
        );
    }

    /// Return the payload only if the key exists and its stored revision
    /// still equals the source's current one; otherwise evict and miss.
    pub fn get(
        &self,
        key: &K,
        source: &dyn RevisionSource<K, R>,
    ) -> Option<V> {
        if !self.entries.contains_key(key) {
            return None;
        }
        match source.current_revision(key) {
            Some(current) => {
                let entry = self.entries.get(key)?;
                if entry.revision == current {
                    return Some(entry.payload.clone());
                }
                drop(entry);
                debug!("evicting stale cache entry for {key:?}");
                self.entries.remove(key);
                None
            },
            None => {
                debug!("evicting cache entry for {key:?}: no current revision");
                self.entries.remove(key);
                None
            },
        }
    }

    /// Like [`get`](Self::get) but also removes the entry, for promoting a
    /// result into another cache (e.g. when a queried file is opened in the
    /// editor).
    pub fn take(
        &self,
        key: &K,
        source: &dyn RevisionSource<K, R>,
    ) -> Option<(V, R)> {
        let current = match source.current_revision(key) {
            Some(current) => current,
            None => {
                self.entries.remove(key);
                return None;
            },
        };
        let (_, entry) = self.entries.remove(key)?;
        if entry.revision == current {
            Some((entry.payload, entry.revision))
        } else {
            debug!("dropping stale cache entry for {key:?} on take");
            None
        }
    }

    pub fn remove(
        &self,
        key: &K,
    ) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop arbitrary entries until at most `max` remain. Keeps the
    /// external-file cache bounded; which entries go is not specified, the
    /// next lookup simply refetches.
    pub fn trim_to(
        &self,
        max: usize,
    ) {
        while self.entries.len() > max {
            let victim = match self.entries.iter().next() {
                Some(entry) => entry.key().clone(),
                None => break,
            };
            debug!("trimming cache entry for {victim:?}");
            self.entries.remove(&victim);
        }
    }
}

impl<K, R, V> Default for VersionedCache<K, R, V>
where
    K: Eq + Hash + Clone + Debug,
    R: PartialEq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/src/cache_tests.rs"]
mod tests;
