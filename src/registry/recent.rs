//! Bounded most-recently-used id list.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Maximum number of ids remembered regardless of write volume
pub const RECENT_CAPACITY: usize = 256;

/// Most-recently-used list of identifier ids. Pushing an id moves it to
/// the front and deduplicates prior occurrences; once full, the oldest
/// entry is evicted first.
pub struct RecentList {
    inner: LruCache<String, ()>,
}

impl Default for RecentList {
    fn default() -> Self {
        Self::new()
    }
}

impl RecentList {
    pub fn new() -> Self {
        Self {
            inner: LruCache::new(NonZeroUsize::new(RECENT_CAPACITY).unwrap()),
        }
    }

    /// Move `id` to the front, inserting it if absent
    pub fn touch(&mut self, id: &str) {
        self.inner.put(id.to_string(), ());
    }

    /// Ids from most recent to least recent
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(|(id, ())| id.as_str())
    }

    /// Snapshot of the list, most-recent-first
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }

    /// Rebuild from a most-recent-first sequence (as stored in snapshots)
    pub fn restore<I>(&mut self, ids_most_recent_first: I)
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: DoubleEndedIterator,
    {
        self.inner.clear();
        // feed oldest-first so the first element of the input ends up
        // most recently used
        for id in ids_most_recent_first.into_iter().rev() {
            self.inner.put(id, ());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
