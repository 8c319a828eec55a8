//! Shared-access wrapper for serving multiple concurrent callers.
//!
//! Reads (`search`, `get_hot`, `get_recent`, `get_hierarchy`) vastly
//! outnumber writes in the expected workload, so the whole registry sits
//! behind one reader-writer lock rather than per-key locks. Usage updates
//! take the write lock, making frequency/last-seen changes atomic with
//! respect to concurrent reads, and `export_state` under the read lock
//! observes a single point-in-time view because writers are excluded.

use crate::registry::types::{
    HierarchyNode, HotEntry, IdentifierMetadata, RegistryStats, SearchOptions, Suggestion,
};
use crate::registry::{IdentifierRegistry, RegistryState, StateFormatError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Records moved per write-lock acquisition during a cancelable bulk load
const LOAD_CHUNK: usize = 1024;

/// Cheaply clonable handle to a registry shared across threads
#[derive(Clone)]
pub struct SharedRegistry {
    inner: Arc<RwLock<IdentifierRegistry>>,
}

impl Default for SharedRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(IdentifierRegistry::new())),
        }
    }

    pub fn from_state(state: RegistryState) -> Result<Self, StateFormatError> {
        Ok(Self {
            inner: Arc::new(RwLock::new(IdentifierRegistry::from_state(state)?)),
        })
    }

    pub fn initialize(&self, records: Vec<IdentifierMetadata>) {
        self.inner.write().unwrap().initialize(records);
    }

    /// Bulk-load in chunks, checking `cancel` between chunks so a very
    /// large load can be abandoned and readers can interleave. Returns
    /// the number of records actually loaded. Unlike [`initialize`],
    /// existing records are kept (and overwritten per id).
    ///
    /// [`initialize`]: SharedRegistry::initialize
    pub fn bulk_load(&self, records: Vec<IdentifierMetadata>, cancel: &AtomicBool) -> usize {
        let mut loaded = 0;
        let mut iter = records.into_iter();
        loop {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            let chunk: Vec<IdentifierMetadata> = iter.by_ref().take(LOAD_CHUNK).collect();
            if chunk.is_empty() {
                break;
            }
            loaded += chunk.len();
            self.inner.write().unwrap().insert_many(chunk);
        }
        loaded
    }

    pub fn add_entry(&self, meta: IdentifierMetadata) {
        self.inner.write().unwrap().add_entry(meta);
    }

    pub fn record_usage(&self, id: &str) {
        self.inner.write().unwrap().record_usage(id);
    }

    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<Suggestion> {
        self.inner.read().unwrap().search(query, options)
    }

    pub fn get_hot(&self, limit: usize) -> Vec<HotEntry> {
        self.inner.read().unwrap().get_hot(limit)
    }

    pub fn get_recent(&self, limit: usize) -> Vec<IdentifierMetadata> {
        self.inner.read().unwrap().get_recent(limit)
    }

    pub fn get_hierarchy(&self) -> Vec<HierarchyNode> {
        self.inner.read().unwrap().get_hierarchy()
    }

    pub fn export_state(&self) -> RegistryState {
        self.inner.read().unwrap().export_state()
    }

    pub fn import_state(&self, state: RegistryState) -> Result<(), StateFormatError> {
        self.inner.write().unwrap().import_state(state)
    }

    pub fn stats(&self) -> RegistryStats {
        self.inner.read().unwrap().stats()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn meta(id: &str, frequency: u64) -> IdentifierMetadata {
        let mut parts = id.split('.');
        IdentifierMetadata {
            id: id.to_string(),
            namespace: parts.next().unwrap_or_default().to_string(),
            group: parts.next().unwrap_or_default().to_string(),
            subgroup: parts.next().unwrap_or_default().to_string(),
            subaction: None,
            action: None,
            last_seen: 0,
            frequency,
            avg_response_time: 0.0,
            error_rate: 0.0,
        }
    }

    #[test]
    fn test_concurrent_reads_and_writes() {
        let shared = SharedRegistry::new();
        for i in 0..100 {
            shared.add_entry(meta(&format!("ns.grp.sub.item{i}"), i));
        }

        let mut handles = Vec::new();
        for _ in 0..4 {
            let reader = shared.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..200 {
                    let hits = reader.search("ns.grp", &SearchOptions::default());
                    assert!(!hits.is_empty());
                    reader.get_hot(5);
                }
            }));
        }
        let writer = shared.clone();
        handles.push(thread::spawn(move || {
            for i in 0..200 {
                writer.record_usage(&format!("ns.grp.sub.item{}", i % 100));
            }
        }));
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.len(), 100);
    }

    #[test]
    fn test_bulk_load_completes() {
        let shared = SharedRegistry::new();
        let records: Vec<_> = (0..3000)
            .map(|i| meta(&format!("ns.grp.sub.item{i}"), i))
            .collect();

        let cancel = AtomicBool::new(false);
        let loaded = shared.bulk_load(records, &cancel);
        assert_eq!(loaded, 3000);
        assert_eq!(shared.len(), 3000);
    }

    #[test]
    fn test_bulk_load_cancels_between_chunks() {
        let shared = SharedRegistry::new();
        let records: Vec<_> = (0..3000)
            .map(|i| meta(&format!("ns.grp.sub.item{i}"), i))
            .collect();

        let cancel = AtomicBool::new(true);
        let loaded = shared.bulk_load(records, &cancel);
        assert_eq!(loaded, 0);
        assert!(shared.is_empty());
    }

    #[test]
    fn test_export_state_is_consistent() {
        let shared = SharedRegistry::new();
        shared.add_entry(meta("a.b.c.one", 1));
        shared.record_usage("a.b.c.one");

        let state = shared.export_state();
        assert_eq!(state.eids.len(), 1);
        assert_eq!(state.recent, vec!["a.b.c.one"]);
        assert_eq!(state.eids[0].frequency, 2);
    }
}
