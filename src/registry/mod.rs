//! The identifier registry: domain-facing API over the prefix index.
//!
//! Owns all identifier metadata, ranks and filters search candidates,
//! tracks hot and recently used identifiers, derives the hierarchy view,
//! and exports/imports the durable snapshot.

pub mod hierarchy;
pub mod recent;
pub mod scorer;
pub mod shared;
pub mod snapshot;
pub mod types;

pub use scorer::{HotScorer, HotWeights};
pub use shared::SharedRegistry;
pub use snapshot::{RegistryState, StateFormatError, STATE_VERSION};
pub use types::{
    HierarchyNode, HotEntry, IdentifierMetadata, RegistryStats, SearchOptions, SortBy,
    Suggestion, Trend,
};

use crate::index::{MatchQuality, PrefixIndex};
use crate::registry::recent::RecentList;
use crate::utils::now_millis;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;

/// Queries shorter than this never trigger the fuzzy fallback
const FUZZY_MIN_QUERY: usize = 3;

/// Size of the cached hot list embedded in snapshots
const HOT_CACHE_LIMIT: usize = 50;

/// Table size above which bulk operations fan out across rayon
const PAR_THRESHOLD: usize = 4096;

/// Candidate pool requested from the index before filtering and sorting
fn generous_limit(limit: usize) -> usize {
    (limit.saturating_mul(4)).max(64)
}

/// In-memory registry of event identifiers.
///
/// A registry starts empty and is populated via [`initialize`] or
/// [`add_entry`]; every read operation is valid in either state (an empty
/// registry yields empty results). Instances are discarded at session end
/// and rebuilt from a [`RegistryState`] snapshot.
///
/// [`initialize`]: IdentifierRegistry::initialize
/// [`add_entry`]: IdentifierRegistry::add_entry
pub struct IdentifierRegistry {
    metadata: FxHashMap<String, IdentifierMetadata>,
    /// Lowercased id -> canonical id, for case-insensitive search
    index: PrefixIndex<String>,
    recent: RecentList,
    weights: HotWeights,
}

impl Default for IdentifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::with_weights(HotWeights::default())
    }

    pub fn with_weights(weights: HotWeights) -> Self {
        Self {
            metadata: FxHashMap::default(),
            index: PrefixIndex::new(),
            recent: RecentList::new(),
            weights,
        }
    }

    /// Rebuild a registry from a snapshot. The prefix index is
    /// reconstructed from the record table; the snapshot's cached hot
    /// list is display-only and not trusted as state.
    pub fn from_state(state: RegistryState) -> Result<Self, StateFormatError> {
        let mut registry = Self::new();
        registry.import_state(state)?;
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    /// Direct metadata lookup by id
    pub fn get(&self, id: &str) -> Option<&IdentifierMetadata> {
        self.metadata.get(id)
    }

    /// Bulk-load records, discarding any existing state first. Must stay
    /// well under one second for 10,000 records; the contract is held by
    /// the integration tests and the criterion bench.
    pub fn initialize(&mut self, records: Vec<IdentifierMetadata>) {
        self.metadata.clear();
        self.index.clear();
        self.recent.clear();
        self.insert_many(records);
    }

    /// Insert or replace records without clearing existing state and
    /// without touching the recent list. Used by bulk paths.
    pub fn insert_many(&mut self, records: Vec<IdentifierMetadata>) {
        if records.len() >= PAR_THRESHOLD {
            let keyed: Vec<(String, IdentifierMetadata)> = records
                .into_par_iter()
                .map(|record| (record.id.to_lowercase(), record))
                .collect();
            for (lower, record) in keyed {
                self.index.insert(lower, record.id.clone());
                self.metadata.insert(record.id.clone(), record);
            }
        } else {
            for record in records {
                self.index.insert(record.id.to_lowercase(), record.id.clone());
                self.metadata.insert(record.id.clone(), record);
            }
        }
    }

    /// Insert or replace a single record. Replacement is wholesale: the
    /// stored record is the one passed in, not a field-by-field merge.
    /// The id is also fronted on the recent list.
    pub fn add_entry(&mut self, meta: IdentifierMetadata) {
        self.recent.touch(&meta.id);
        self.index.insert(meta.id.to_lowercase(), meta.id.clone());
        self.metadata.insert(meta.id.clone(), meta);
    }

    /// Record one usage of `id`: frequency rises by exactly one, the
    /// last-seen timestamp moves to now, and the id is fronted on the
    /// recent list. Unknown ids are a silent no-op; the caller may race
    /// a usage record against a still-in-flight registration.
    pub fn record_usage(&mut self, id: &str) {
        let Some(meta) = self.metadata.get_mut(id) else {
            return;
        };
        meta.frequency += 1;
        meta.last_seen = now_millis();
        self.index.bump(&id.to_lowercase(), 1);
        self.recent.touch(id);
    }

    /// Ranked, filterable suggestions for a query.
    ///
    /// An empty query is a browse-everything request. Otherwise prefix
    /// candidates come first; when they fall short of the limit and the
    /// query is long enough to be meaningful, fuzzy matches fill the
    /// remainder (deduplicated by id). Filters are exact-match predicates
    /// over the metadata fields, applied before sorting and truncation.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<Suggestion> {
        let query = query.trim();
        // (id, matched span, match-quality rank)
        let mut candidates: Vec<(String, (usize, usize), f64)> = Vec::new();

        if query.is_empty() {
            candidates.extend(
                self.metadata
                    .keys()
                    .map(|id| (id.clone(), (0, 0), 0.0)),
            );
        } else {
            let q = query.to_lowercase();
            let pool = generous_limit(options.limit);
            let mut seen: FxHashSet<String> = FxHashSet::default();

            for (_, id) in self.index.prefix_search(&q, pool) {
                if seen.insert(id.clone()) {
                    candidates.push((id.clone(), (0, q.len()), MatchQuality::Prefix.weight()));
                }
            }

            if candidates.len() < options.limit && q.len() >= FUZZY_MIN_QUERY {
                for hit in self.index.fuzzy_search(&q, pool) {
                    if seen.insert(hit.value.clone()) {
                        candidates.push((hit.value.clone(), hit.span, hit.quality.weight()));
                    }
                }
            }
        }

        candidates.retain(|(id, _, _)| {
            let Some(meta) = self.metadata.get(id) else {
                return false;
            };
            let ns_ok = options
                .filter_by_namespace
                .as_deref()
                .map(|ns| meta.namespace == ns)
                .unwrap_or(true);
            let group_ok = options
                .filter_by_group
                .as_deref()
                .map(|g| meta.group == g)
                .unwrap_or(true);
            ns_ok && group_ok
        });

        match options.sort_by {
            SortBy::Alphabetical => candidates.sort_by(|a, b| a.0.cmp(&b.0)),
            SortBy::Frequency => candidates.sort_by(|a, b| {
                let fa = self.metadata.get(&a.0).map_or(0, |m| m.frequency);
                let fb = self.metadata.get(&b.0).map_or(0, |m| m.frequency);
                fb.cmp(&fa).then_with(|| a.0.cmp(&b.0))
            }),
            SortBy::Recent => candidates.sort_by(|a, b| {
                let ta = self.metadata.get(&a.0).map_or(0, |m| m.last_seen);
                let tb = self.metadata.get(&b.0).map_or(0, |m| m.last_seen);
                tb.cmp(&ta).then_with(|| a.0.cmp(&b.0))
            }),
        }

        candidates.truncate(options.limit);
        candidates
            .into_iter()
            .filter_map(|(id, matched_span, rank)| {
                self.metadata.get(&id).map(|meta| Suggestion {
                    id: id.clone(),
                    matched_span,
                    metadata: meta.clone(),
                    rank,
                })
            })
            .collect()
    }

    /// Top `limit` identifiers by hot score, descending. Scores are
    /// recomputed from the metadata table on every call.
    pub fn get_hot(&self, limit: usize) -> Vec<HotEntry> {
        if self.metadata.is_empty() || limit == 0 {
            return Vec::new();
        }

        let scorer = HotScorer::new(self.weights.clone(), now_millis());
        let max_frequency = self
            .metadata
            .values()
            .map(|m| m.frequency)
            .max()
            .unwrap_or(0);

        let mut entries: Vec<HotEntry> = if self.metadata.len() >= PAR_THRESHOLD {
            self.metadata
                .par_iter()
                .map(|(_, meta)| scorer.hot_entry(meta, max_frequency))
                .collect()
        } else {
            self.metadata
                .values()
                .map(|meta| scorer.hot_entry(meta, max_frequency))
                .collect()
        };

        entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        entries.truncate(limit);
        entries
    }

    /// The front of the recent list, most-recent-first
    pub fn get_recent(&self, limit: usize) -> Vec<IdentifierMetadata> {
        self.recent
            .iter()
            .filter_map(|id| self.metadata.get(id).cloned())
            .take(limit)
            .collect()
    }

    /// The namespace -> group -> subgroup view, rebuilt fresh each call
    pub fn get_hierarchy(&self) -> Vec<HierarchyNode> {
        hierarchy::build_hierarchy(self.metadata.values())
    }

    /// Capture every held record, the recent list, and a cached hot list.
    /// The borrow makes this a consistent point-in-time view.
    pub fn export_state(&self) -> RegistryState {
        let mut eids: Vec<IdentifierMetadata> = self.metadata.values().cloned().collect();
        eids.sort_by(|a, b| a.id.cmp(&b.id));
        RegistryState::new(eids, self.recent.to_vec(), self.get_hot(HOT_CACHE_LIMIT))
    }

    /// Replace all registry state with the snapshot's contents. On error
    /// the registry is left untouched.
    pub fn import_state(&mut self, state: RegistryState) -> Result<(), StateFormatError> {
        state.validate()?;
        self.metadata.clear();
        self.index.clear();
        self.recent.clear();
        self.insert_many(state.eids);
        self.recent.restore(state.recent);
        Ok(())
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            records: self.metadata.len(),
            recent: self.recent.len(),
            index_keys: self.index.size(),
            index_nodes: self.index.node_count(),
        }
    }
}
