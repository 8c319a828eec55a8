//! Domain types for the identifier registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata for one tracked event identifier.
///
/// The `id` is the full dotted key and the primary key of the registry;
/// the structural fields arrive pre-parsed from the upstream parser and
/// are never re-derived here. `avg_response_time` and `error_rate` are
/// opaque payload carried for the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifierMetadata {
    pub id: String,
    pub namespace: String,
    pub group: String,
    pub subgroup: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subaction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Unix timestamp in milliseconds of the most recent usage
    pub last_seen: u64,
    /// Usage counter
    pub frequency: u64,
    #[serde(default)]
    pub avg_response_time: f64,
    #[serde(default)]
    pub error_rate: f64,
}

/// Sort order for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortBy {
    /// Descending stored frequency
    #[default]
    Frequency,
    /// Lexicographic on id
    Alphabetical,
    /// Descending last-seen timestamp
    Recent,
}

/// Options for [`crate::registry::IdentifierRegistry::search`]
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub limit: usize,
    /// Exact-match filter on the namespace field
    pub filter_by_namespace: Option<String>,
    /// Exact-match filter on the group field
    pub filter_by_group: Option<String>,
    pub sort_by: SortBy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            filter_by_namespace: None,
            filter_by_group: None,
            sort_by: SortBy::default(),
        }
    }
}

/// One search result. Ephemeral, produced per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    /// Byte offset and length of the substring of `id` that satisfied
    /// the query, for caller-side highlighting. `(0, 0)` for browse-all.
    pub matched_span: (usize, usize),
    pub metadata: IdentifierMetadata,
    /// Match-quality contribution in [0, 1]
    pub rank: f64,
}

/// Coarse usage-direction classification for a hot identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Rising,
    Stable,
    Falling,
}

/// A hotness ranking entry, recomputed on demand from the metadata table.
/// A cached copy may ride along in a snapshot for fast cold-start display,
/// but it is never authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotEntry {
    pub id: String,
    pub score: f64,
    pub trend: Trend,
}

/// One namespace of the three-level hierarchy view: group -> subgroup ->
/// sorted ids. Fully derived from the metadata table on each call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub namespace: String,
    pub children: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

/// Point-in-time counters for the registry and its index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryStats {
    pub records: usize,
    pub recent: usize,
    pub index_keys: usize,
    pub index_nodes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_json_round_trip() {
        let meta = IdentifierMetadata {
            id: "pandc.vnext.recommendations.feed".to_string(),
            namespace: "pandc".to_string(),
            group: "vnext".to_string(),
            subgroup: "recommendations".to_string(),
            subaction: Some("feed".to_string()),
            action: None,
            last_seen: 1_700_000_000_000,
            frequency: 42,
            avg_response_time: 12.5,
            error_rate: 0.01,
        };

        let json = serde_json::to_string(&meta).unwrap();
        let back: IdentifierMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_metadata_optional_fields_default() {
        let json = r#"{
            "id": "a.b.c",
            "namespace": "a",
            "group": "b",
            "subgroup": "c",
            "last_seen": 0,
            "frequency": 0
        }"#;
        let meta: IdentifierMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.subaction, None);
        assert_eq!(meta.avg_response_time, 0.0);
    }

    #[test]
    fn test_default_search_options() {
        let opts = SearchOptions::default();
        assert_eq!(opts.sort_by, SortBy::Frequency);
        assert_eq!(opts.limit, 20);
        assert!(opts.filter_by_namespace.is_none());
    }
}
