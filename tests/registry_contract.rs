//! End-to-end contract tests for the identifier registry.
//!
//! These exercise the externally observable behavior a host application
//! depends on: replace semantics, usage accounting, search correctness,
//! hotness ordering, the bounded recent list, snapshot round-trips, and
//! the bulk-load/search latency envelope.

use eidx::registry::{
    IdentifierMetadata, IdentifierRegistry, SearchOptions, SortBy, Trend,
};
use eidx::utils::now_millis;
use std::time::{Duration, Instant};

const DAY_MS: u64 = 86_400_000;

/// Build a record the way the upstream parser would: structural fields
/// split out of the dotted id.
fn record(id: &str, frequency: u64, last_seen: u64) -> IdentifierMetadata {
    let mut parts = id.split('.');
    IdentifierMetadata {
        id: id.to_string(),
        namespace: parts.next().unwrap_or_default().to_string(),
        group: parts.next().unwrap_or_default().to_string(),
        subgroup: parts.next().unwrap_or_default().to_string(),
        subaction: parts.next().map(str::to_string),
        action: parts.next().map(str::to_string),
        last_seen,
        frequency,
        avg_response_time: 0.0,
        error_rate: 0.0,
    }
}

fn four_id_registry() -> IdentifierRegistry {
    let mut registry = IdentifierRegistry::new();
    registry.initialize(vec![
        record("pandc.vnext.recommendations.view", 10, 1000),
        record("pandc.vnext.recommendations.click", 5, 2000),
        record("pandc.vnext.discovery.search", 7, 3000),
        record("platform.legacy.cart.add", 3, 4000),
    ]);
    registry
}

#[test]
fn replace_not_merge() {
    let mut registry = IdentifierRegistry::new();
    registry.add_entry(record("pandc.vnext.feed.load", 100, 1));
    registry.add_entry(record("pandc.vnext.feed.load", 200, 2));

    let stored = registry.get("pandc.vnext.feed.load").unwrap();
    assert_eq!(stored.frequency, 200, "second record wins wholesale");
    assert_eq!(registry.len(), 1);
}

#[test]
fn usage_increments_by_exactly_one() {
    let mut registry = IdentifierRegistry::new();
    registry.add_entry(record("pandc.vnext.feed.load", 0, 0));

    for _ in 0..5 {
        registry.record_usage("pandc.vnext.feed.load");
    }

    assert_eq!(registry.get("pandc.vnext.feed.load").unwrap().frequency, 5);
    let recent: Vec<String> = registry.get_recent(10).iter().map(|m| m.id.clone()).collect();
    assert!(recent.contains(&"pandc.vnext.feed.load".to_string()));
}

#[test]
fn prefix_search_returns_exactly_the_matching_ids() {
    let registry = four_id_registry();

    let hits = registry.search("pandc.vnext.rec", &SearchOptions::default());
    let mut ids: Vec<&str> = hits.iter().map(|s| s.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(
        ids,
        vec![
            "pandc.vnext.recommendations.click",
            "pandc.vnext.recommendations.view",
        ]
    );
}

#[test]
fn namespace_filter_on_empty_query() {
    let registry = four_id_registry();

    let options = SearchOptions {
        filter_by_namespace: Some("platform".to_string()),
        ..Default::default()
    };
    let hits = registry.search("", &options);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "platform.legacy.cart.add");
}

#[test]
fn alphabetical_sort_order() {
    let registry = four_id_registry();

    let options = SearchOptions {
        sort_by: SortBy::Alphabetical,
        ..Default::default()
    };
    let ids: Vec<String> = registry
        .search("pandc.vnext", &options)
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(
        ids,
        vec![
            "pandc.vnext.discovery.search",
            "pandc.vnext.recommendations.click",
            "pandc.vnext.recommendations.view",
        ]
    );
}

#[test]
fn recency_beats_equal_frequency_in_hotness() {
    let now = now_millis();
    let mut registry = IdentifierRegistry::new();
    registry.add_entry(record("ns.grp.sub.stale", 100, now - 10 * DAY_MS));
    registry.add_entry(record("ns.grp.sub.fresh", 100, now));

    let hot = registry.get_hot(10);
    assert_eq!(hot[0].id, "ns.grp.sub.fresh");
    assert_eq!(hot[1].id, "ns.grp.sub.stale");
    assert!(
        hot[0].score > hot[1].score,
        "equal frequency: fresher record must score strictly higher"
    );
}

#[test]
fn hot_trends_reflect_usage_direction() {
    let now = now_millis();
    let mut registry = IdentifierRegistry::new();
    registry.add_entry(record("ns.grp.sub.spike", 1, now));
    registry.add_entry(record("ns.grp.sub.workhorse", 2000, now));
    registry.add_entry(record("ns.grp.sub.abandoned", 2000, now - 60 * DAY_MS));

    let hot = registry.get_hot(10);
    let trend_of = |id: &str| hot.iter().find(|e| e.id.ends_with(id)).unwrap().trend;
    assert_eq!(trend_of("spike"), Trend::Rising);
    assert_eq!(trend_of("workhorse"), Trend::Stable);
    assert_eq!(trend_of("abandoned"), Trend::Falling);
}

#[test]
fn recent_list_is_bounded() {
    let mut registry = IdentifierRegistry::new();
    for i in 0..30 {
        registry.add_entry(record(&format!("ns.grp.sub.item{i}"), 0, 0));
    }

    let recent = registry.get_recent(20);
    assert_eq!(recent.len(), 20);
    // most recent insertion comes back first
    assert_eq!(recent[0].id, "ns.grp.sub.item29");
}

#[test]
fn snapshot_round_trip_is_exact() {
    let mut registry = four_id_registry();
    registry.record_usage("pandc.vnext.discovery.search");
    registry.record_usage("platform.legacy.cart.add");
    registry.record_usage("pandc.vnext.discovery.search");

    let exported = registry.export_state();
    let restored = IdentifierRegistry::from_state(exported.clone()).unwrap();
    let re_exported = restored.export_state();

    assert_eq!(re_exported.eids.len(), exported.eids.len());
    assert_eq!(re_exported.eids, exported.eids);
    assert_eq!(re_exported.recent, exported.recent);

    // observable behavior survives the round trip
    let options = SearchOptions::default();
    let before: Vec<String> = registry
        .search("pandc", &options)
        .into_iter()
        .map(|s| s.id)
        .collect();
    let after: Vec<String> = restored
        .search("pandc", &options)
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(before, after);

    let hot_before: Vec<String> = registry.get_hot(4).into_iter().map(|e| e.id).collect();
    let hot_after: Vec<String> = restored.get_hot(4).into_iter().map(|e| e.id).collect();
    assert_eq!(hot_before, hot_after);
}

#[test]
fn snapshot_json_round_trip_through_text() {
    let registry = four_id_registry();
    let json = registry.export_state().to_json();

    let state = eidx::registry::RegistryState::from_json(&json).unwrap();
    let restored = IdentifierRegistry::from_state(state).unwrap();
    assert_eq!(restored.len(), 4);
}

#[test]
fn unknown_id_usage_is_a_noop() {
    let mut registry = four_id_registry();
    let before = registry.export_state();

    registry.record_usage("does.not.exist");

    let after = registry.export_state();
    assert_eq!(before.eids, after.eids);
    assert_eq!(before.recent, after.recent);
}

fn synthetic_corpus(count: usize) -> Vec<IdentifierMetadata> {
    (0..count)
        .map(|i| {
            let id = format!(
                "ns{}.group{}.section{}.action{}",
                i % 11,
                i % 29,
                i % 97,
                i
            );
            record(&id, (i % 500) as u64, (i as u64) * 1000)
        })
        .collect()
}

#[test]
fn scale_initialize_under_one_second() {
    let records = synthetic_corpus(10_000);

    let mut registry = IdentifierRegistry::new();
    let start = Instant::now();
    registry.initialize(records);
    let elapsed = start.elapsed();

    assert_eq!(registry.len(), 10_000);
    assert!(
        elapsed < Duration::from_secs(1),
        "initialize of 10k records took {elapsed:?}"
    );
}

#[test]
fn scale_substring_search_under_ten_millis() {
    let mut registry = IdentifierRegistry::new();
    registry.initialize(synthetic_corpus(10_000));

    // not a prefix of any id, so this goes through the fuzzy fallback
    let start = Instant::now();
    let hits = registry.search("action1234", &SearchOptions::default());
    let elapsed = start.elapsed();

    assert!(!hits.is_empty());
    assert!(
        elapsed < Duration::from_millis(10),
        "substring search took {elapsed:?}"
    );
}

#[test]
fn scale_prefix_search_is_fast_and_correct() {
    let mut registry = IdentifierRegistry::new();
    registry.initialize(synthetic_corpus(10_000));

    let options = SearchOptions {
        limit: 50,
        ..Default::default()
    };
    let start = Instant::now();
    let hits = registry.search("ns7.group", &options);
    let elapsed = start.elapsed();

    assert_eq!(hits.len(), 50);
    assert!(hits.iter().all(|s| s.id.starts_with("ns7.group")));
    assert!(
        elapsed < Duration::from_millis(10),
        "prefix search took {elapsed:?}"
    );
}

#[test]
fn hierarchy_covers_every_record() {
    let mut registry = IdentifierRegistry::new();
    registry.initialize(synthetic_corpus(1_000));

    let nodes = registry.get_hierarchy();
    assert_eq!(nodes.len(), 11);

    let total: usize = nodes
        .iter()
        .flat_map(|n| n.children.values())
        .flat_map(|groups| groups.values())
        .map(|ids| ids.len())
        .sum();
    assert_eq!(total, 1_000);
}
