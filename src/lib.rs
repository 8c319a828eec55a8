//! # eidx - EID Discovery Index
//!
//! An in-memory discovery index for hierarchical, dot-delimited event
//! identifiers: type a few characters, get ranked and filterable
//! suggestions out of a working set of 10,000+ identifiers in
//! sub-millisecond time, with hot/recent tracking and an exact
//! snapshot/restore round-trip.
//!
//! ## Architecture
//!
//! Two layers, bottom-up:
//!
//! - [`index`] - Compressed prefix tree with exact, prefix, and fuzzy
//!   lookup. Domain-agnostic: it stores string keys and opaque values.
//! - [`registry`] - The domain layer: identifier metadata, search
//!   ranking, hotness scoring, the bounded recent list, the hierarchy
//!   view, and snapshot export/import.
//!
//! ## Quick Start
//!
//! ```
//! use eidx::registry::{IdentifierMetadata, IdentifierRegistry, SearchOptions};
//!
//! let mut registry = IdentifierRegistry::new();
//! registry.add_entry(IdentifierMetadata {
//!     id: "pandc.vnext.recommendations.feed".to_string(),
//!     namespace: "pandc".to_string(),
//!     group: "vnext".to_string(),
//!     subgroup: "recommendations".to_string(),
//!     subaction: Some("feed".to_string()),
//!     action: None,
//!     last_seen: 0,
//!     frequency: 0,
//!     avg_response_time: 0.0,
//!     error_rate: 0.0,
//! });
//!
//! let hits = registry.search("pandc.vnext.rec", &SearchOptions::default());
//! assert_eq!(hits[0].id, "pandc.vnext.recommendations.feed");
//! ```
//!
//! ## Performance
//!
//! Exact and prefix lookups descend the compressed tree in time
//! proportional to the query length, independent of corpus size. Fuzzy
//! matching is a bounded linear fallback with a cheap length prefilter
//! ahead of any edit-distance work. Bulk-loading 10,000 records and
//! searching them stays comfortably inside interactive latency budgets;
//! see `benches/registry.rs`.

pub mod index;
pub mod output;
pub mod registry;
pub mod utils;
