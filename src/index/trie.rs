//! Compressed prefix tree over string keys.
//!
//! Nodes live in a single growable arena and reference their children by
//! `u32` index, so the whole structure has no pointer cycles and frees in
//! one shot. Edges carry multi-byte labels: chains of single-child nodes
//! are merged into one edge, so tree depth is bounded by the number of
//! branching points rather than by key length.

use crate::index::fuzzy::{self, FuzzyHit, MatchQuality};
use rustc_hash::FxHashMap;

/// Index of a node in the arena
type NodeId = u32;

/// Index of an entry in the entry table
type EntryId = u32;

const ROOT: NodeId = 0;

struct Node {
    /// Edge label leading into this node (empty for the root). Labels
    /// are raw bytes so edges can split anywhere, including inside a
    /// multi-byte UTF-8 sequence; entries keep the real `String` keys.
    label: Vec<u8>,
    /// Terminal entry stored at this node, if any
    entry: Option<EntryId>,
    /// Child node ids, sorted by the first byte of each child's label
    children: Vec<NodeId>,
}

impl Node {
    fn new(label: Vec<u8>) -> Self {
        Self {
            label,
            entry: None,
            children: Vec::new(),
        }
    }
}

/// One stored key with its value and an index-internal usage counter
struct Entry<V> {
    key: String,
    /// Cached lowercase form, populated only when it differs from `key`
    lower: Option<String>,
    value: V,
    hits: u64,
}

impl<V> Entry<V> {
    fn lower_key(&self) -> &str {
        self.lower.as_deref().unwrap_or(&self.key)
    }
}

/// A prefix tree mapping string keys to opaque values.
///
/// Exact and prefix lookups descend the tree in time proportional to the
/// key length, independent of how many keys are stored. Fuzzy lookup is a
/// bounded linear scan over the entry table and is meant as a fallback
/// when prefix search comes up short.
///
/// The index is key-content-agnostic: empty and oddly-shaped keys are
/// accepted, and no operation returns an error for string input.
pub struct PrefixIndex<V> {
    nodes: Vec<Node>,
    entries: Vec<Entry<V>>,
    by_key: FxHashMap<String, EntryId>,
}

impl<V> Default for PrefixIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PrefixIndex<V> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(Vec::new())],
            entries: Vec::new(),
            by_key: FxHashMap::default(),
        }
    }

    /// Insert a key, overwriting the value if the key is already present.
    /// The usage counter of an existing key survives the overwrite.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if let Some(&eid) = self.by_key.get(&key) {
            self.entries[eid as usize].value = value;
            return;
        }

        let eid = self.entries.len() as EntryId;
        let lower = key.to_lowercase();
        self.entries.push(Entry {
            lower: (lower != key).then_some(lower),
            key: key.clone(),
            value,
            hits: 0,
        });
        self.by_key.insert(key.clone(), eid);
        self.attach(eid, &key);
    }

    /// Exact-match lookup
    pub fn exact_lookup(&self, key: &str) -> Option<&V> {
        self.by_key
            .get(key)
            .map(|&eid| &self.entries[eid as usize].value)
    }

    /// All stored keys starting with `prefix`, truncated to `limit`.
    /// Results come back in insertion order.
    pub fn prefix_search(&self, prefix: &str, limit: usize) -> Vec<(&str, &V)> {
        let Some(start) = self.locate(prefix) else {
            return Vec::new();
        };

        let mut ids = Vec::new();
        self.collect_subtree(start, &mut ids);
        ids.sort_unstable();
        ids.truncate(limit);

        ids.into_iter()
            .map(|eid| {
                let entry = &self.entries[eid as usize];
                (entry.key.as_str(), &entry.value)
            })
            .collect()
    }

    /// Approximate lookup: keys containing `query` as a case-insensitive
    /// substring, or carrying a token within a small edit-distance budget
    /// of it. Results are ranked exact-prefix > substring > approximate,
    /// with the per-key usage counter breaking ties.
    pub fn fuzzy_search(&self, query: &str, limit: usize) -> Vec<FuzzyHit<'_, V>> {
        if query.is_empty() {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        let finder = memchr::memmem::Finder::new(needle.as_bytes());
        let budget = fuzzy::edit_budget(needle.len());

        let mut hits: Vec<(usize, FuzzyHit<'_, V>)> = Vec::new();
        for (eid, entry) in self.entries.iter().enumerate() {
            let haystack = entry.lower_key();
            let matched = match finder.find(haystack.as_bytes()) {
                Some(0) => Some((MatchQuality::Prefix, (0, needle.len()))),
                Some(pos) => Some((MatchQuality::Substring, (pos, needle.len()))),
                None => fuzzy::best_token_match(haystack, &needle, budget)
                    .map(|span| (MatchQuality::Approximate, span)),
            };
            if let Some((quality, span)) = matched {
                hits.push((
                    eid,
                    FuzzyHit {
                        key: &entry.key,
                        value: &entry.value,
                        quality,
                        span,
                        hits: entry.hits,
                    },
                ));
            }
        }

        hits.sort_by(|(a_id, a), (b_id, b)| {
            b.quality
                .cmp(&a.quality)
                .then(b.hits.cmp(&a.hits))
                .then(a_id.cmp(b_id))
        });
        hits.truncate(limit);
        hits.into_iter().map(|(_, hit)| hit).collect()
    }

    /// Increment the usage counter for a key. Unknown keys are ignored.
    pub fn bump(&mut self, key: &str, delta: u64) {
        if let Some(&eid) = self.by_key.get(key) {
            self.entries[eid as usize].hits += delta;
        }
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// All stored keys in insertion order
    pub fn all_keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    /// Number of arena nodes currently allocated
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::new(Vec::new()));
        self.entries.clear();
        self.by_key.clear();
    }

    // --- tree internals ---

    /// Walk the tree and hang `eid` off the node for `key`, splitting
    /// edges as needed.
    fn attach(&mut self, eid: EntryId, key: &str) {
        let mut node = ROOT;
        let mut rest = key.as_bytes();

        loop {
            if rest.is_empty() {
                self.nodes[node as usize].entry = Some(eid);
                return;
            }

            match self.find_child(node, rest[0]) {
                None => {
                    let leaf = self.push_node(Node::new(rest.to_vec()));
                    self.nodes[leaf as usize].entry = Some(eid);
                    self.add_child(node, leaf);
                    return;
                }
                Some(child) => {
                    let label = &self.nodes[child as usize].label;
                    let common = common_prefix_len(label, rest);
                    if common < label.len() {
                        self.split_edge(child, common);
                    }
                    node = child;
                    rest = &rest[common..];
                }
            }
        }
    }

    /// Split the edge into `node` at byte offset `at`, pushing the tail of
    /// the label (and the node's entry/children) down into a new child.
    fn split_edge(&mut self, node: NodeId, at: usize) {
        let tail_label = self.nodes[node as usize].label.split_off(at);
        let mut tail = Node::new(tail_label);
        tail.entry = self.nodes[node as usize].entry.take();
        tail.children = std::mem::take(&mut self.nodes[node as usize].children);

        let tail_id = self.push_node(tail);
        self.nodes[node as usize].children.push(tail_id);
    }

    /// Find the node whose subtree holds every key starting with `prefix`.
    /// Returns `None` when no stored key has that prefix.
    fn locate(&self, prefix: &str) -> Option<NodeId> {
        let mut node = ROOT;
        let mut rest = prefix.as_bytes();

        loop {
            if rest.is_empty() {
                return Some(node);
            }
            let child = self.find_child(node, rest[0])?;
            let label = &self.nodes[child as usize].label;
            let common = common_prefix_len(label, rest);

            if common == rest.len() {
                // Prefix exhausted, possibly mid-edge: the whole subtree matches
                return Some(child);
            }
            if common < label.len() {
                return None;
            }
            node = child;
            rest = &rest[common..];
        }
    }

    fn collect_subtree(&self, start: NodeId, out: &mut Vec<EntryId>) {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            if let Some(eid) = node.entry {
                out.push(eid);
            }
            stack.extend_from_slice(&node.children);
        }
    }

    fn find_child(&self, node: NodeId, first: u8) -> Option<NodeId> {
        let children = &self.nodes[node as usize].children;
        children
            .binary_search_by_key(&first, |&c| self.nodes[c as usize].label[0])
            .ok()
            .map(|pos| children[pos])
    }

    fn add_child(&mut self, node: NodeId, child: NodeId) {
        let first = self.nodes[child as usize].label[0];
        let children = &self.nodes[node as usize].children;
        let pos = children
            .binary_search_by_key(&first, |&c| self.nodes[c as usize].label[0])
            .unwrap_or_else(|pos| pos);
        self.nodes[node as usize].children.insert(pos, child);
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }
}

/// Length of the shared prefix of `a` and `b`
fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
