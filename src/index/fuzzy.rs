//! Approximate match policy for the prefix index.
//!
//! A query that is not a strict prefix can still surface results: first as
//! a case-insensitive substring, then by comparing the query against the
//! individual tokens of a key (the runs between separator bytes) under a
//! small edit-distance budget. Ranking is exact-prefix > substring >
//! approximate.

/// How a key satisfied a fuzzy query. Variants are declared weakest-first
/// so the derived ordering ranks `Prefix` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchQuality {
    /// A token of the key is within the edit-distance budget of the query
    Approximate,
    /// The query occurs inside the key
    Substring,
    /// The key starts with the query
    Prefix,
}

impl MatchQuality {
    /// Rank contribution in [0, 1] for callers that fold match quality
    /// into a composite score
    pub fn weight(self) -> f64 {
        match self {
            MatchQuality::Prefix => 1.0,
            MatchQuality::Substring => 0.75,
            MatchQuality::Approximate => 0.5,
        }
    }
}

/// A single fuzzy-search result borrowed from the index
pub struct FuzzyHit<'a, V> {
    pub key: &'a str,
    pub value: &'a V,
    pub quality: MatchQuality,
    /// Byte offset and length of the matched region of `key`
    pub span: (usize, usize),
    /// Index-internal usage counter at match time (tie-breaker)
    pub hits: u64,
}

/// Edit-distance budget for a query of `len` bytes. Short queries get a
/// single edit so they don't match half the corpus.
pub fn edit_budget(len: usize) -> usize {
    if len < 6 { 1 } else { 2 }
}

/// Bytes that belong to a token: ASCII alphanumerics plus anything
/// non-ASCII (so multi-byte chars never get split). Separators are the
/// ASCII punctuation between segments, which are always char boundaries.
fn is_token_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte >= 0x80
}

/// Split a key into its tokens with byte offsets.
/// `pandc.vnext.feed` yields `(0, "pandc")`, `(6, "vnext")`, `(12, "feed")`.
pub fn tokenize(key: &str) -> impl Iterator<Item = (usize, &str)> {
    let bytes = key.as_bytes();
    let mut pos = 0usize;
    std::iter::from_fn(move || {
        while pos < bytes.len() && !is_token_byte(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() {
            return None;
        }
        let start = pos;
        while pos < bytes.len() && is_token_byte(bytes[pos]) {
            pos += 1;
        }
        Some((start, &key[start..pos]))
    })
}

/// Folded character-set bitmask of a string. Two strings within `d`
/// edits of each other differ in at most `2 * d` set elements, so the
/// popcount of the xor of their masks gives a cheap lower bound on edit
/// distance (bit collisions only make the bound more conservative).
fn char_mask(s: &str) -> u64 {
    let mut mask = 0u64;
    for &byte in s.as_bytes() {
        mask |= 1 << (byte.to_ascii_lowercase() as u64 % 64);
    }
    mask
}

/// Best token of `key` within `budget` edits of `query`, as a byte span.
/// Tokens ruled out by length or by the character-set bound are skipped
/// before any distance computation, which keeps the scan cheap on large
/// corpora.
pub fn best_token_match(key: &str, query: &str, budget: usize) -> Option<(usize, usize)> {
    let query_mask = char_mask(query);
    let mut best: Option<(usize, (usize, usize))> = None;
    for (start, token) in tokenize(key) {
        if token.len().abs_diff(query.len()) > budget {
            continue;
        }
        let set_diff = (char_mask(token) ^ query_mask).count_ones() as usize;
        if set_diff.div_ceil(2) > budget {
            continue;
        }
        let distance = strsim::levenshtein(token, query);
        if distance > budget {
            continue;
        }
        match best {
            Some((best_distance, _)) if best_distance <= distance => {}
            _ => best = Some((distance, (start, token.len()))),
        }
    }
    best.map(|(_, span)| span)
}
