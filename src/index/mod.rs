pub mod fuzzy;
pub mod trie;

pub use fuzzy::{FuzzyHit, MatchQuality};
pub use trie::PrefixIndex;
