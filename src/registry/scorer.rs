//! Hotness scoring for identifiers.
//!
//! `score = frequency_weight * norm(frequency) + recency_weight * decay(age)`
//!
//! where `norm` log-scales frequency against the current table maximum and
//! `decay` is an exponential half-life falloff. The exact weighting is a
//! tunable heuristic; the load-bearing property is monotonicity: at equal
//! frequency, a more recent `last_seen` scores strictly higher.

use crate::registry::types::{HotEntry, IdentifierMetadata, Trend};
use serde::{Deserialize, Serialize};

/// Configurable weights for the hot-score formula
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotWeights {
    /// Share of the score contributed by normalized frequency
    pub frequency_weight: f64,
    /// Share of the score contributed by recency decay
    pub recency_weight: f64,
    /// Recency half-life in milliseconds (how fast the recency share decays)
    pub recency_half_life_ms: f64,
    /// Component gap (on the normalized [0, 1] scale) beyond which a
    /// trend reads as Rising or Falling instead of Stable
    pub trend_margin: f64,
}

impl Default for HotWeights {
    fn default() -> Self {
        Self {
            frequency_weight: 0.6,
            recency_weight: 0.4,
            recency_half_life_ms: 86_400_000.0 * 7.0, // 7 days
            trend_margin: 0.25,
        }
    }
}

/// Computes hot scores against a fixed observation time
pub struct HotScorer {
    weights: HotWeights,
    now_ms: u64,
}

impl HotScorer {
    pub fn new(weights: HotWeights, now_ms: u64) -> Self {
        Self { weights, now_ms }
    }

    /// Score one record. `max_frequency` is the current table maximum,
    /// used to normalize the frequency contribution.
    pub fn score(&self, meta: &IdentifierMetadata, max_frequency: u64) -> f64 {
        let freq = self.normalized_frequency(meta.frequency, max_frequency);
        let rec = self.recency_decay(meta.last_seen);
        self.weights.frequency_weight * freq + self.weights.recency_weight * rec
    }

    /// Build the full hot entry: score plus trend classification
    pub fn hot_entry(&self, meta: &IdentifierMetadata, max_frequency: u64) -> HotEntry {
        let freq = self.normalized_frequency(meta.frequency, max_frequency);
        let rec = self.recency_decay(meta.last_seen);

        let trend = if rec > freq + self.weights.trend_margin {
            // touched recently, disproportionate to raw frequency
            Trend::Rising
        } else if freq > rec + self.weights.trend_margin {
            // high frequency but not touched recently
            Trend::Falling
        } else {
            Trend::Stable
        };

        HotEntry {
            id: meta.id.clone(),
            score: self.weights.frequency_weight * freq + self.weights.recency_weight * rec,
            trend,
        }
    }

    /// Log-scaled frequency in [0, 1] relative to the table maximum
    fn normalized_frequency(&self, frequency: u64, max_frequency: u64) -> f64 {
        if max_frequency == 0 {
            return 0.0;
        }
        (frequency as f64 + 1.0).ln() / (max_frequency as f64 + 1.0).ln()
    }

    /// Exponential half-life decay in (0, 1]: 1.0 for a record touched at
    /// the observation instant, 0.5 one half-life ago. Strictly decreasing
    /// in age.
    fn recency_decay(&self, last_seen: u64) -> f64 {
        let age_ms = self.now_ms.saturating_sub(last_seen) as f64;
        (-age_ms * std::f64::consts::LN_2 / self.weights.recency_half_life_ms).exp()
    }
}
