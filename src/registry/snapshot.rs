//! Durable registry state.
//!
//! `RegistryState` is the only persisted form of the registry: the full
//! record table, the recent list, and a cached hot list for cold-start
//! display. The prefix index is never serialized; it is rebuilt from the
//! record table on import. The payload is flat JSON with no cycles, so it
//! survives any key-value store the host cares to put it in.

use crate::registry::types::{HotEntry, IdentifierMetadata};
use crate::utils::now_millis;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Current snapshot format version
pub const STATE_VERSION: u32 = 1;

/// Recoverable failure while decoding or validating a snapshot. The
/// caller decides whether to fall back to an empty registry; nothing in
/// here should ever take the host process down.
#[derive(Debug, Error)]
pub enum StateFormatError {
    #[error("unsupported state version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("malformed state payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid record at position {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// The serializable snapshot of a registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryState {
    pub version: u32,
    /// Unix milliseconds at export time
    pub saved_at: u64,
    /// Every record held by the registry, ordered by id
    pub eids: Vec<IdentifierMetadata>,
    /// Recently used ids, most-recent-first
    pub recent: Vec<String>,
    /// Cached hot list from export time. Display-only on import; hotness
    /// is always recomputed from `eids`.
    pub hot: Vec<HotEntry>,
}

impl RegistryState {
    pub fn new(eids: Vec<IdentifierMetadata>, recent: Vec<String>, hot: Vec<HotEntry>) -> Self {
        Self {
            version: STATE_VERSION,
            saved_at: now_millis(),
            eids,
            recent,
            hot,
        }
    }

    /// Decode a snapshot from its JSON form, rejecting malformed payloads
    /// and unsupported versions
    pub fn from_json(raw: &str) -> Result<Self, StateFormatError> {
        let state: RegistryState = serde_json::from_str(raw)?;
        state.validate()?;
        Ok(state)
    }

    pub fn to_json(&self) -> String {
        // RegistryState contains only primitive-composed fields, so
        // serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Shape checks beyond what deserialization enforces
    pub fn validate(&self) -> Result<(), StateFormatError> {
        if self.version != STATE_VERSION {
            return Err(StateFormatError::UnsupportedVersion {
                found: self.version,
                expected: STATE_VERSION,
            });
        }
        for (index, record) in self.eids.iter().enumerate() {
            if record.id.is_empty() {
                return Err(StateFormatError::InvalidRecord {
                    index,
                    reason: "empty id".to_string(),
                });
            }
            if !(0.0..=1.0).contains(&record.error_rate) {
                return Err(StateFormatError::InvalidRecord {
                    index,
                    reason: format!("error_rate {} outside [0, 1]", record.error_rate),
                });
            }
        }
        Ok(())
    }

    /// Read and decode a snapshot file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Failed to decode state file {}", path.display()))
    }

    /// Encode and write a snapshot file, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize state")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write state file {}", path.display()))?;
        Ok(())
    }
}
