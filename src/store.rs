//! Virtual artifact store and synthetic-key helpers.
//!
//! A process-lifetime side table mapping synthetic keys to resolved
//! artifacts. Producers `put`, consumers `get`; there is no iteration,
//! deletion, or expiry. Entries live for the duration of one compilation
//! run and a `put` under an existing key is a full replacement
//! (last-write-wins, no merging).
//!
//! The store is an owned service constructed by the host and passed into
//! the pipeline, so test suites and concurrent builds never share hidden
//! state.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::artifact::Artifact;

/// Prefix marking a synthetic key. Synthetic keys are lookup tokens into
/// the store, never real filesystem or network locations.
pub const VIRTUAL_PREFIX: &str = "virtual:";

/// Derive the synthetic key for a document path.
pub fn virtual_key(path: &str) -> String {
    format!("{VIRTUAL_PREFIX}{path}")
}

/// True if an identifier is a synthetic key.
pub fn is_virtual_key(identifier: &str) -> bool {
    identifier.starts_with(VIRTUAL_PREFIX)
}

/// Recover the originating path from a synthetic key.
pub fn strip_virtual_prefix(key: &str) -> Option<&str> {
    key.strip_prefix(VIRTUAL_PREFIX)
}

/// Keyed store of resolved artifacts.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    entries: RwLock<FxHashMap<String, Artifact>>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace unconditionally.
    pub fn put(&self, key: impl Into<String>, artifact: Artifact) {
        let key = key.into();
        tracing::debug!(%key, "artifact stored");
        self.entries.write().insert(key, artifact);
    }

    /// Targeted lookup; `None` is the not-found signal.
    pub fn get(&self, key: &str) -> Option<Artifact> {
        self.entries.read().get(key).cloned()
    }
}
