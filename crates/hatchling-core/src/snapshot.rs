//! Persistence boundary.
//!
//! Durable storage is a collaborator, not part of the engine: the core
//! hands opaque key -> blob pairs to a [`SnapshotStore`] and restores
//! from the same keys. Each of the four components serializes
//! independently, so a store can shard or version them however it likes.
//!
//! Persistence failures are contract-level recoverable: the runner logs
//! them and keeps ticking on the in-memory state.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use hatchling_evolution::EvolutionLedger;
use hatchling_memory::AssociativeMemory;
use hatchling_patterns::EventPatternAnalyzer;
use hatchling_survival::SurvivalCore;

use crate::clock::Clock;
use crate::organism::Organism;

/// Blob key for the survival core.
const KEY_SURVIVAL: &str = "survival";

/// Blob key for the associative memory.
const KEY_MEMORY: &str = "memory";

/// Blob key for the event analyzer.
const KEY_PATTERNS: &str = "patterns";

/// Blob key for the evolution ledger.
const KEY_EVOLUTION: &str = "evolution";

/// Errors that can occur at the persistence boundary.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// A component failed to serialize or deserialize.
    #[error("snapshot codec failure for {key}: {source}")]
    Codec {
        /// The blob key being processed.
        key: &'static str,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The store itself failed to save or load a blob.
    #[error("snapshot store failure for {key}: {reason}")]
    Store {
        /// The blob key being processed.
        key: String,
        /// Store-reported reason.
        reason: String,
    },
}

/// A bounded key -> blob store for periodic snapshots.
///
/// Implementations live outside the engine (disk, database, test
/// doubles); the engine only depends on this interface.
pub trait SnapshotStore {
    /// Save a blob under a key, replacing any previous value.
    fn save(&mut self, key: &str, blob: Vec<u8>) -> Result<(), SnapshotError>;

    /// Load the blob stored under a key, if any.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SnapshotError>;
}

/// An in-memory snapshot store, for tests and ephemeral runs.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStore {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl InMemorySnapshotStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            blobs: BTreeMap::new(),
        }
    }

    /// Number of blobs held.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn save(&mut self, key: &str, blob: Vec<u8>) -> Result<(), SnapshotError> {
        self.blobs.insert(key.to_owned(), blob);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SnapshotError> {
        Ok(self.blobs.get(key).cloned())
    }
}

fn encode<T: Serialize>(key: &'static str, value: &T) -> Result<Vec<u8>, SnapshotError> {
    serde_json::to_vec(value).map_err(|source| SnapshotError::Codec { key, source })
}

fn decode<T: DeserializeOwned>(key: &'static str, blob: &[u8]) -> Result<T, SnapshotError> {
    serde_json::from_slice(blob).map_err(|source| SnapshotError::Codec { key, source })
}

impl Organism {
    /// Save all four components into the store as opaque JSON blobs.
    pub fn save_snapshot(&self, store: &mut dyn SnapshotStore) -> Result<(), SnapshotError> {
        store.save(KEY_SURVIVAL, encode(KEY_SURVIVAL, &self.survival)?)?;
        store.save(KEY_MEMORY, encode(KEY_MEMORY, &self.memory)?)?;
        store.save(KEY_PATTERNS, encode(KEY_PATTERNS, &self.analyzer)?)?;
        store.save(KEY_EVOLUTION, encode(KEY_EVOLUTION, &self.ledger)?)?;
        debug!("snapshot saved");
        Ok(())
    }

    /// Restore a creature from a store, if a complete snapshot exists.
    ///
    /// Returns `Ok(None)` when any component blob is missing -- a partial
    /// snapshot is treated as no snapshot.
    pub fn load_snapshot(
        store: &dyn SnapshotStore,
        clock: Arc<dyn Clock>,
    ) -> Result<Option<Self>, SnapshotError> {
        let (Some(survival), Some(memory), Some(patterns), Some(evolution)) = (
            store.load(KEY_SURVIVAL)?,
            store.load(KEY_MEMORY)?,
            store.load(KEY_PATTERNS)?,
            store.load(KEY_EVOLUTION)?,
        ) else {
            return Ok(None);
        };

        let survival: SurvivalCore = decode(KEY_SURVIVAL, &survival)?;
        let memory: AssociativeMemory = decode(KEY_MEMORY, &memory)?;
        let analyzer: EventPatternAnalyzer = decode(KEY_PATTERNS, &patterns)?;
        let ledger: EvolutionLedger = decode(KEY_EVOLUTION, &evolution)?;

        info!("organism restored from snapshot");
        Ok(Some(Self::from_parts(
            clock, survival, memory, analyzer, ledger,
        )))
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap as Context;
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::CoreConfig;

    fn busy_organism(clock: Arc<ManualClock>) -> Organism {
        let mut organism = Organism::new(&CoreConfig::default(), clock);
        let _ = organism
            .process_stimulus("touch", "hold", Decimal::new(8, 1), Context::new())
            .unwrap();
        organism
            .learn_from_outcome("touch:hold", true, Decimal::from(20))
            .unwrap();
        organism.record_expectation("door_open", "greeting").unwrap();
        organism
    }

    #[test]
    fn snapshot_round_trips_the_whole_creature() {
        let clock = Arc::new(ManualClock::at_epoch());
        let organism = busy_organism(clock.clone());

        let mut store = InMemorySnapshotStore::new();
        organism.save_snapshot(&mut store).unwrap();
        assert_eq!(store.len(), 4);

        let restored = Organism::load_snapshot(&store, clock).unwrap().unwrap();
        assert_eq!(restored.survival_state(), organism.survival_state());
        assert_eq!(restored.memory_status(), organism.memory_status());
        assert_eq!(restored.analyzer_status(), organism.analyzer_status());
        assert_eq!(restored.evolution_summary(), organism.evolution_summary());
        assert_eq!(restored.predict_outcome("door_open"), Some("greeting"));
    }

    #[test]
    fn empty_store_restores_nothing() {
        let clock = Arc::new(ManualClock::at_epoch());
        let store = InMemorySnapshotStore::new();
        let restored = Organism::load_snapshot(&store, clock).unwrap();
        assert!(restored.is_none());
    }

    #[test]
    fn partial_snapshot_is_treated_as_missing() {
        let clock = Arc::new(ManualClock::at_epoch());
        let organism = busy_organism(clock.clone());

        let mut store = InMemorySnapshotStore::new();
        organism.save_snapshot(&mut store).unwrap();
        // Simulate a store that lost one blob.
        let mut crippled = InMemorySnapshotStore::new();
        for key in ["survival", "memory", "patterns"] {
            let blob = store.load(key).unwrap().unwrap();
            crippled.save(key, blob).unwrap();
        }

        let restored = Organism::load_snapshot(&crippled, clock).unwrap();
        assert!(restored.is_none());
    }
}
