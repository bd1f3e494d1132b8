//! The async tick loop.
//!
//! [`run_organism`] drives a shared creature on a fixed cadence: every
//! iteration takes the single-writer lock, ticks survival pressure, and
//! on the configured cadences runs memory decay and saves a snapshot.
//! Snapshot failures are logged and swallowed -- the tick loop never dies
//! because storage did.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use hatchling_types::SurvivalState;

use crate::config::RunnerConfig;
use crate::error::CoreError;
use crate::organism::{Organism, TickOutcome};
use crate::snapshot::SnapshotStore;

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying core error.
        #[from]
        source: CoreError,
    },
}

/// Result of a bounded run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Total ticks executed.
    pub total_ticks: u64,
    /// Death/rebirth boundaries crossed during the run.
    pub deaths: u64,
    /// The last survival state observed, if any tick completed.
    pub final_state: Option<SurvivalState>,
}

/// Callback invoked after each tick completes.
///
/// Implementations can log, publish, or advance a test clock. The
/// callback runs outside the organism lock.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, outcome: &TickOutcome);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _outcome: &TickOutcome) {}
}

/// Drive the creature until the configured tick limit is reached.
///
/// With `max_ticks == 0` the loop runs until the future is dropped
/// (cancellation is the caller's concern; a tick itself never blocks).
///
/// # Errors
///
/// Returns [`RunnerError::Tick`] if a tick fails unrecoverably. Snapshot
/// failures are *not* errors: they are logged and the loop continues.
pub async fn run_organism(
    organism: &Arc<Mutex<Organism>>,
    store: &mut dyn SnapshotStore,
    config: &RunnerConfig,
    callback: &mut dyn TickCallback,
) -> Result<RunSummary, RunnerError> {
    let mut total_ticks: u64 = 0;
    let mut deaths: u64 = 0;
    let mut final_state: Option<SurvivalState> = None;

    info!(
        tick_interval_ms = config.tick_interval_ms,
        max_ticks = config.max_ticks,
        "run starting"
    );

    loop {
        let tick_number = total_ticks.saturating_add(1);

        let outcome = {
            let mut guard = organism.lock().await;
            let outcome = guard.tick()?;

            if config.decay_every_ticks > 0 && tick_number % config.decay_every_ticks == 0 {
                guard.apply_decay();
            }

            if config.snapshot_every_ticks > 0 && tick_number % config.snapshot_every_ticks == 0 {
                if let Err(error) = guard.save_snapshot(store) {
                    // Storage trouble must never kill the creature.
                    warn!(%error, "snapshot failed, continuing unpersisted");
                }
            }

            outcome
        };

        total_ticks = tick_number;
        if outcome.rebirth.is_some() {
            deaths = deaths.saturating_add(1);
        }
        callback.on_tick(&outcome);
        final_state = Some(outcome.state);

        if config.max_ticks > 0 && total_ticks >= config.max_ticks {
            info!(total_ticks, deaths, "tick limit reached");
            return Ok(RunSummary {
                total_ticks,
                deaths,
                final_state,
            });
        }

        if config.tick_interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(config.tick_interval_ms)).await;
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use hatchling_survival::SurvivalConfig;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::CoreConfig;
    use crate::snapshot::{InMemorySnapshotStore, SnapshotError};

    /// Advances the shared manual clock after every tick, so drain
    /// intervals elapse between runner iterations.
    struct AdvanceClock {
        clock: Arc<ManualClock>,
        step_ms: i64,
    }

    impl TickCallback for AdvanceClock {
        fn on_tick(&mut self, _outcome: &TickOutcome) {
            self.clock.advance_ms(self.step_ms);
        }
    }

    /// A store that refuses every save.
    struct BrokenStore;

    impl SnapshotStore for BrokenStore {
        fn save(&mut self, key: &str, _blob: Vec<u8>) -> Result<(), SnapshotError> {
            Err(SnapshotError::Store {
                key: key.to_owned(),
                reason: String::from("disk on fire"),
            })
        }

        fn load(&self, _key: &str) -> Result<Option<Vec<u8>>, SnapshotError> {
            Ok(None)
        }
    }

    fn fast_config(max_ticks: u64) -> CoreConfig {
        CoreConfig {
            runner: RunnerConfig {
                tick_interval_ms: 0,
                decay_every_ticks: 2,
                snapshot_every_ticks: 3,
                max_ticks,
            },
            ..CoreConfig::default()
        }
    }

    fn shared_organism(config: &CoreConfig) -> (Arc<Mutex<Organism>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_epoch());
        let organism = Organism::new(config, clock.clone());
        (Arc::new(Mutex::new(organism)), clock)
    }

    #[tokio::test]
    async fn run_is_bounded_by_max_ticks() {
        let config = fast_config(5);
        let (organism, clock) = shared_organism(&config);
        let mut store = InMemorySnapshotStore::new();
        let mut callback = AdvanceClock {
            clock,
            step_ms: 1_000,
        };

        let summary = run_organism(&organism, &mut store, &config.runner, &mut callback)
            .await
            .unwrap();

        assert_eq!(summary.total_ticks, 5);
        assert_eq!(summary.deaths, 0);
        assert_eq!(summary.final_state.map(|s| s.is_alive), Some(true));
    }

    #[tokio::test]
    async fn snapshots_are_saved_on_cadence() {
        let config = fast_config(6);
        let (organism, clock) = shared_organism(&config);
        let mut store = InMemorySnapshotStore::new();
        let mut callback = AdvanceClock {
            clock,
            step_ms: 1_000,
        };

        let _ = run_organism(&organism, &mut store, &config.runner, &mut callback)
            .await
            .unwrap();

        // Ticks 3 and 6 saved; four blobs live in the store.
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn snapshot_failures_never_stop_the_loop() {
        let config = fast_config(6);
        let (organism, clock) = shared_organism(&config);
        let mut store = BrokenStore;
        let mut callback = AdvanceClock {
            clock,
            step_ms: 1_000,
        };

        let summary = run_organism(&organism, &mut store, &config.runner, &mut callback)
            .await
            .unwrap();

        assert_eq!(summary.total_ticks, 6);
    }

    #[tokio::test]
    async fn deaths_and_rebirths_are_counted() {
        let mut config = fast_config(4);
        // Drain most of the energy bar every interval: death on tick 2.
        config.survival = SurvivalConfig {
            drain_amount: Decimal::from(60),
            ..SurvivalConfig::default()
        };
        let (organism, clock) = shared_organism(&config);
        let mut store = InMemorySnapshotStore::new();
        let mut callback = AdvanceClock {
            clock,
            step_ms: 11_000,
        };

        let summary = run_organism(&organism, &mut store, &config.runner, &mut callback)
            .await
            .unwrap();

        assert_eq!(summary.total_ticks, 4);
        assert!(summary.deaths >= 1);
        // The creature that comes out of the run is alive (reborn).
        assert_eq!(summary.final_state.map(|s| s.is_alive), Some(true));
    }
}
