//! Creature engine binary for the Hatchling simulation.
//!
//! This is the composition root: it wires the clock, configuration,
//! snapshot store, and tick runner around one creature and runs a
//! bounded demonstration session with a small scripted stimulus feed.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `hatchling-config.yaml` (or defaults)
//! 3. Create the clock and the creature
//! 4. Feed a few scripted stimuli and interactions
//! 5. Run the tick loop until the configured limit
//! 6. Log the final survival state and component summaries

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hatchling_core::{
    CoreConfig, InMemorySnapshotStore, Organism, SystemClock, TickCallback, TickOutcome,
    run_organism,
};
use hatchling_types::InteractionKind;

/// Default configuration file looked up next to the binary's working
/// directory.
const CONFIG_PATH: &str = "hatchling-config.yaml";

/// Tick bound applied when the configuration leaves the run unbounded;
/// the demo should always terminate.
const DEMO_TICK_LIMIT: u64 = 30;

/// Logs the creature's expression every few ticks.
struct ExpressionLogger {
    every: u64,
    seen: u64,
}

impl TickCallback for ExpressionLogger {
    fn on_tick(&mut self, outcome: &TickOutcome) {
        self.seen = self.seen.saturating_add(1);
        if let Some(genetic) = &outcome.rebirth {
            info!(
                generation = genetic.generation,
                inherited_fears = genetic.inherited_fears.len(),
                "creature was reborn"
            );
        }
        if self.every > 0 && self.seen % self.every == 0 {
            info!(
                energy = %outcome.state.energy,
                comfort = %outcome.state.comfort,
                loneliness = %outcome.state.loneliness,
                curiosity = %outcome.state.curiosity,
                "vital signs"
            );
        }
    }
}

/// Application entry point for the creature engine.
///
/// # Errors
///
/// Returns an error if configuration loading or the run itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("hatchling-engine starting");

    // 2. Load configuration.
    let mut config = if Path::new(CONFIG_PATH).exists() {
        CoreConfig::from_file(Path::new(CONFIG_PATH))?
    } else {
        CoreConfig::default()
    };
    if config.runner.max_ticks == 0 {
        config.runner.max_ticks = DEMO_TICK_LIMIT;
    }
    info!(
        tick_interval_ms = config.runner.tick_interval_ms,
        max_ticks = config.runner.max_ticks,
        "configuration loaded"
    );

    // 3. Create the clock and the creature.
    let clock = Arc::new(SystemClock);
    let organism = Arc::new(Mutex::new(Organism::new(&config, clock)));
    let mut store = InMemorySnapshotStore::new();

    // 4. A small scripted feed: the caretaker arrives, touches, feeds.
    {
        let mut guard = organism.lock().await;

        let response =
            guard.process_stimulus("touch", "hold", Decimal::new(8, 1), BTreeMap::new())?;
        info!(reaction = ?response.reaction, "first touch");

        guard.learn_from_outcome("touch:hold", true, Decimal::from(20))?;
        let response =
            guard.process_stimulus("touch", "hold", Decimal::new(8, 1), BTreeMap::new())?;
        info!(reaction = ?response.reaction, "second touch");

        let trust = guard.interact("caretaker", InteractionKind::Feeding)?;
        info!(%trust, "caretaker fed the creature");

        let mut rng = rand::rng();
        let expression = guard.express(&mut rng);
        info!(kind = ?expression.kind, sound = %expression.sound, "creature expressed itself");
    }

    // 5. Run the tick loop.
    let mut callback = ExpressionLogger { every: 10, seen: 0 };
    let summary = run_organism(&organism, &mut store, &config.runner, &mut callback).await?;

    // 6. Log the result.
    info!(
        total_ticks = summary.total_ticks,
        deaths = summary.deaths,
        "run complete"
    );
    let guard = organism.lock().await;
    let state = guard.survival_state();
    info!(
        is_alive = state.is_alive,
        energy = %state.energy,
        integrity = %state.integrity,
        stability = %state.stability,
        "final survival state"
    );
    let memory = guard.memory_status();
    let analyzer = guard.analyzer_status();
    let evolution = guard.evolution_summary();
    info!(
        neurons = memory.neuron_count,
        synapses = memory.synapse_count,
        neural_patterns = memory.pattern_count,
        events = analyzer.event_count,
        event_patterns = analyzer.total_patterns,
        generation = evolution.generation,
        dominant_trait = %evolution.dominant_trait,
        "component summaries"
    );

    Ok(())
}
