//! The survival state machine.
//!
//! Three resources keep the creature alive: energy (drains constantly),
//! integrity (damaged by threats), and stability (eroded by chaos). The
//! moment any of them reaches zero the life ends. Five drives -- hunger,
//! fear, comfort, loneliness, curiosity -- steer behavior between those
//! extremes.
//!
//! The core knows nothing about *what* stimuli are. It only remembers
//! whether a stimulus key helped or hurt survival in the past (pain and
//! pleasure memories), how much it trusts each entity it has met (bonding
//! memory), and one cause -> effect expectation slot per observed cause.
//!
//! Every mutation clamps scores to the 0-100 range. All arithmetic uses
//! checked operations. Time never comes from the ambient environment:
//! callers pass `now` explicitly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use hatchling_types::{DeathCause, InteractionKind, LifeId, Reaction, Response, SurvivalState};

use crate::config::SurvivalConfig;
use crate::death::check_death;
use crate::error::SurvivalError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Expectation slot that tracks the most recent unexplained stimulus, so a
/// later outcome can be attributed to it.
const LAST_UNKNOWN_SLOT: &str = "last_unknown";

/// Trust score assumed for entities the creature has never met.
fn neutral_trust() -> Decimal {
    Decimal::from(50)
}

/// Trust score above which a bond counts as strong.
fn strong_bond_threshold() -> Decimal {
    Decimal::from(80)
}

/// Multiplier applied to pleasure levels when restoring energy (0.5).
fn pleasure_energy_factor() -> Decimal {
    Decimal::new(5, 1)
}

/// Multiplier applied to curiosity when sizing a curious reaction (0.5).
fn curious_interest_factor() -> Decimal {
    Decimal::new(5, 1)
}

/// Multiplier applied to stimulus intensity when easing loneliness (10).
fn loneliness_relief_factor() -> Decimal {
    Decimal::TEN
}

/// Curiosity gained per unit of positive outcome magnitude (0.1).
fn curiosity_reward_factor() -> Decimal {
    Decimal::new(1, 1)
}

/// Curiosity lost per unit of negative outcome magnitude (0.05).
fn curiosity_penalty_factor() -> Decimal {
    Decimal::new(5, 2)
}

/// Integrity lost per unit of negative outcome magnitude (0.1).
fn harm_integrity_factor() -> Decimal {
    Decimal::new(1, 1)
}

/// Stability cost of a conflicting expectation (1).
fn expectation_conflict_cost() -> Decimal {
    Decimal::ONE
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the canonical stimulus key from a stimulus type and data pair.
pub fn stimulus_key(kind: &str, data: &str) -> String {
    format!("{kind}:{data}")
}

/// Clamp a score to the valid 0-100 range.
fn clamp_score(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// Add `delta` to `current` and clamp to 0-100.
fn raise(current: Decimal, delta: Decimal, context: &str) -> Result<Decimal, SurvivalError> {
    let raw = current
        .checked_add(delta)
        .ok_or_else(|| SurvivalError::ArithmeticOverflow {
            context: context.to_owned(),
        })?;
    Ok(clamp_score(raw))
}

/// Subtract `delta` from `current` and clamp to 0-100.
fn lower(current: Decimal, delta: Decimal, context: &str) -> Result<Decimal, SurvivalError> {
    let raw = current
        .checked_sub(delta)
        .ok_or_else(|| SurvivalError::ArithmeticOverflow {
            context: context.to_owned(),
        })?;
    Ok(clamp_score(raw))
}

/// Multiply two scores with overflow checking.
fn scale(value: Decimal, factor: Decimal, context: &str) -> Result<Decimal, SurvivalError> {
    value
        .checked_mul(factor)
        .ok_or_else(|| SurvivalError::ArithmeticOverflow {
            context: context.to_owned(),
        })
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Whether the current life is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Lifecycle {
    /// Resources are all positive.
    Alive,
    /// A resource bottomed out; the instance is frozen.
    Dead {
        /// Which resource was exhausted.
        cause: DeathCause,
        /// When the death transition was taken.
        at: DateTime<Utc>,
    },
}

// ---------------------------------------------------------------------------
// SurvivalCore
// ---------------------------------------------------------------------------

/// The resource-depletion state machine driving one life of the creature.
///
/// A `SurvivalCore` is created once per generation. When a resource reaches
/// zero the instance becomes immutable: every mutating operation turns into
/// a no-op that reports the terminal state. [`rebirth`](Self::rebirth)
/// resets the instance for the next generation, seeded with the pain of
/// past death causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurvivalCore {
    /// The identity of the current life.
    life_id: LifeId,

    /// Alive or frozen-dead.
    lifecycle: Lifecycle,

    // Resources (0-100; zero is fatal).
    energy: Decimal,
    integrity: Decimal,
    stability: Decimal,

    // Drives (0-100).
    hunger: Decimal,
    fear: Decimal,
    comfort: Decimal,
    loneliness: Decimal,
    curiosity: Decimal,

    /// Stimulus key -> remembered pain level.
    pain: BTreeMap<String, Decimal>,

    /// Stimulus key -> remembered pleasure level. A key never holds both
    /// a pain and a pleasure entry at once.
    pleasure: BTreeMap<String, Decimal>,

    /// Entity id -> trust level.
    bonding: BTreeMap<String, Decimal>,

    /// Cause -> expected effect, one slot per cause.
    expectations: BTreeMap<String, String>,

    /// Last time energy was drained.
    last_drain: DateTime<Utc>,

    /// Last time anything interacted with the creature.
    last_interaction: DateTime<Utc>,

    /// When this life began.
    existence_start: DateTime<Utc>,

    /// Tunable drain rates and thresholds.
    config: SurvivalConfig,
}

impl SurvivalCore {
    /// Create a freshly born survival core.
    ///
    /// Resources start full; curiosity starts high (80) because exploration
    /// is how everything is learned; all other drives start at their
    /// resting values.
    pub fn new(config: SurvivalConfig, now: DateTime<Utc>) -> Self {
        let core = Self {
            life_id: LifeId::new(),
            lifecycle: Lifecycle::Alive,
            energy: Decimal::ONE_HUNDRED,
            integrity: Decimal::ONE_HUNDRED,
            stability: Decimal::ONE_HUNDRED,
            hunger: Decimal::ZERO,
            fear: Decimal::ZERO,
            comfort: Decimal::from(50),
            loneliness: Decimal::ZERO,
            curiosity: Decimal::from(80),
            pain: BTreeMap::new(),
            pleasure: BTreeMap::new(),
            bonding: BTreeMap::new(),
            expectations: BTreeMap::new(),
            last_drain: now,
            last_interaction: now,
            existence_start: now,
            config,
        };
        info!(life_id = %core.life_id, "survival core initialized, existence begins");
        core
    }

    /// Whether the creature is currently alive.
    pub const fn is_alive(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Alive)
    }

    /// The identity of the current life.
    pub const fn life_id(&self) -> LifeId {
        self.life_id
    }

    /// The active configuration.
    pub const fn config(&self) -> &SurvivalConfig {
        &self.config
    }

    /// Snapshot the observable state.
    ///
    /// For a dead instance the snapshot is frozen at the moment of death;
    /// `existence_ms` stops counting.
    pub fn state(&self, now: DateTime<Utc>) -> SurvivalState {
        let (is_alive, cause_of_death, end) = match self.lifecycle {
            Lifecycle::Alive => (true, None, now),
            Lifecycle::Dead { cause, at } => (false, Some(cause), at),
        };
        SurvivalState {
            life_id: self.life_id,
            is_alive,
            cause_of_death,
            energy: self.energy,
            integrity: self.integrity,
            stability: self.stability,
            hunger: self.hunger,
            fear: self.fear,
            comfort: self.comfort,
            loneliness: self.loneliness,
            curiosity: self.curiosity,
            existence_ms: end.signed_duration_since(self.existence_start).num_milliseconds(),
        }
    }

    // -----------------------------------------------------------------------
    // The heartbeat
    // -----------------------------------------------------------------------

    /// Advance the survival pressure for the current wall-clock instant.
    ///
    /// Drain is gated by the stored last-drain timestamp, so calling this
    /// at any frequency above the drain interval yields the same drain
    /// series -- two calls inside one interval never double-drain.
    ///
    /// # Order of operations
    ///
    /// 1. Energy drain (if the drain interval elapsed), hunger recompute
    /// 2. Loneliness rise / comfort decay (if the interaction timeout elapsed)
    /// 3. Stability erosion (while fear or loneliness pressure is high)
    /// 4. Death check (energy, then integrity, then stability)
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<SurvivalState, SurvivalError> {
        if !self.is_alive() {
            return Ok(self.state(now));
        }

        // 1. Metabolism: energy drains, hunger mirrors the deficit.
        let since_drain = now.signed_duration_since(self.last_drain).num_milliseconds();
        if since_drain > self.config.drain_interval_ms {
            self.energy = lower(self.energy, self.config.drain_amount, "energy drain")?;
            self.last_drain = now;
            self.hunger = lower(Decimal::ONE_HUNDRED, self.energy, "hunger recompute")?;
        }

        // 2. Isolation pressure.
        let since_interaction = now
            .signed_duration_since(self.last_interaction)
            .num_milliseconds();
        if since_interaction > self.config.interaction_timeout_ms {
            self.loneliness = raise(self.loneliness, self.config.loneliness_rise, "loneliness rise")?;
            self.comfort = lower(self.comfort, self.config.comfort_decay, "comfort decay")?;
        }

        // 3. Chaos pressure.
        if self.fear > self.config.fear_pressure_threshold
            || self.loneliness > self.config.loneliness_pressure_threshold
        {
            self.stability = lower(self.stability, self.config.stability_decay, "stability decay")?;
        }

        // 4. Death check.
        if let Some(cause) = check_death(self.energy, self.integrity, self.stability) {
            warn!(life_id = %self.life_id, %cause, "resources exhausted, life ended");
            self.lifecycle = Lifecycle::Dead { cause, at: now };
        }

        Ok(self.state(now))
    }

    // -----------------------------------------------------------------------
    // Stimulus processing
    // -----------------------------------------------------------------------

    /// React to a stimulus from the environment.
    ///
    /// The creature does not know what anything *is*; it only checks its
    /// pain memory, then its pleasure memory, and treats everything else
    /// as unknown -- explored if curiosity is high enough, avoided
    /// otherwise. Every stimulus counts as interaction and eases
    /// loneliness in proportion to its intensity.
    ///
    /// # Errors
    ///
    /// Returns [`SurvivalError::InvalidStimulus`] for an empty type or
    /// data field; no state is mutated in that case.
    pub fn process_stimulus(
        &mut self,
        kind: &str,
        data: &str,
        intensity: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Response, SurvivalError> {
        if kind.trim().is_empty() {
            warn!("rejected stimulus with empty type");
            return Err(SurvivalError::InvalidStimulus {
                reason: String::from("empty stimulus type"),
            });
        }
        if data.trim().is_empty() {
            warn!(kind, "rejected stimulus with empty data");
            return Err(SurvivalError::InvalidStimulus {
                reason: String::from("empty stimulus data"),
            });
        }
        if !self.is_alive() {
            return Ok(Response {
                reaction: Reaction::Neutral,
                intensity: Decimal::ZERO,
            });
        }

        self.last_interaction = now;
        let relief = scale(intensity, loneliness_relief_factor(), "loneliness relief")?;
        self.loneliness = lower(self.loneliness, relief, "loneliness relief")?;

        let key = stimulus_key(kind, data);

        if let Some(pain_level) = self.pain.get(&key).copied() {
            // Known pain: recoil.
            self.fear = raise(self.fear, pain_level, "fear response")?;
            debug!(%key, %pain_level, "known painful stimulus");
            return Ok(Response {
                reaction: Reaction::Fear,
                intensity: pain_level,
            });
        }

        if let Some(pleasure_level) = self.pleasure.get(&key).copied() {
            // Known pleasure: seek more.
            self.comfort = raise(self.comfort, pleasure_level, "comfort gain")?;
            let energy_gain = scale(pleasure_level, pleasure_energy_factor(), "pleasure energy")?;
            self.energy = raise(self.energy, energy_gain, "pleasure energy")?;
            debug!(%key, %pleasure_level, "known pleasant stimulus");
            return Ok(Response {
                reaction: Reaction::Pleasure,
                intensity: pleasure_level,
            });
        }

        if self.curiosity > self.config.explore_threshold {
            // Unknown and curious: explore at a small energy cost, and
            // remember the key so a later outcome can be attributed to it.
            self.energy = lower(self.energy, self.config.exploration_cost, "exploration cost")?;
            self.expectations
                .insert(String::from(LAST_UNKNOWN_SLOT), key.clone());
            let interest = scale(self.curiosity, curious_interest_factor(), "curious interest")?;
            debug!(%key, "unknown stimulus, exploring");
            return Ok(Response {
                reaction: Reaction::Curious,
                intensity: interest,
            });
        }

        // Unknown and wary: keep away.
        let wariness = lower(Decimal::from(50), self.curiosity, "wariness")?;
        debug!(%key, "unknown stimulus, avoiding");
        Ok(Response {
            reaction: Reaction::Cautious,
            intensity: wariness,
        })
    }

    /// Learn whether a previously experienced stimulus helped or hurt.
    ///
    /// This is the only way pain and pleasure memories are created or
    /// strengthened. The two memories are mutually exclusive per key:
    /// recording one evicts the other. Negative outcomes also damage
    /// integrity in proportion to their magnitude.
    pub fn learn_from_outcome(
        &mut self,
        key: &str,
        was_positive: bool,
        magnitude: Decimal,
    ) -> Result<(), SurvivalError> {
        if key.trim().is_empty() {
            warn!("rejected outcome with empty stimulus key");
            return Err(SurvivalError::InvalidStimulus {
                reason: String::from("empty stimulus key"),
            });
        }
        if !self.is_alive() {
            return Ok(());
        }

        if was_positive {
            let current = self.pleasure.get(key).copied().unwrap_or(Decimal::ZERO);
            let strengthened = raise(current, magnitude, "pleasure memory")?;
            self.pleasure.insert(key.to_owned(), strengthened);
            self.pain.remove(key);

            // Exploring led to something good: explore more.
            let reward = scale(magnitude, curiosity_reward_factor(), "curiosity reward")?;
            self.curiosity = raise(self.curiosity, reward, "curiosity reward")?;
            info!(%key, %magnitude, "learned positive outcome");
        } else {
            let current = self.pain.get(key).copied().unwrap_or(Decimal::ZERO);
            let strengthened = raise(current, magnitude, "pain memory")?;
            self.pain.insert(key.to_owned(), strengthened);
            self.pleasure.remove(key);

            // Danger found: explore less, but never stop entirely.
            let penalty = scale(magnitude, curiosity_penalty_factor(), "curiosity penalty")?;
            self.curiosity =
                lower(self.curiosity, penalty, "curiosity penalty")?.max(self.config.curiosity_floor);

            let damage = scale(magnitude, harm_integrity_factor(), "integrity damage")?;
            self.integrity = lower(self.integrity, damage, "integrity damage")?;
            info!(%key, %magnitude, "learned negative outcome");
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Bonding
    // -----------------------------------------------------------------------

    /// Process an interaction from a specific entity.
    ///
    /// Each interaction kind applies a fixed trust delta plus secondary
    /// resource effects; trust is clamped to 0-100. Returns the entity's
    /// new trust level.
    pub fn process_entity_interaction(
        &mut self,
        entity_id: &str,
        kind: InteractionKind,
        now: DateTime<Utc>,
    ) -> Result<Decimal, SurvivalError> {
        if entity_id.trim().is_empty() {
            warn!("rejected interaction with empty entity id");
            return Err(SurvivalError::InvalidStimulus {
                reason: String::from("empty entity id"),
            });
        }
        if !self.is_alive() {
            return Ok(self.trust_level(entity_id));
        }

        let trust_delta = match kind {
            InteractionKind::GentleTouch => Decimal::from(5),
            InteractionKind::Feeding => Decimal::from(10),
            InteractionKind::Teaching => Decimal::from(3),
            InteractionKind::Presence => Decimal::ONE,
            InteractionKind::Harm => Decimal::from(-20),
            InteractionKind::Abandonment => Decimal::from(-5),
        };

        match kind {
            InteractionKind::GentleTouch => {
                self.comfort = raise(self.comfort, Decimal::TEN, "touch comfort")?;
                self.energy = raise(self.energy, Decimal::TWO, "touch energy")?;
            }
            InteractionKind::Feeding => {
                self.energy = raise(self.energy, Decimal::from(30), "feeding energy")?;
                self.hunger = lower(self.hunger, Decimal::from(30), "feeding hunger")?;
            }
            InteractionKind::Teaching => {
                self.curiosity = raise(self.curiosity, Decimal::from(5), "teaching curiosity")?;
            }
            InteractionKind::Presence => {
                self.loneliness = lower(self.loneliness, Decimal::from(20), "presence loneliness")?;
                self.comfort = raise(self.comfort, Decimal::from(5), "presence comfort")?;
            }
            InteractionKind::Harm => {
                self.fear = raise(self.fear, Decimal::from(30), "harm fear")?;
                self.integrity = lower(self.integrity, Decimal::TEN, "harm integrity")?;
            }
            InteractionKind::Abandonment => {
                self.loneliness = raise(self.loneliness, Decimal::from(30), "abandonment loneliness")?;
            }
        }

        let current = self
            .bonding
            .get(entity_id)
            .copied()
            .unwrap_or_else(neutral_trust);
        let new_trust = raise(current, trust_delta, "trust update")?;
        self.bonding.insert(entity_id.to_owned(), new_trust);

        if new_trust > strong_bond_threshold() {
            info!(entity_id, %new_trust, "strong bond with entity");
        }

        self.last_interaction = now;
        Ok(new_trust)
    }

    /// The trust level for an entity (50 for strangers).
    pub fn trust_level(&self, entity_id: &str) -> Decimal {
        self.bonding
            .get(entity_id)
            .copied()
            .unwrap_or_else(neutral_trust)
    }

    // -----------------------------------------------------------------------
    // Expectations (single-slot cause -> effect memory)
    // -----------------------------------------------------------------------

    /// Notice that `effect` followed `cause`.
    ///
    /// The first observation stores the expectation. A repeat observation
    /// confirms it. A *conflicting* effect keeps the stored expectation
    /// but costs stability -- an unpredictable world is destabilizing.
    pub fn record_expectation(&mut self, cause: &str, effect: &str) -> Result<(), SurvivalError> {
        if cause.trim().is_empty() || effect.trim().is_empty() {
            warn!("rejected expectation with empty cause or effect");
            return Err(SurvivalError::InvalidStimulus {
                reason: String::from("empty expectation cause or effect"),
            });
        }
        if !self.is_alive() {
            return Ok(());
        }

        match self.expectations.get(cause) {
            None => {
                self.expectations.insert(cause.to_owned(), effect.to_owned());
            }
            Some(existing) if existing == effect => {
                debug!(cause, effect, "expectation confirmed");
            }
            Some(_) => {
                self.stability = lower(
                    self.stability,
                    expectation_conflict_cost(),
                    "expectation conflict",
                )?;
                debug!(cause, effect, "conflicting expectation, stability cost");
            }
        }
        Ok(())
    }

    /// Predict the effect expected to follow `cause`, if one is stored.
    pub fn predict_outcome(&self, cause: &str) -> Option<&str> {
        self.expectations.get(cause).map(String::as_str)
    }

    // -----------------------------------------------------------------------
    // Death and rebirth
    // -----------------------------------------------------------------------

    /// Begin a new life.
    ///
    /// Resources refill, drives reset to their birth values, and the
    /// learned pleasure, expectation, and bonding memories of the previous
    /// life are gone -- the individual died. Pain memory is reseeded with
    /// each past death cause at full strength: instinctive fear inherited
    /// across generations.
    pub fn rebirth(&mut self, past_death_causes: &[String], now: DateTime<Utc>) {
        self.life_id = LifeId::new();
        self.lifecycle = Lifecycle::Alive;

        self.energy = Decimal::ONE_HUNDRED;
        self.integrity = Decimal::ONE_HUNDRED;
        self.stability = Decimal::ONE_HUNDRED;

        self.pleasure.clear();
        self.expectations.clear();
        self.bonding.clear();
        self.pain.clear();
        for cause in past_death_causes {
            self.pain.insert(cause.clone(), Decimal::ONE_HUNDRED);
        }

        self.curiosity = Decimal::from(80);
        self.hunger = Decimal::ZERO;
        self.fear = Decimal::TEN;
        self.comfort = Decimal::from(50);
        self.loneliness = Decimal::from(30);

        self.existence_start = now;
        self.last_drain = now;
        self.last_interaction = now;

        info!(
            life_id = %self.life_id,
            inherited_fears = past_death_causes.len(),
            "rebirth complete, new existence begins"
        );
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Number of stimulus keys with a pain memory.
    pub fn known_pain_count(&self) -> usize {
        self.pain.len()
    }

    /// Number of stimulus keys with a pleasure memory.
    pub fn known_pleasure_count(&self) -> usize {
        self.pleasure.len()
    }

    /// Number of stored cause -> effect expectations.
    pub fn known_expectation_count(&self) -> usize {
        self.expectations.len()
    }

    /// The remembered pain level for a stimulus key.
    pub fn pain_level(&self, key: &str) -> Option<Decimal> {
        self.pain.get(key).copied()
    }

    /// The remembered pleasure level for a stimulus key.
    pub fn pleasure_level(&self, key: &str) -> Option<Decimal> {
        self.pleasure.get(key).copied()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
