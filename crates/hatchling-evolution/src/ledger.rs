//! The evolution ledger.
//!
//! Generation 1 dies of energy depletion; generation 2 is born with an
//! instinctive fear of it. Over many lives the ledger accumulates fears,
//! affinities, and trait adjustments that make each generation a little
//! better equipped than the last.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use hatchling_types::{Challenge, DeathCause, EvolutionTraits, GeneticMemory, SurvivalState};

use crate::error::LedgerError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fear strength added for a cause when it kills (20).
fn death_fear_delta() -> Decimal {
    Decimal::from(20)
}

/// Extra fear of hunger added after an energy-driven death (10).
fn hunger_fear_delta() -> Decimal {
    Decimal::TEN
}

/// Energy below which a death counts as energy-driven (10).
fn energy_critical_threshold() -> Decimal {
    Decimal::TEN
}

/// Loneliness above which a death counts as isolated (80).
fn loneliness_extreme_threshold() -> Decimal {
    Decimal::from(80)
}

/// Fear above which a death counts as terrified (80).
fn fear_extreme_threshold() -> Decimal {
    Decimal::from(80)
}

/// Fraction of reported importance banked as affinity (0.5).
fn affinity_importance_factor() -> Decimal {
    Decimal::new(5, 1)
}

/// Bond strength above which the caretaker bond evolves (70).
fn caretaker_bond_threshold() -> Decimal {
    Decimal::from(70)
}

/// Affinity key recording the value of a caretaker being near.
const CARETAKER_PRESENCE_KEY: &str = "caretaker_presence";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Add `delta` to a 0-100 score with overflow checking and clamping.
fn bank(current: Decimal, delta: Decimal, context: &str) -> Result<Decimal, LedgerError> {
    let raw = current
        .checked_add(delta)
        .ok_or_else(|| LedgerError::ArithmeticOverflow {
            context: context.to_owned(),
        })?;
    Ok(raw.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// A summary of evolution progress for observability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionSummary {
    /// Current generation number.
    pub generation: u32,
    /// Distinct death causes recorded.
    pub total_deaths: u32,
    /// Number of inherited fears.
    pub inherited_fears: usize,
    /// Number of inherited affinities.
    pub inherited_affinities: usize,
    /// The strongest of the headline traits.
    pub dominant_trait: String,
    /// Mean trait excess over the 50 baseline (0-50).
    pub evolution_progress: Decimal,
}

// ---------------------------------------------------------------------------
// EvolutionLedger
// ---------------------------------------------------------------------------

/// Generational learning across death and rebirth cycles.
///
/// The ledger outlives every individual. Deaths arm a rebirth gate;
/// [`prepare_rebirth`](Self::prepare_rebirth) snapshots the genetic
/// memory exactly once per death, and the next survival core is seeded
/// from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionLedger {
    /// Current generation (starts at 1).
    generation: u32,

    /// Every cause that has ever killed, in first-seen order, deduplicated.
    death_causes: Vec<String>,

    /// Instinctive fear strengths keyed by cause (0-100).
    inherited_fears: BTreeMap<String, Decimal>,

    /// Instinctive affinity strengths keyed by survival factor (0-100).
    inherited_affinities: BTreeMap<String, Decimal>,

    /// The evolved trait vector.
    traits: EvolutionTraits,

    /// Armed by a recorded death, disarmed by `prepare_rebirth`.
    rebirth_pending: bool,
}

impl EvolutionLedger {
    /// Create a fresh ledger at generation 1 with baseline traits.
    pub fn new() -> Self {
        Self {
            generation: 1,
            death_causes: Vec::new(),
            inherited_fears: BTreeMap::new(),
            inherited_affinities: BTreeMap::new(),
            traits: EvolutionTraits::default(),
            rebirth_pending: false,
        }
    }

    // -----------------------------------------------------------------------
    // Death and rebirth
    // -----------------------------------------------------------------------

    /// Record a death and what the final moments looked like.
    ///
    /// The cause joins the deduplicated death list and its inherited fear
    /// strengthens. Deaths that ended hungry, isolated, or terrified
    /// additionally push the matching traits, so the next generation
    /// starts better adapted to whatever killed this one.
    pub fn record_death(
        &mut self,
        cause: DeathCause,
        final_state: &SurvivalState,
    ) -> Result<(), LedgerError> {
        let cause_key = cause.as_str();
        warn!(generation = self.generation, cause = cause_key, "recording death");

        if !self.death_causes.iter().any(|c| c == cause_key) {
            self.death_causes.push(cause_key.to_owned());
        }

        let fear = self
            .inherited_fears
            .get(cause_key)
            .copied()
            .unwrap_or(Decimal::ZERO);
        self.inherited_fears
            .insert(cause_key.to_owned(), bank(fear, death_fear_delta(), "death fear")?);

        if final_state.energy < energy_critical_threshold() {
            // Died hungry: fear hunger itself, and waste less energy.
            let hunger_fear = self
                .inherited_fears
                .get("hunger")
                .copied()
                .unwrap_or(Decimal::ZERO);
            self.inherited_fears.insert(
                String::from("hunger"),
                bank(hunger_fear, hunger_fear_delta(), "hunger fear")?,
            );
            self.traits.energy_efficiency = bank(
                self.traits.energy_efficiency,
                Decimal::from(5),
                "energy efficiency",
            )?;
        }

        if final_state.loneliness > loneliness_extreme_threshold() {
            // Died isolated: seek connection harder.
            self.traits.social_drive =
                bank(self.traits.social_drive, Decimal::TEN, "social drive")?;
        }

        if final_state.fear > fear_extreme_threshold() {
            // Died terrified: be warier.
            self.traits.caution = bank(self.traits.caution, Decimal::from(5), "caution")?;
        }

        self.traits.clamp();
        self.generation = self.generation.saturating_add(1);
        self.rebirth_pending = true;

        info!(
            next_generation = self.generation,
            total_deaths = self.death_causes.len(),
            "death recorded, next generation will inherit"
        );
        Ok(())
    }

    /// Snapshot the genetic memory for the generation about to be born.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NoPendingDeath`] unless a death has been
    /// recorded since the last call -- genetic memory is produced exactly
    /// once per death.
    pub fn prepare_rebirth(&mut self) -> Result<GeneticMemory, LedgerError> {
        if !self.rebirth_pending {
            return Err(LedgerError::NoPendingDeath);
        }
        self.rebirth_pending = false;

        let memory = GeneticMemory {
            generation: self.generation,
            total_deaths: u32::try_from(self.death_causes.len()).unwrap_or(u32::MAX),
            inherited_fears: self.inherited_fears.clone(),
            inherited_affinities: self.inherited_affinities.clone(),
            traits: self.traits.clone(),
        };

        info!(
            generation = memory.generation,
            inherited_fears = memory.inherited_fears.len(),
            "rebirth prepared"
        );
        Ok(memory)
    }

    // -----------------------------------------------------------------------
    // Positive evolution
    // -----------------------------------------------------------------------

    /// Record that a factor helped survival.
    ///
    /// Future generations favor it: half the reported importance is
    /// banked as inherited affinity.
    pub fn record_survival_success(
        &mut self,
        factor: &str,
        importance: Decimal,
    ) -> Result<(), LedgerError> {
        let gain = importance
            .checked_mul(affinity_importance_factor())
            .ok_or_else(|| LedgerError::ArithmeticOverflow {
                context: String::from("affinity importance scaling"),
            })?;
        let current = self
            .inherited_affinities
            .get(factor)
            .copied()
            .unwrap_or(Decimal::ZERO);
        self.inherited_affinities
            .insert(factor.to_owned(), bank(current, gain, "affinity gain")?);
        debug!(factor, "survival success recorded");
        Ok(())
    }

    /// Record the strength of the bond with the caretaker.
    ///
    /// A strong bond is a survival advantage; crossing the threshold
    /// grows bonding capacity and the affinity for the caretaker's
    /// presence.
    pub fn record_caretaker_bond(&mut self, strength: Decimal) -> Result<(), LedgerError> {
        if strength <= caretaker_bond_threshold() {
            return Ok(());
        }

        self.traits.bonding_capacity =
            bank(self.traits.bonding_capacity, Decimal::TWO, "bonding capacity")?;
        let current = self
            .inherited_affinities
            .get(CARETAKER_PRESENCE_KEY)
            .copied()
            .unwrap_or(Decimal::from(50));
        self.inherited_affinities.insert(
            String::from(CARETAKER_PRESENCE_KEY),
            bank(current, Decimal::from(5), "caretaker affinity")?,
        );
        self.traits.clamp();
        debug!(%strength, "caretaker bond strengthening evolution");
        Ok(())
    }

    /// Apply selection pressure from a survived challenge.
    ///
    /// Each challenge nudges its matching traits by a small fixed
    /// increment; all nine traits are re-clamped afterwards.
    pub fn apply_selection_pressure(&mut self, challenge: Challenge) -> Result<(), LedgerError> {
        match challenge {
            Challenge::EnergyCrisis => {
                self.traits.energy_efficiency =
                    bank(self.traits.energy_efficiency, Decimal::TWO, "energy efficiency")?;
                self.traits.metabolic_rate = self
                    .traits
                    .metabolic_rate
                    .checked_sub(Decimal::ONE)
                    .ok_or_else(|| LedgerError::ArithmeticOverflow {
                        context: String::from("metabolic rate reduction"),
                    })?;
            }
            Challenge::Isolation => {
                self.traits.social_drive =
                    bank(self.traits.social_drive, Decimal::from(3), "social drive")?;
            }
            Challenge::ThreatAvoided => {
                self.traits.caution = bank(self.traits.caution, Decimal::TWO, "caution")?;
            }
            Challenge::PatternLearned => {
                self.traits.pattern_recognition =
                    bank(self.traits.pattern_recognition, Decimal::ONE, "pattern recognition")?;
            }
            Challenge::BondFormed => {
                self.traits.bonding_capacity =
                    bank(self.traits.bonding_capacity, Decimal::TWO, "bonding capacity")?;
            }
        }

        self.traits.clamp();
        debug!(?challenge, "selection pressure applied");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// The current generation number.
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of distinct death causes recorded.
    pub const fn total_deaths(&self) -> usize {
        self.death_causes.len()
    }

    /// Every recorded death cause, in first-seen order.
    pub fn death_history(&self) -> &[String] {
        &self.death_causes
    }

    /// The current trait vector.
    pub const fn traits(&self) -> &EvolutionTraits {
        &self.traits
    }

    /// The inherited fear strength for a cause, if any.
    pub fn inherited_fear(&self, cause: &str) -> Option<Decimal> {
        self.inherited_fears.get(cause).copied()
    }

    /// The inherited affinity strength for a factor, if any.
    pub fn inherited_affinity(&self, factor: &str) -> Option<Decimal> {
        self.inherited_affinities.get(factor).copied()
    }

    /// Summarize evolution progress.
    pub fn summary(&self) -> EvolutionSummary {
        EvolutionSummary {
            generation: self.generation,
            total_deaths: u32::try_from(self.death_causes.len()).unwrap_or(u32::MAX),
            inherited_fears: self.inherited_fears.len(),
            inherited_affinities: self.inherited_affinities.len(),
            dominant_trait: self.dominant_trait().to_owned(),
            evolution_progress: self.evolution_progress(),
        }
    }

    /// The strongest of the headline traits (first wins ties).
    fn dominant_trait(&self) -> &'static str {
        let candidates = [
            ("energy_efficient", self.traits.energy_efficiency),
            ("social", self.traits.social_drive),
            ("cautious", self.traits.caution),
            ("curious", self.traits.curiosity),
            ("bonding", self.traits.bonding_capacity),
        ];

        let mut dominant = "balanced";
        let mut best = Decimal::ZERO;
        for (name, value) in candidates {
            if value > best {
                best = value;
                dominant = name;
            }
        }
        dominant
    }

    /// Mean trait excess over the 50 baseline, across the eight adaptive
    /// traits (metabolic rate is a cost dial, not an adaptation).
    fn evolution_progress(&self) -> Decimal {
        let baseline = EvolutionTraits::baseline();
        let excess = |value: Decimal| (value - baseline).max(Decimal::ZERO);

        let total = excess(self.traits.energy_efficiency)
            + excess(self.traits.social_drive)
            + excess(self.traits.bonding_capacity)
            + excess(self.traits.caution)
            + excess(self.traits.curiosity)
            + excess(self.traits.resilience)
            + excess(self.traits.pattern_recognition)
            + excess(self.traits.memory_strength);

        total / Decimal::from(8)
    }
}

impl Default for EvolutionLedger {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use hatchling_types::LifeId;

    use super::*;

    fn final_state() -> SurvivalState {
        SurvivalState {
            life_id: LifeId::new(),
            is_alive: false,
            cause_of_death: Some(DeathCause::EnergyDepletion),
            energy: Decimal::ZERO,
            integrity: Decimal::from(80),
            stability: Decimal::from(60),
            hunger: Decimal::ONE_HUNDRED,
            fear: Decimal::from(20),
            comfort: Decimal::from(10),
            loneliness: Decimal::from(40),
            curiosity: Decimal::from(50),
            existence_ms: 1_000_000,
        }
    }

    // -----------------------------------------------------------------------
    // Recording deaths
    // -----------------------------------------------------------------------

    #[test]
    fn death_strengthens_the_inherited_fear() {
        let mut ledger = EvolutionLedger::new();
        let result = ledger.record_death(DeathCause::EnergyDepletion, &final_state());
        assert!(result.is_ok());
        assert_eq!(
            ledger.inherited_fear("energy_depletion"),
            Some(Decimal::from(20))
        );
    }

    #[test]
    fn death_causes_are_deduplicated() {
        let mut ledger = EvolutionLedger::new();
        let _ = ledger.record_death(DeathCause::EnergyDepletion, &final_state());
        let _ = ledger.prepare_rebirth();
        let _ = ledger.record_death(DeathCause::EnergyDepletion, &final_state());
        assert_eq!(ledger.total_deaths(), 1);
        // But the fear kept growing.
        assert_eq!(
            ledger.inherited_fear("energy_depletion"),
            Some(Decimal::from(40))
        );
    }

    #[test]
    fn generation_increments_per_death() {
        let mut ledger = EvolutionLedger::new();
        assert_eq!(ledger.generation(), 1);
        let _ = ledger.record_death(DeathCause::EnergyDepletion, &final_state());
        assert_eq!(ledger.generation(), 2);
    }

    #[test]
    fn hungry_death_evolves_energy_efficiency() {
        let mut ledger = EvolutionLedger::new();
        let _ = ledger.record_death(DeathCause::EnergyDepletion, &final_state());
        assert_eq!(ledger.inherited_fear("hunger"), Some(Decimal::TEN));
        assert_eq!(ledger.traits().energy_efficiency, Decimal::from(55));
    }

    #[test]
    fn isolated_death_evolves_social_drive() {
        let mut ledger = EvolutionLedger::new();
        let mut state = final_state();
        state.energy = Decimal::from(50);
        state.loneliness = Decimal::from(90);
        let _ = ledger.record_death(DeathCause::StabilityCollapse, &state);
        assert_eq!(ledger.traits().social_drive, Decimal::from(60));
        // Not an energy death: no hunger fear.
        assert_eq!(ledger.inherited_fear("hunger"), None);
    }

    #[test]
    fn terrified_death_evolves_caution() {
        let mut ledger = EvolutionLedger::new();
        let mut state = final_state();
        state.energy = Decimal::from(50);
        state.fear = Decimal::from(95);
        let _ = ledger.record_death(DeathCause::IntegrityFailure, &state);
        assert_eq!(ledger.traits().caution, Decimal::from(55));
    }

    #[test]
    fn fears_cap_at_one_hundred() {
        let mut ledger = EvolutionLedger::new();
        for _ in 0..6 {
            let _ = ledger.record_death(DeathCause::EnergyDepletion, &final_state());
            let _ = ledger.prepare_rebirth();
        }
        assert_eq!(
            ledger.inherited_fear("energy_depletion"),
            Some(Decimal::ONE_HUNDRED)
        );
    }

    // -----------------------------------------------------------------------
    // Rebirth gate (exactly once per death)
    // -----------------------------------------------------------------------

    #[test]
    fn prepare_rebirth_before_any_death_fails() {
        let mut ledger = EvolutionLedger::new();
        assert!(matches!(
            ledger.prepare_rebirth(),
            Err(LedgerError::NoPendingDeath)
        ));
    }

    #[test]
    fn prepare_rebirth_is_exactly_once_per_death() {
        let mut ledger = EvolutionLedger::new();
        let _ = ledger.record_death(DeathCause::EnergyDepletion, &final_state());

        let first = ledger.prepare_rebirth();
        assert!(first.is_ok());
        let second = ledger.prepare_rebirth();
        assert!(matches!(second, Err(LedgerError::NoPendingDeath)));

        // A new death re-arms the gate.
        let _ = ledger.record_death(DeathCause::StabilityCollapse, &final_state());
        assert!(ledger.prepare_rebirth().is_ok());
    }

    #[test]
    fn genetic_memory_snapshots_the_ledger() {
        let mut ledger = EvolutionLedger::new();
        let _ = ledger.record_death(DeathCause::EnergyDepletion, &final_state());
        let memory = ledger.prepare_rebirth().ok();
        let memory = memory.as_ref();

        assert_eq!(memory.map(|m| m.generation), Some(2));
        assert_eq!(memory.map(|m| m.total_deaths), Some(1));
        assert_eq!(
            memory.and_then(|m| m.inherited_fears.get("energy_depletion").copied()),
            Some(Decimal::from(20))
        );
        assert_eq!(
            memory.map(|m| m.traits.energy_efficiency),
            Some(Decimal::from(55))
        );
    }

    // -----------------------------------------------------------------------
    // Positive evolution
    // -----------------------------------------------------------------------

    #[test]
    fn survival_success_banks_half_the_importance() {
        let mut ledger = EvolutionLedger::new();
        let result = ledger.record_survival_success("warm_spot", Decimal::from(40));
        assert!(result.is_ok());
        assert_eq!(ledger.inherited_affinity("warm_spot"), Some(Decimal::from(20)));
    }

    #[test]
    fn strong_caretaker_bond_evolves_bonding_capacity() {
        let mut ledger = EvolutionLedger::new();
        let _ = ledger.record_caretaker_bond(Decimal::from(85));
        assert_eq!(ledger.traits().bonding_capacity, Decimal::from(52));
        assert_eq!(
            ledger.inherited_affinity("caretaker_presence"),
            Some(Decimal::from(55))
        );
    }

    #[test]
    fn weak_caretaker_bond_changes_nothing() {
        let mut ledger = EvolutionLedger::new();
        let _ = ledger.record_caretaker_bond(Decimal::from(70));
        assert_eq!(ledger.traits().bonding_capacity, Decimal::from(50));
        assert_eq!(ledger.inherited_affinity("caretaker_presence"), None);
    }

    // -----------------------------------------------------------------------
    // Selection pressure
    // -----------------------------------------------------------------------

    #[test]
    fn energy_crisis_trades_metabolism_for_efficiency() {
        let mut ledger = EvolutionLedger::new();
        let _ = ledger.apply_selection_pressure(Challenge::EnergyCrisis);
        assert_eq!(ledger.traits().energy_efficiency, Decimal::from(52));
        assert_eq!(ledger.traits().metabolic_rate, Decimal::from(49));
    }

    #[test]
    fn metabolic_rate_floors_at_ten() {
        let mut ledger = EvolutionLedger::new();
        for _ in 0..60 {
            let _ = ledger.apply_selection_pressure(Challenge::EnergyCrisis);
        }
        assert_eq!(ledger.traits().metabolic_rate, Decimal::TEN);
        assert_eq!(ledger.traits().energy_efficiency, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn each_challenge_nudges_its_trait() {
        let mut ledger = EvolutionLedger::new();
        let _ = ledger.apply_selection_pressure(Challenge::Isolation);
        let _ = ledger.apply_selection_pressure(Challenge::ThreatAvoided);
        let _ = ledger.apply_selection_pressure(Challenge::PatternLearned);
        let _ = ledger.apply_selection_pressure(Challenge::BondFormed);

        assert_eq!(ledger.traits().social_drive, Decimal::from(53));
        assert_eq!(ledger.traits().caution, Decimal::from(52));
        assert_eq!(ledger.traits().pattern_recognition, Decimal::from(51));
        assert_eq!(ledger.traits().bonding_capacity, Decimal::from(52));
    }

    // -----------------------------------------------------------------------
    // Summary
    // -----------------------------------------------------------------------

    #[test]
    fn summary_reports_dominant_trait_and_progress() {
        let mut ledger = EvolutionLedger::new();
        for _ in 0..3 {
            let _ = ledger.apply_selection_pressure(Challenge::Isolation);
        }

        let summary = ledger.summary();
        assert_eq!(summary.generation, 1);
        assert_eq!(summary.dominant_trait, "social");
        // Only social_drive moved: (59 - 50) / 8.
        assert_eq!(summary.evolution_progress, Decimal::new(1125, 3));
    }

    #[test]
    fn summary_counts_fears_and_affinities() {
        let mut ledger = EvolutionLedger::new();
        let _ = ledger.record_death(DeathCause::EnergyDepletion, &final_state());
        let _ = ledger.record_survival_success("warm_spot", Decimal::TEN);

        let summary = ledger.summary();
        assert_eq!(summary.inherited_fears, 2); // energy_depletion + hunger
        assert_eq!(summary.inherited_affinities, 1);
        assert_eq!(summary.total_deaths, 1);
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    #[test]
    fn ledger_round_trips_through_json() {
        let mut ledger = EvolutionLedger::new();
        let _ = ledger.record_death(DeathCause::EnergyDepletion, &final_state());
        let json = serde_json::to_string(&ledger).ok();
        assert!(json.is_some());
        let restored: Option<EvolutionLedger> =
            json.and_then(|j| serde_json::from_str(&j).ok());
        assert_eq!(restored, Some(ledger));
    }
}
