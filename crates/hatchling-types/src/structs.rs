//! Plain data carriers shared across the Hatchling workspace.
//!
//! These structs hold no behavior beyond construction helpers and
//! clamping; the logic crates own all state transitions.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{DeathCause, ExpressionKind, Reaction};
use crate::ids::LifeId;

// ---------------------------------------------------------------------------
// Survival state snapshot
// ---------------------------------------------------------------------------

/// A read-only snapshot of the survival core, returned by every tick.
///
/// While the creature is alive, `cause_of_death` is `None` and the scalars
/// reflect the live state. The tick on which a resource bottoms out returns
/// a snapshot with `is_alive == false` and the final resource values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurvivalState {
    /// The life this snapshot belongs to.
    pub life_id: LifeId,
    /// Whether the creature is alive.
    pub is_alive: bool,
    /// The resource whose exhaustion ended this life, if it has ended.
    pub cause_of_death: Option<DeathCause>,
    /// Energy resource (0-100); depletes constantly.
    pub energy: Decimal,
    /// Integrity resource (0-100); damaged by threats.
    pub integrity: Decimal,
    /// Stability resource (0-100); eroded by chaos.
    pub stability: Decimal,
    /// Hunger drive (0-100); the inverse of energy.
    pub hunger: Decimal,
    /// Fear drive (0-100).
    pub fear: Decimal,
    /// Comfort drive (0-100).
    pub comfort: Decimal,
    /// Loneliness drive (0-100).
    pub loneliness: Decimal,
    /// Curiosity drive (0-100).
    pub curiosity: Decimal,
    /// Milliseconds since this life began.
    pub existence_ms: i64,
}

// ---------------------------------------------------------------------------
// Stimulus response
// ---------------------------------------------------------------------------

/// The survival core's immediate response to a stimulus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// How the creature reacted.
    pub reaction: Reaction,
    /// Magnitude of the reaction (0-100).
    pub intensity: Decimal,
}

// ---------------------------------------------------------------------------
// Primitive expression
// ---------------------------------------------------------------------------

/// A primitive expression derived from the dominant drive.
///
/// The sound is presentation flavor (a pre-verbal vocalization); the kind
/// and intensity are the structural output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    /// Which drive dominated.
    pub kind: ExpressionKind,
    /// Magnitude of the dominant drive (0-100).
    pub intensity: Decimal,
    /// A primitive vocalization matching the kind.
    pub sound: String,
}

// ---------------------------------------------------------------------------
// Evolution traits
// ---------------------------------------------------------------------------

/// Inherited trait scalars, adapted over generations.
///
/// All traits start at the 50 baseline and are re-clamped after every
/// adjustment: `metabolic_rate` is clamped to 10-100, all others to 0-100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionTraits {
    /// How efficiently energy is used.
    pub energy_efficiency: Decimal,
    /// How fast energy depletes.
    pub metabolic_rate: Decimal,
    /// Need for interaction.
    pub social_drive: Decimal,
    /// Ability to form strong bonds.
    pub bonding_capacity: Decimal,
    /// Wariness of the unknown.
    pub caution: Decimal,
    /// Drive to explore.
    pub curiosity: Decimal,
    /// Recovery from damage.
    pub resilience: Decimal,
    /// Speed of learning patterns.
    pub pattern_recognition: Decimal,
    /// How well things are remembered.
    pub memory_strength: Decimal,
}

impl EvolutionTraits {
    /// The baseline value every trait starts from.
    pub const fn baseline() -> Decimal {
        Decimal::from_parts(50, 0, 0, false, 0)
    }

    /// Re-clamp all nine traits to their valid ranges.
    ///
    /// `metabolic_rate` floors at 10 (metabolism never stops entirely);
    /// everything else floors at 0. All traits cap at 100.
    pub fn clamp(&mut self) {
        let floor = Decimal::ZERO;
        let metabolic_floor = Decimal::from(10);
        let cap = Decimal::ONE_HUNDRED;

        self.energy_efficiency = self.energy_efficiency.clamp(floor, cap);
        self.metabolic_rate = self.metabolic_rate.clamp(metabolic_floor, cap);
        self.social_drive = self.social_drive.clamp(floor, cap);
        self.bonding_capacity = self.bonding_capacity.clamp(floor, cap);
        self.caution = self.caution.clamp(floor, cap);
        self.curiosity = self.curiosity.clamp(floor, cap);
        self.resilience = self.resilience.clamp(floor, cap);
        self.pattern_recognition = self.pattern_recognition.clamp(floor, cap);
        self.memory_strength = self.memory_strength.clamp(floor, cap);
    }
}

impl Default for EvolutionTraits {
    fn default() -> Self {
        let baseline = Self::baseline();
        Self {
            energy_efficiency: baseline,
            metabolic_rate: baseline,
            social_drive: baseline,
            bonding_capacity: baseline,
            caution: baseline,
            curiosity: baseline,
            resilience: baseline,
            pattern_recognition: baseline,
            memory_strength: baseline,
        }
    }
}

// ---------------------------------------------------------------------------
// Genetic memory
// ---------------------------------------------------------------------------

/// The cross-generation payload produced once per death and consumed
/// exactly once at the following rebirth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneticMemory {
    /// The generation about to be born.
    pub generation: u32,
    /// Total distinct deaths recorded so far.
    pub total_deaths: u32,
    /// Instinctive fear strengths keyed by cause (0-100).
    pub inherited_fears: BTreeMap<String, Decimal>,
    /// Instinctive affinity strengths keyed by survival factor (0-100).
    pub inherited_affinities: BTreeMap<String, Decimal>,
    /// The evolved trait vector.
    pub traits: EvolutionTraits,
}
