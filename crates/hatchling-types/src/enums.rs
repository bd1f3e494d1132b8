//! Closed enumeration types for the Hatchling simulation.
//!
//! Behavior tables dispatch on these enums and match exhaustively --
//! no stringly-typed switches with silent default arms.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Stimulus reactions
// ---------------------------------------------------------------------------

/// The creature's immediate reaction to a stimulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Reaction {
    /// The stimulus matched a pain memory; the creature recoils.
    Fear,
    /// The stimulus matched a pleasure memory; the creature seeks more.
    Pleasure,
    /// The stimulus is unknown and curiosity is high enough to explore it.
    Curious,
    /// The stimulus is unknown and curiosity is too low to explore it.
    Cautious,
    /// No reaction (used only for quiescent states).
    Neutral,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// The kind of primitive expression produced by the dominant drive.
///
/// Priority order (first match wins): hunger -> [`Self::Distress`],
/// fear -> [`Self::Fear`], loneliness -> [`Self::Seeking`],
/// comfort plus energy -> [`Self::Content`], curiosity -> [`Self::Curious`],
/// otherwise [`Self::Neutral`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExpressionKind {
    /// Desperate need for energy.
    Distress,
    /// Active fear response.
    Fear,
    /// Seeking connection after prolonged isolation.
    Seeking,
    /// Safe and satisfied.
    Content,
    /// Exploring.
    Curious,
    /// Observing, nothing dominant.
    Neutral,
}

// ---------------------------------------------------------------------------
// Entity interactions
// ---------------------------------------------------------------------------

/// A kind of interaction initiated by an external entity.
///
/// Each kind carries a fixed trust delta and secondary resource effects,
/// applied by the survival core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    /// A calming touch; small trust and comfort gain.
    GentleTouch,
    /// Energy restoration; the strongest positive interaction.
    Feeding,
    /// Showing the creature something new; feeds curiosity.
    Teaching,
    /// Simply being nearby; eases loneliness.
    Presence,
    /// A harmful act; damages integrity and trust, raises fear.
    Harm,
    /// A long absence; raises loneliness and erodes trust.
    Abandonment,
}

// ---------------------------------------------------------------------------
// Death causes
// ---------------------------------------------------------------------------

/// The resource whose exhaustion ended a life.
///
/// Checked in a fixed order (energy, then integrity, then stability) so the
/// reported cause is deterministic when several resources bottom out in the
/// same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Energy reached zero (starvation).
    EnergyDepletion,
    /// Integrity reached zero (accumulated damage).
    IntegrityFailure,
    /// Stability reached zero (prolonged fear or isolation).
    StabilityCollapse,
}

impl DeathCause {
    /// The stable string form used as a pain-memory and fear-ledger key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnergyDepletion => "energy_depletion",
            Self::IntegrityFailure => "integrity_failure",
            Self::StabilityCollapse => "stability_collapse",
        }
    }
}

impl core::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Selection pressure challenges
// ---------------------------------------------------------------------------

/// A survival challenge the creature came through, used by the evolution
/// ledger to nudge inherited traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Challenge {
    /// Survived a period of critically low energy.
    EnergyCrisis,
    /// Survived prolonged isolation.
    Isolation,
    /// Avoided a known threat.
    ThreatAvoided,
    /// Successfully learned a world pattern.
    PatternLearned,
    /// Formed a strong bond with an entity.
    BondFormed,
}

// ---------------------------------------------------------------------------
// Neuron kinds
// ---------------------------------------------------------------------------

/// The role a concept node plays in the associative memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NeuronKind {
    /// Direct sensory input (a stimulus channel).
    Sensory,
    /// A learned concept.
    Concept,
    /// An action the creature can take.
    Action,
    /// An emotional state.
    Emotion,
}
