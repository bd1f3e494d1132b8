//! Shared type definitions for the Hatchling creature simulation.
//!
//! This crate is the single source of truth for types that cross crate
//! boundaries: the survival state machine, the associative memory, the
//! event analyzer, and the evolution ledger all speak in these terms.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`enums`] -- Closed enumeration types (reactions, interactions, death causes)
//! - [`structs`] -- Plain data carriers (survival state, genetic memory, traits)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Challenge, DeathCause, ExpressionKind, InteractionKind, NeuronKind, Reaction};
pub use ids::LifeId;
pub use structs::{EvolutionTraits, Expression, GeneticMemory, Response, SurvivalState};
