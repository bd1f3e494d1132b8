//! Discrete event-pattern analyzer for the Hatchling creature.
//!
//! Where the associative memory works on continuous activation, this crate
//! works on discrete labeled events: it keeps a bounded history, counts
//! co-occurrences, and mines three kinds of structure out of the stream --
//! temporal regularity (things that happen on a schedule), causality
//! (things that follow other things), and repeated sequences (routines).
//!
//! # Modules
//!
//! - [`analyzer`] -- The analyzer itself ([`EventPatternAnalyzer`])
//! - [`config`] -- Analysis tunables ([`AnalyzerConfig`])
//! - [`error`] -- Error types ([`AnalyzerError`])
//! - [`event`] -- The event record ([`Event`])
//! - [`pattern`] -- Mined pattern types

pub mod analyzer;
pub mod config;
pub mod error;
pub mod event;
pub mod pattern;

pub use analyzer::{AnalyzerStatus, EventPatternAnalyzer};
pub use config::AnalyzerConfig;
pub use error::AnalyzerError;
pub use event::{Event, event_key};
pub use pattern::{CausalPattern, Prediction, SequencePattern, TemporalPattern};
