//! Orchestration for the Hatchling creature.
//!
//! This crate wires the four engine components together: the survival core
//! (one per life), and the associative memory, event analyzer, and
//! evolution ledger (which persist across lives). It owns the injected
//! wall clock, the configuration loader, the snapshot persistence
//! boundary, and the async tick runner.
//!
//! The aggregate is logically single-threaded: every mutation goes through
//! one `&mut` [`Organism`], and the runner serializes access behind a
//! mutex. Death and rebirth happen inside a single mutation, so no reader
//! ever observes a half-reset creature.
//!
//! # Modules
//!
//! - [`clock`] -- Injected time source ([`Clock`], [`SystemClock`], [`ManualClock`])
//! - [`config`] -- Typed configuration with YAML loading ([`CoreConfig`])
//! - [`error`] -- Error types ([`CoreError`])
//! - [`organism`] -- The aggregate ([`Organism`])
//! - [`runner`] -- Async tick loop ([`runner::run_organism`])
//! - [`snapshot`] -- Persistence boundary ([`SnapshotStore`])

pub mod clock;
pub mod config;
pub mod error;
pub mod organism;
pub mod runner;
pub mod snapshot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, CoreConfig, RunnerConfig};
pub use error::CoreError;
pub use organism::{Organism, TickOutcome};
pub use runner::{NoOpCallback, RunSummary, RunnerError, TickCallback, run_organism};
pub use snapshot::{InMemorySnapshotStore, SnapshotError, SnapshotStore};
