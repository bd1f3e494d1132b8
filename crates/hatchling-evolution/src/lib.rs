//! Cross-generation trait and fear inheritance for the Hatchling creature.
//!
//! When a life ends, the individual's memories die with it -- but the
//! *species* learns. The evolution ledger records every death cause,
//! strengthens instinctive fears and affinities, and nudges a vector of
//! nine inherited traits. The resulting genetic memory is produced once
//! per death and consumed exactly once at the following rebirth.
//!
//! # Modules
//!
//! - [`error`] -- Error types ([`LedgerError`])
//! - [`ledger`] -- The ledger itself ([`EvolutionLedger`])

pub mod error;
pub mod ledger;

pub use error::LedgerError;
pub use ledger::{EvolutionLedger, EvolutionSummary};
