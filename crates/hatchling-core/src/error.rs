//! Error types for the hatchling-core crate.

use hatchling_evolution::LedgerError;
use hatchling_memory::MemoryError;
use hatchling_patterns::AnalyzerError;
use hatchling_survival::SurvivalError;

/// Errors that can occur while orchestrating the creature.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A survival core operation failed.
    #[error("survival error: {source}")]
    Survival {
        /// The underlying survival error.
        #[from]
        source: SurvivalError,
    },

    /// An associative memory operation failed.
    #[error("memory error: {source}")]
    Memory {
        /// The underlying memory error.
        #[from]
        source: MemoryError,
    },

    /// An event analyzer operation failed.
    #[error("analyzer error: {source}")]
    Analyzer {
        /// The underlying analyzer error.
        #[from]
        source: AnalyzerError,
    },

    /// An evolution ledger operation failed.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },
}
