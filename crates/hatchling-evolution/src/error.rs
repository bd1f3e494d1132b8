//! Error types for the hatchling-evolution crate.

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// `prepare_rebirth` was called without a recorded death pending.
    ///
    /// Genetic memory is produced exactly once per death; asking twice
    /// (or before any death) is a sequencing bug in the caller.
    #[error("no death pending rebirth: record a death before preparing rebirth")]
    NoPendingDeath,

    /// An arithmetic overflow occurred during a trait computation.
    #[error("arithmetic overflow in evolution computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
