//! Error types for the hatchling-survival crate.
//!
//! All fallible operations return typed errors rather than panicking.
//! Resource exhaustion is deliberately *not* an error: death is a normal
//! terminal transition reported through the survival state snapshot.

/// Errors that can occur during survival core operations.
#[derive(Debug, thiserror::Error)]
pub enum SurvivalError {
    /// A stimulus arrived with an empty type or data field.
    ///
    /// Rejected before any state mutation.
    #[error("invalid stimulus: {reason}")]
    InvalidStimulus {
        /// Description of what was missing.
        reason: String,
    },

    /// An arithmetic overflow occurred during a score computation.
    #[error("arithmetic overflow in survival computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
