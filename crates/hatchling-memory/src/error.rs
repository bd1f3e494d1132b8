//! Error types for the hatchling-memory crate.

/// Errors that can occur during associative memory operations.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// A concept id was empty.
    ///
    /// Rejected before any state mutation.
    #[error("invalid concept: {reason}")]
    InvalidConcept {
        /// Description of what was missing.
        reason: String,
    },
}
