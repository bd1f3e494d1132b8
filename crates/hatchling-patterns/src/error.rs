//! Error types for the hatchling-patterns crate.

/// Errors that can occur during event analysis.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// An event arrived with an empty type or data field.
    ///
    /// Rejected before any state mutation.
    #[error("invalid event: {reason}")]
    InvalidEvent {
        /// Description of what was missing.
        reason: String,
    },
}
