//! Configurable parameters for event-pattern analysis.

use serde::{Deserialize, Serialize};

/// Tunable parameters for [`EventPatternAnalyzer`].
///
/// [`EventPatternAnalyzer`]: crate::analyzer::EventPatternAnalyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Maximum events retained in the ring history (default: 1000).
    pub max_history: usize,

    /// How many preceding events count as co-occurring with a new event
    /// (default: 10).
    pub cooccurrence_window: usize,

    /// Minimum history size before analysis runs (default: 10).
    pub min_history_for_analysis: usize,

    /// Minimum occurrences of an event key before temporal analysis
    /// considers it, and minimum pair count before causal analysis does
    /// (default: 3).
    pub min_occurrences: u32,

    /// Regularity above which a temporal pattern registers (default: 0.5).
    pub temporal_regularity_floor: f64,

    /// Minimum mean inter-arrival interval for a temporal pattern, in
    /// milliseconds (default: 60 000 -- anything faster is noise).
    pub temporal_min_interval_ms: f64,

    /// Probability above which a causal pattern registers (default: 0.5).
    pub causal_probability_floor: f64,

    /// Cap on distinct sequence patterns (default: 50).
    pub max_sequence_patterns: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_history: 1000,
            cooccurrence_window: 10,
            min_history_for_analysis: 10,
            min_occurrences: 3,
            temporal_regularity_floor: 0.5,
            temporal_min_interval_ms: 60_000.0,
            causal_probability_floor: 0.5,
            max_sequence_patterns: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bounds() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.max_history, 1000);
        assert_eq!(config.cooccurrence_window, 10);
        assert_eq!(config.max_sequence_patterns, 50);
    }
}
