//! Pattern types mined from the event stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence gained per sequence sighting (capped at 1.0).
pub(crate) const SEQUENCE_CONFIDENCE_PER_OCCURRENCE: f64 = 0.2;

/// An event that recurs at a regular interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalPattern {
    /// The recurring event key.
    pub event_key: String,
    /// Mean inter-arrival interval in milliseconds.
    pub average_interval_ms: f64,
    /// How consistent the timing is (0-1); `1 - min(1, stddev / mean)`.
    pub regularity: f64,
    /// The observed occurrence timestamps.
    pub occurrences: Vec<DateTime<Utc>>,
}

/// An event that tends to follow another event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalPattern {
    /// The earlier event key.
    pub cause: String,
    /// The following event key.
    pub effect: String,
    /// Fraction of cause occurrences followed by the effect (0-1).
    pub probability: f64,
    /// How many times the pair has been observed.
    pub observation_count: u32,
}

/// A chain of consecutive events that repeats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencePattern {
    /// The event keys in order.
    pub sequence: Vec<String>,
    /// How many times the exact chain has occurred in history.
    pub occurrences: u32,
    /// Confidence that the chain is a routine (0-1).
    pub confidence: f64,
}

impl SequencePattern {
    /// Recompute confidence from the occurrence count.
    pub fn refresh_confidence(&mut self) {
        self.confidence =
            (f64::from(self.occurrences) * SEQUENCE_CONFIDENCE_PER_OCCURRENCE).min(1.0);
    }
}

/// A predicted follow-up event, ranked by probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// The event key expected to follow.
    pub effect: String,
    /// Probability carried over from the causal pattern (0-1).
    pub probability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_confidence_scales_and_caps() {
        let mut pattern = SequencePattern {
            sequence: vec![String::from("a"), String::from("b"), String::from("c")],
            occurrences: 2,
            confidence: 0.0,
        };
        pattern.refresh_confidence();
        assert!((pattern.confidence - 0.4).abs() < f64::EPSILON);

        pattern.occurrences = 9;
        pattern.refresh_confidence();
        assert!((pattern.confidence - 1.0).abs() < f64::EPSILON);
    }
}
