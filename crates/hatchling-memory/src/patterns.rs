//! Recognized activation sequences.
//!
//! A pattern is a short sequence of concept ids (length 2-5) that has
//! repeated inside the recent-activation window. Patterns are keyed by
//! their joined id chain and gain confidence with each sighting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shortest sequence considered a pattern.
pub const MIN_PATTERN_LEN: usize = 2;

/// Longest sequence considered a pattern.
pub const MAX_PATTERN_LEN: usize = 5;

/// Confidence gained per sighting (capped at 1.0).
const CONFIDENCE_PER_OCCURRENCE: f64 = 0.1;

/// A repeated activation sequence in the associative memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralPattern {
    /// The concept ids in firing order.
    pub sequence: Vec<String>,
    /// How many times the sequence has been sighted.
    pub occurrences: u32,
    /// Confidence that the sequence is meaningful (0-1).
    pub confidence: f64,
    /// When the sequence was last sighted.
    pub last_seen: DateTime<Utc>,
}

impl NeuralPattern {
    /// Start tracking a freshly sighted sequence.
    pub const fn new(sequence: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            sequence,
            occurrences: 0,
            confidence: 0.0,
            last_seen: now,
        }
    }

    /// Record another sighting: bump occurrences, refresh the timestamp,
    /// and recompute confidence as `min(1, occurrences * 0.1)`.
    pub fn sighted(&mut self, now: DateTime<Utc>) {
        self.occurrences = self.occurrences.saturating_add(1);
        self.last_seen = now;
        self.confidence = (f64::from(self.occurrences) * CONFIDENCE_PER_OCCURRENCE).min(1.0);
    }
}

/// Build the map key for a sequence of concept ids.
pub fn pattern_key(sequence: &[String]) -> String {
    sequence.join("->")
}

/// Count how many times `needle` appears as a consecutive run in `haystack`.
pub fn count_runs(haystack: &[String], needle: &[String]) -> usize {
    if needle.is_empty() || haystack.len() < needle.len() {
        return 0;
    }
    haystack
        .windows(needle.len())
        .filter(|window| *window == needle)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| String::from(*s)).collect()
    }

    #[test]
    fn confidence_grows_with_sightings_and_caps() {
        let mut pattern = NeuralPattern::new(ids(&["a", "b"]), DateTime::UNIX_EPOCH);
        for _ in 0..3 {
            pattern.sighted(DateTime::UNIX_EPOCH);
        }
        assert_eq!(pattern.occurrences, 3);
        assert!((pattern.confidence - 0.3).abs() < f64::EPSILON);

        for _ in 0..20 {
            pattern.sighted(DateTime::UNIX_EPOCH);
        }
        assert!((pattern.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pattern_key_joins_with_arrows() {
        assert_eq!(pattern_key(&ids(&["a", "b", "c"])), "a->b->c");
    }

    #[test]
    fn count_runs_finds_overlapping_occurrences() {
        let haystack = ids(&["a", "b", "a", "b", "a"]);
        assert_eq!(count_runs(&haystack, &ids(&["a", "b"])), 2);
        assert_eq!(count_runs(&haystack, &ids(&["b", "a"])), 2);
        assert_eq!(count_runs(&haystack, &ids(&["a", "b", "a"])), 2);
    }

    #[test]
    fn count_runs_handles_degenerate_inputs() {
        let haystack = ids(&["a"]);
        assert_eq!(count_runs(&haystack, &ids(&["a", "b"])), 0);
        assert_eq!(count_runs(&haystack, &[]), 0);
    }
}
