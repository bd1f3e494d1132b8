//! The event-pattern analyzer.
//!
//! Events land in a bounded ring history. Each new event updates a
//! co-occurrence matrix against the distinct keys of the preceding few
//! events, and once enough history exists every record triggers a
//! re-analysis pass over three pattern families: temporal, causal, and
//! sequence.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::event::{Event, event_key};
use crate::pattern::{CausalPattern, Prediction, SequencePattern, TemporalPattern};

/// Shortest event chain considered a sequence pattern.
const MIN_SEQUENCE_LEN: usize = 3;

/// Longest event chain considered a sequence pattern.
const MAX_SEQUENCE_LEN: usize = 5;

/// Separator used to key sequence chains.
const SEQUENCE_SEPARATOR: &str = " -> ";

/// Convert a millisecond count to `f64` for interval statistics.
#[allow(clippy::cast_precision_loss)]
const fn ms_to_f64(ms: i64) -> f64 {
    ms as f64
}

/// A summary of the analyzer for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerStatus {
    /// Events currently in the ring history.
    pub event_count: usize,
    /// Recognized temporal patterns.
    pub temporal_patterns: usize,
    /// Recognized causal patterns.
    pub causal_patterns: usize,
    /// Recognized sequence patterns.
    pub sequence_patterns: usize,
    /// All recognized patterns.
    pub total_patterns: usize,
}

/// Mines temporal, causal, and sequence patterns from a bounded event log.
///
/// Like the associative memory, the analyzer persists across creature
/// generations -- the rhythms of the world outlive any one life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPatternAnalyzer {
    /// Analysis tunables.
    config: AnalyzerConfig,
    /// Bounded ring of observed events, oldest first.
    history: VecDeque<Event>,
    /// Pair counts: earlier key -> later key -> observations.
    ///
    /// Each recorded event counts every *distinct* key among the preceding
    /// window once, so a pair count never outruns the effect's occurrence
    /// count.
    cooccurrence: BTreeMap<String, BTreeMap<String, u32>>,
    /// Temporal patterns keyed by event key.
    temporal: BTreeMap<String, TemporalPattern>,
    /// Causal patterns keyed by cause, then effect.
    causal: BTreeMap<String, BTreeMap<String, CausalPattern>>,
    /// Sequence patterns keyed by their joined chain.
    sequences: BTreeMap<String, SequencePattern>,
}

impl EventPatternAnalyzer {
    /// Create an empty analyzer with the given configuration.
    pub const fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            history: VecDeque::new(),
            cooccurrence: BTreeMap::new(),
            temporal: BTreeMap::new(),
            causal: BTreeMap::new(),
            sequences: BTreeMap::new(),
        }
    }

    /// The active configuration.
    pub const fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Recording
    // -----------------------------------------------------------------------

    /// Record an event and re-analyze if enough history has accumulated.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::InvalidEvent`] for an empty type or data
    /// field; no state is mutated in that case.
    pub fn record_event(
        &mut self,
        kind: &str,
        data: &str,
        context: BTreeMap<String, serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<(), AnalyzerError> {
        if kind.trim().is_empty() {
            warn!("rejected event with empty type");
            return Err(AnalyzerError::InvalidEvent {
                reason: String::from("empty event type"),
            });
        }
        if data.trim().is_empty() {
            warn!(kind, "rejected event with empty data");
            return Err(AnalyzerError::InvalidEvent {
                reason: String::from("empty event data"),
            });
        }

        let key = event_key(kind, data);
        self.update_cooccurrence(&key);

        self.history.push_back(Event {
            kind: kind.to_owned(),
            data: data.to_owned(),
            timestamp: now,
            context,
        });
        while self.history.len() > self.config.max_history {
            self.history.pop_front();
        }

        if self.history.len() >= self.config.min_history_for_analysis {
            self.analyze();
        }
        Ok(())
    }

    /// Count the new key as co-occurring with each distinct key among the
    /// preceding window of events.
    fn update_cooccurrence(&mut self, key: &str) {
        let window = self.config.cooccurrence_window;
        let mut seen: Vec<String> = Vec::new();
        for event in self.history.iter().rev().take(window) {
            let prev_key = event.key();
            if !seen.contains(&prev_key) {
                seen.push(prev_key);
            }
        }
        for prev_key in seen {
            let count = self
                .cooccurrence
                .entry(prev_key)
                .or_default()
                .entry(key.to_owned())
                .or_insert(0);
            *count = count.saturating_add(1);
        }
    }

    // -----------------------------------------------------------------------
    // Analysis
    // -----------------------------------------------------------------------

    /// Run all three pattern analyses over the current history.
    fn analyze(&mut self) {
        self.find_temporal_patterns();
        self.find_causal_patterns();
        self.find_sequence_patterns();
    }

    /// Find events that recur at regular intervals.
    ///
    /// Regularity is `1 - min(1, stddev / mean)` over the inter-arrival
    /// intervals. A pattern registers when the timing is consistent
    /// (regularity above the floor) and slow enough to be a rhythm rather
    /// than noise (mean at or above the minimum interval).
    fn find_temporal_patterns(&mut self) {
        let mut times_by_key: BTreeMap<String, Vec<DateTime<Utc>>> = BTreeMap::new();
        for event in &self.history {
            times_by_key.entry(event.key()).or_default().push(event.timestamp);
        }

        for (key, times) in times_by_key {
            if times.len() < self.config.min_occurrences as usize {
                continue;
            }

            let intervals: Vec<f64> = times
                .windows(2)
                .filter_map(|pair| {
                    let earlier = pair.first()?;
                    let later = pair.get(1)?;
                    Some(ms_to_f64(
                        later.signed_duration_since(*earlier).num_milliseconds(),
                    ))
                })
                .collect();
            if intervals.is_empty() {
                continue;
            }

            let count = ms_to_f64(i64::try_from(intervals.len()).unwrap_or(i64::MAX));
            let mean = intervals.iter().sum::<f64>() / count;
            if mean <= 0.0 {
                continue;
            }
            let variance = intervals
                .iter()
                .map(|interval| (interval - mean).powi(2))
                .sum::<f64>()
                / count;
            let regularity = 1.0 - (variance.sqrt() / mean).min(1.0);

            if regularity > self.config.temporal_regularity_floor
                && mean >= self.config.temporal_min_interval_ms
            {
                if !self.temporal.contains_key(&key) {
                    info!(%key, mean_ms = mean, regularity, "new temporal pattern");
                }
                self.temporal.insert(
                    key.clone(),
                    TemporalPattern {
                        event_key: key,
                        average_interval_ms: mean,
                        regularity,
                        occurrences: times,
                    },
                );
            }
        }
    }

    /// Find cause -> effect pairs whose pair count clears the observation
    /// minimum and whose probability clears the floor.
    ///
    /// Probability is the pair count over the cause's occurrence count in
    /// the current history window.
    fn find_causal_patterns(&mut self) {
        let mut updates: Vec<CausalPattern> = Vec::new();

        for (cause, effects) in &self.cooccurrence {
            let cause_total = self
                .history
                .iter()
                .filter(|event| event.key() == *cause)
                .count();
            let Ok(cause_total) = u32::try_from(cause_total) else {
                continue;
            };
            if cause_total == 0 {
                continue;
            }

            for (effect, &count) in effects {
                if count < self.config.min_occurrences {
                    continue;
                }
                let probability = (f64::from(count) / f64::from(cause_total)).min(1.0);
                if probability > self.config.causal_probability_floor {
                    updates.push(CausalPattern {
                        cause: cause.clone(),
                        effect: effect.clone(),
                        probability,
                        observation_count: count,
                    });
                }
            }
        }

        for pattern in updates {
            let row = self.causal.entry(pattern.cause.clone()).or_default();
            if !row.contains_key(&pattern.effect) {
                info!(
                    cause = %pattern.cause,
                    effect = %pattern.effect,
                    probability = pattern.probability,
                    "new causal pattern"
                );
            }
            row.insert(pattern.effect.clone(), pattern);
        }
    }

    /// Find exact consecutive event-key chains (length 3-5) that repeat.
    fn find_sequence_patterns(&mut self) {
        if self.history.len() < MIN_SEQUENCE_LEN.saturating_mul(2) {
            return;
        }

        let keys: Vec<String> = self.history.iter().map(Event::key).collect();

        for length in MIN_SEQUENCE_LEN..=MAX_SEQUENCE_LEN {
            if keys.len() < length {
                continue;
            }

            let mut counts: BTreeMap<String, u32> = BTreeMap::new();
            for window in keys.windows(length) {
                let joined = window.join(SEQUENCE_SEPARATOR);
                let count = counts.entry(joined).or_insert(0);
                *count = count.saturating_add(1);
            }

            for (joined, count) in counts {
                if count < 2 {
                    continue;
                }
                if let Some(existing) = self.sequences.get_mut(&joined) {
                    existing.occurrences = count;
                    existing.refresh_confidence();
                } else if self.sequences.len() < self.config.max_sequence_patterns {
                    let mut pattern = SequencePattern {
                        sequence: joined
                            .split(SEQUENCE_SEPARATOR)
                            .map(String::from)
                            .collect(),
                        occurrences: count,
                        confidence: 0.0,
                    };
                    pattern.refresh_confidence();
                    debug!(sequence = %joined, count, "new sequence pattern");
                    self.sequences.insert(joined, pattern);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Prediction
    // -----------------------------------------------------------------------

    /// Predict what tends to follow the given event, most probable first.
    ///
    /// The key matches a causal pattern's cause exactly, or by data suffix
    /// (so callers can pass just the data part of a `kind:data` key).
    pub fn predict_next(&self, current_event_key: &str) -> Vec<Prediction> {
        let suffix = format!(":{current_event_key}");
        let mut predictions: Vec<Prediction> = self
            .causal
            .iter()
            .filter(|(cause, _)| {
                *cause == current_event_key || cause.ends_with(&suffix)
            })
            .flat_map(|(_, row)| {
                row.values().map(|pattern| Prediction {
                    effect: pattern.effect.clone(),
                    probability: pattern.probability,
                })
            })
            .collect();

        predictions.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        predictions
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Events currently in the ring history.
    pub fn event_count(&self) -> usize {
        self.history.len()
    }

    /// A temporal pattern by event key, if recognized.
    pub fn temporal_pattern(&self, key: &str) -> Option<&TemporalPattern> {
        self.temporal.get(key)
    }

    /// A causal pattern by cause and effect, if recognized.
    pub fn causal_pattern(&self, cause: &str, effect: &str) -> Option<&CausalPattern> {
        self.causal.get(cause).and_then(|row| row.get(effect))
    }

    /// A sequence pattern by its joined chain, if recognized.
    pub fn sequence_pattern(&self, joined: &str) -> Option<&SequencePattern> {
        self.sequences.get(joined)
    }

    /// Number of recognized sequence patterns.
    pub fn sequence_pattern_count(&self) -> usize {
        self.sequences.len()
    }

    /// Summarize the analyzer for observability.
    pub fn status(&self) -> AnalyzerStatus {
        let temporal_patterns = self.temporal.len();
        let causal_patterns: usize = self.causal.values().map(BTreeMap::len).sum();
        let sequence_patterns = self.sequences.len();
        AnalyzerStatus {
            event_count: self.history.len(),
            temporal_patterns,
            causal_patterns,
            sequence_patterns,
            total_patterns: temporal_patterns
                .saturating_add(causal_patterns)
                .saturating_add(sequence_patterns),
        }
    }
}

impl Default for EventPatternAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
