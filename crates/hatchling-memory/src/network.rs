//! The associative graph: neurons, synapses, firing, and reinforcement.
//!
//! Neurons live in an arena keyed by [`NeuronHandle`]; a string index maps
//! concept ids to handles. Synapses live in an adjacency map keyed by
//! handle pairs, so the cyclic concept graph needs no ownership cycles.
//!
//! Activation spreads through a worklist rather than recursion: each
//! neuron fires at most once per cascade (firing is edge-triggered on
//! crossing the threshold), which bounds propagation naturally.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use hatchling_types::NeuronKind;

use crate::config::NetworkConfig;
use crate::error::MemoryError;
use crate::patterns::{
    MAX_PATTERN_LEN, MIN_PATTERN_LEN, NeuralPattern, count_runs, pattern_key,
};

// ---------------------------------------------------------------------------
// Handles and nodes
// ---------------------------------------------------------------------------

/// Arena index of a neuron.
///
/// Handles are never reused within one memory instance; an evicted
/// neuron's handle simply dangles and lookups skip it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NeuronHandle(u32);

/// A concept node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Neuron {
    /// Stable concept id (what the outside world calls this).
    id: String,
    /// The role this node plays.
    kind: NeuronKind,
    /// Human-readable name.
    label: String,
    /// Current activation (0-1).
    activation: f64,
    /// Baseline activation.
    bias: f64,
    /// When the neuron last fired.
    last_fired: Option<DateTime<Utc>>,
    /// How many times it has fired.
    fire_count: u32,
    /// Whether it is currently above the firing threshold.
    is_active: bool,
    /// When the neuron was created.
    created: DateTime<Utc>,
}

/// A weighted directed connection between two neurons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Synapse {
    /// Connection strength (0-1).
    weight: f64,
    /// When the connection last carried a reinforcement.
    last_activated: Option<DateTime<Utc>>,
    /// How many reinforcements it has carried.
    activation_count: u32,
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// One association returned by [`AssociativeMemory::associations_of`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    /// The connected concept id.
    pub concept: String,
    /// The connected concept's label.
    pub label: String,
    /// Synapse weight (0-1).
    pub strength: f64,
}

/// A summary of the network for observability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    /// Number of neurons in the arena.
    pub neuron_count: usize,
    /// Number of synapses in the adjacency map.
    pub synapse_count: usize,
    /// Number of recognized patterns.
    pub pattern_count: usize,
    /// Number of currently active neurons.
    pub active_neurons: usize,
    /// `from -> to` descriptions of connections above the strong threshold.
    pub strongest_connections: Vec<String>,
}

// ---------------------------------------------------------------------------
// AssociativeMemory
// ---------------------------------------------------------------------------

/// A weighted concept graph with Hebbian reinforcement, decay, and
/// short-horizon sequence-pattern mining.
///
/// The graph persists across creature generations -- death resets the
/// survival core, not what the creature has wired together about the
/// world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociativeMemory {
    /// Network tunables.
    config: NetworkConfig,
    /// Neuron arena.
    neurons: BTreeMap<NeuronHandle, Neuron>,
    /// Concept id -> handle index.
    index: BTreeMap<String, NeuronHandle>,
    /// Adjacency map: from-handle -> to-handle -> synapse.
    synapses: BTreeMap<NeuronHandle, BTreeMap<NeuronHandle, Synapse>>,
    /// Recent activations, oldest first (bounded window).
    recent: VecDeque<NeuronHandle>,
    /// Recognized patterns keyed by their joined id chain.
    patterns: BTreeMap<String, NeuralPattern>,
    /// Next handle to mint.
    next_handle: u32,
}

impl AssociativeMemory {
    /// Create an empty network with the given configuration.
    pub const fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            neurons: BTreeMap::new(),
            index: BTreeMap::new(),
            synapses: BTreeMap::new(),
            recent: VecDeque::new(),
            patterns: BTreeMap::new(),
            next_handle: 0,
        }
    }

    /// The active configuration.
    pub const fn config(&self) -> &NetworkConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Neuron management
    // -----------------------------------------------------------------------

    /// Look up or lazily create the neuron for a concept.
    ///
    /// Creation at the capacity ceiling first evicts weak neurons (never
    /// fired and older than the idle window, or fired fewer than three
    /// times and idle longer than the window), in deterministic handle
    /// order.
    pub fn get_or_create(
        &mut self,
        id: &str,
        kind: NeuronKind,
        label: &str,
        now: DateTime<Utc>,
    ) -> Result<NeuronHandle, MemoryError> {
        if id.trim().is_empty() {
            return Err(MemoryError::InvalidConcept {
                reason: String::from("empty concept id"),
            });
        }
        if let Some(handle) = self.index.get(id) {
            return Ok(*handle);
        }

        if self.neurons.len() >= self.config.max_neurons {
            self.evict_weak(now);
        }

        let handle = NeuronHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        self.neurons.insert(
            handle,
            Neuron {
                id: id.to_owned(),
                kind,
                label: label.to_owned(),
                activation: 0.0,
                bias: 0.0,
                last_fired: None,
                fire_count: 0,
                is_active: false,
                created: now,
            },
        );
        self.index.insert(id.to_owned(), handle);
        debug!(id, label, "new neuron created");
        Ok(handle)
    }

    /// Evict neurons with near-zero use that have gone idle.
    ///
    /// A neuron is weak when it has never fired and is older than the
    /// eviction window, or has fired fewer than three times and has not
    /// fired within the window. Never-fired neurons use their creation
    /// time as the idle reference, so fresh neurons are safe.
    fn evict_weak(&mut self, now: DateTime<Utc>) {
        let idle_ms = self.config.eviction_idle_ms;
        let is_idle = |reference: DateTime<Utc>| {
            now.signed_duration_since(reference).num_milliseconds() > idle_ms
        };

        let doomed: Vec<NeuronHandle> = self
            .neurons
            .iter()
            .filter(|(_, n)| {
                let idle_reference = n.last_fired.unwrap_or(n.created);
                (n.fire_count == 0 && is_idle(n.created))
                    || (n.fire_count < 3 && is_idle(idle_reference))
            })
            .map(|(handle, _)| *handle)
            .collect();

        for handle in &doomed {
            if let Some(neuron) = self.neurons.remove(handle) {
                self.index.remove(&neuron.id);
            }
            self.synapses.remove(handle);
            for row in self.synapses.values_mut() {
                row.remove(handle);
            }
        }

        if !doomed.is_empty() {
            debug!(evicted = doomed.len(), "pruned weak neurons");
        }
    }

    // -----------------------------------------------------------------------
    // Activation
    // -----------------------------------------------------------------------

    /// Activate a concept, creating its neuron lazily if needed.
    ///
    /// Adds `intensity` to the neuron's activation (capped at 1.0). If
    /// the activation crosses the firing threshold while the neuron is
    /// inactive, the neuron fires: it propagates `activation * weight`
    /// along every outbound synapse and Hebbian reinforcement strengthens
    /// its connections to every other neuron that is active within the
    /// recent-activation window. Every activation -- including propagated
    /// ones -- lands in the history and triggers pattern mining.
    pub fn activate(
        &mut self,
        id: &str,
        intensity: f64,
        now: DateTime<Utc>,
    ) -> Result<(), MemoryError> {
        let handle = self.get_or_create(id, NeuronKind::Concept, id, now)?;

        let mut worklist: VecDeque<(NeuronHandle, f64)> = VecDeque::new();
        worklist.push_back((handle, intensity));

        while let Some((current, amount)) = worklist.pop_front() {
            let Some(neuron) = self.neurons.get_mut(&current) else {
                continue;
            };

            neuron.activation = (neuron.activation + amount).min(1.0);

            let fires = neuron.activation >= self.config.firing_threshold && !neuron.is_active;
            if fires {
                neuron.is_active = true;
                neuron.last_fired = Some(now);
                neuron.fire_count = neuron.fire_count.saturating_add(1);
                let outgoing = neuron.activation;
                debug!(id = %neuron.id, "neuron fired");

                if let Some(row) = self.synapses.get(&current) {
                    for (target, synapse) in row {
                        worklist.push_back((*target, outgoing * synapse.weight));
                    }
                }

                self.reinforce_coactive(current, now);
            }

            self.record_activation(current, now);
        }

        Ok(())
    }

    /// Hebbian reinforcement: strengthen the bidirectional connection
    /// between a firing neuron and every other active neuron in the
    /// recent-activation window, with diminishing returns.
    fn reinforce_coactive(&mut self, firing: NeuronHandle, now: DateTime<Utc>) {
        let window = self.config.hebbian_window;
        let mut coactive: Vec<NeuronHandle> = Vec::new();
        for handle in self.recent.iter().rev().take(window) {
            if *handle == firing || coactive.contains(handle) {
                continue;
            }
            if self.neurons.get(handle).is_some_and(|n| n.is_active) {
                coactive.push(*handle);
            }
        }

        for other in coactive {
            self.strengthen(firing, other, now);
            self.strengthen(other, firing, now);
        }
    }

    /// Strengthen one directed synapse by `learning_rate * (1 - weight)`.
    fn strengthen(&mut self, from: NeuronHandle, to: NeuronHandle, now: DateTime<Utc>) {
        let initial_weight = self.config.initial_weight;
        let learning_rate = self.config.learning_rate;
        let synapse = self
            .synapses
            .entry(from)
            .or_default()
            .entry(to)
            .or_insert_with(|| Synapse {
                weight: initial_weight,
                last_activated: None,
                activation_count: 0,
            });

        let increase = learning_rate * (1.0 - synapse.weight);
        synapse.weight = (synapse.weight + increase).min(1.0);
        synapse.last_activated = Some(now);
        synapse.activation_count = synapse.activation_count.saturating_add(1);
    }

    /// Append an activation to the bounded history and mine for patterns.
    fn record_activation(&mut self, handle: NeuronHandle, now: DateTime<Utc>) {
        self.recent.push_back(handle);
        while self.recent.len() > self.config.activation_history {
            self.recent.pop_front();
        }
        self.mine_patterns(now);
    }

    // -----------------------------------------------------------------------
    // Pattern mining
    // -----------------------------------------------------------------------

    /// Look for repeats of the trailing activation subsequence.
    ///
    /// For each length 2-5, the most recent run of that length is counted
    /// across the window; two or more occurrences register (or re-sight)
    /// a [`NeuralPattern`].
    fn mine_patterns(&mut self, now: DateTime<Utc>) {
        if self.recent.len() < 4 {
            return;
        }

        let history: Vec<String> = self
            .recent
            .iter()
            .filter_map(|h| self.neurons.get(h).map(|n| n.id.clone()))
            .collect();

        for length in MIN_PATTERN_LEN..=MAX_PATTERN_LEN {
            if history.len() < length.saturating_mul(2) {
                continue;
            }
            let Some(tail_start) = history.len().checked_sub(length) else {
                continue;
            };
            let Some(tail) = history.get(tail_start..) else {
                continue;
            };

            if count_runs(&history, tail) >= 2 {
                let key = pattern_key(tail);
                let pattern = self
                    .patterns
                    .entry(key.clone())
                    .or_insert_with(|| {
                        info!(%key, "new activation pattern discovered");
                        NeuralPattern::new(tail.to_vec(), now)
                    });
                pattern.sighted(now);
            }
        }
    }

    /// Predict which concept is likely to activate next.
    ///
    /// Matches recognized patterns against the last two recorded
    /// activations: a pattern of length two matches when its head equals
    /// the most recent activation; longer patterns must match both. The
    /// highest-confidence match predicts its final element.
    pub fn predict_next(&self) -> Option<String> {
        let mut tail = self.recent.iter().rev();
        let last = tail
            .next()
            .and_then(|h| self.neurons.get(h))
            .map(|n| n.id.as_str())?;
        let second_last = tail
            .next()
            .and_then(|h| self.neurons.get(h))
            .map(|n| n.id.as_str());

        let mut best: Option<(&NeuralPattern, &String)> = None;
        for pattern in self.patterns.values() {
            let n = pattern.sequence.len();
            let Some(prediction) = pattern.sequence.last() else {
                continue;
            };
            let matches = if n == 2 {
                pattern.sequence.first().map(String::as_str) == Some(last)
            } else {
                let penultimate = pattern.sequence.get(n.wrapping_sub(2)).map(String::as_str);
                let antepenultimate = pattern.sequence.get(n.wrapping_sub(3)).map(String::as_str);
                penultimate == Some(last) && antepenultimate == second_last
            };
            if matches && best.is_none_or(|(b, _)| pattern.confidence > b.confidence) {
                best = Some((pattern, prediction));
            }
        }

        best.map(|(_, prediction)| prediction.clone())
    }

    // -----------------------------------------------------------------------
    // Decay
    // -----------------------------------------------------------------------

    /// Apply one decay pass to activations and idle synapses.
    ///
    /// Every neuron with positive activation loses the decay rate and
    /// flips inactive once it drops below the firing threshold. Synapses
    /// unused for longer than the idle window lose a tenth of the decay
    /// rate.
    pub fn apply_decay(&mut self, now: DateTime<Utc>) {
        for neuron in self.neurons.values_mut() {
            if neuron.activation > 0.0 {
                neuron.activation = (neuron.activation - self.config.decay_rate).max(0.0);
                if neuron.activation < self.config.firing_threshold {
                    neuron.is_active = false;
                }
            }
        }

        let idle_ms = self.config.synapse_idle_ms;
        let weight_decay = self.config.decay_rate * 0.1;
        for row in self.synapses.values_mut() {
            for synapse in row.values_mut() {
                let idle = synapse.last_activated.is_none_or(|t| {
                    now.signed_duration_since(t).num_milliseconds() > idle_ms
                });
                if idle {
                    synapse.weight = (synapse.weight - weight_decay).max(0.0);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Associations
    // -----------------------------------------------------------------------

    /// Deliberately associate two concepts, creating both lazily.
    ///
    /// Adds `strength` to both directed synapse weights (capped at 1.0).
    /// This is how taught pairings ("this sound goes with that thing")
    /// enter the graph without waiting for co-activation.
    pub fn associate(
        &mut self,
        first: &str,
        second: &str,
        strength: f64,
        now: DateTime<Utc>,
    ) -> Result<(), MemoryError> {
        let a = self.get_or_create(first, NeuronKind::Concept, first, now)?;
        let b = self.get_or_create(second, NeuronKind::Concept, second, now)?;

        self.bump_weight(a, b, strength, now);
        self.bump_weight(b, a, strength, now);
        debug!(first, second, "association created");
        Ok(())
    }

    /// Add `strength` to one directed synapse, creating it if needed.
    fn bump_weight(&mut self, from: NeuronHandle, to: NeuronHandle, strength: f64, now: DateTime<Utc>) {
        let initial_weight = self.config.initial_weight;
        let synapse = self
            .synapses
            .entry(from)
            .or_default()
            .entry(to)
            .or_insert_with(|| Synapse {
                weight: initial_weight,
                last_activated: None,
                activation_count: 0,
            });
        synapse.weight = (synapse.weight + strength).min(1.0);
        synapse.last_activated = Some(now);
    }

    /// Everything connected to a concept above the association floor,
    /// strongest first.
    pub fn associations_of(&self, id: &str) -> Vec<Association> {
        let Some(handle) = self.index.get(id) else {
            return Vec::new();
        };
        let Some(row) = self.synapses.get(handle) else {
            return Vec::new();
        };

        let mut associations: Vec<Association> = row
            .iter()
            .filter(|(_, synapse)| synapse.weight > self.config.association_floor)
            .filter_map(|(target, synapse)| {
                self.neurons.get(target).map(|neuron| Association {
                    concept: neuron.id.clone(),
                    label: neuron.label.clone(),
                    strength: synapse.weight,
                })
            })
            .collect();

        associations.sort_by(|a, b| b.strength.total_cmp(&a.strength));
        associations
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Number of neurons in the arena.
    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    /// Number of synapses in the adjacency map.
    pub fn synapse_count(&self) -> usize {
        self.synapses.values().map(BTreeMap::len).sum()
    }

    /// Number of recognized patterns.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Number of currently active neurons.
    pub fn active_count(&self) -> usize {
        self.neurons.values().filter(|n| n.is_active).count()
    }

    /// Current activation of a concept, if its neuron exists.
    pub fn activation_of(&self, id: &str) -> Option<f64> {
        self.index
            .get(id)
            .and_then(|h| self.neurons.get(h))
            .map(|n| n.activation)
    }

    /// Whether a concept's neuron is currently active.
    pub fn is_active(&self, id: &str) -> bool {
        self.index
            .get(id)
            .and_then(|h| self.neurons.get(h))
            .is_some_and(|n| n.is_active)
    }

    /// The weight of the directed synapse between two concepts, if any.
    pub fn synapse_weight(&self, from: &str, to: &str) -> Option<f64> {
        let from_handle = self.index.get(from)?;
        let to_handle = self.index.get(to)?;
        self.synapses
            .get(from_handle)
            .and_then(|row| row.get(to_handle))
            .map(|s| s.weight)
    }

    /// A recognized pattern by its joined id chain, if any.
    pub fn pattern(&self, key: &str) -> Option<&NeuralPattern> {
        self.patterns.get(key)
    }

    /// Summarize the network for observability.
    pub fn status(&self) -> NetworkStatus {
        let strongest_connections: Vec<String> = self
            .synapses
            .iter()
            .flat_map(|(from, row)| {
                row.iter()
                    .filter(|(_, synapse)| {
                        synapse.weight > self.config.strong_connection_threshold
                    })
                    .filter_map(|(to, _)| {
                        let from_id = self.neurons.get(from).map(|n| n.id.as_str())?;
                        let to_id = self.neurons.get(to).map(|n| n.id.as_str())?;
                        Some(format!("{from_id} -> {to_id}"))
                    })
            })
            .collect();

        NetworkStatus {
            neuron_count: self.neuron_count(),
            synapse_count: self.synapse_count(),
            pattern_count: self.pattern_count(),
            active_neurons: self.active_count(),
            strongest_connections,
        }
    }
}

impl Default for AssociativeMemory {
    fn default() -> Self {
        Self::new(NetworkConfig::default())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
