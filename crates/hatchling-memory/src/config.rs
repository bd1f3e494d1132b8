//! Configurable parameters for the associative memory graph.

use serde::{Deserialize, Serialize};

/// Tunable parameters for [`AssociativeMemory`].
///
/// [`AssociativeMemory`]: crate::network::AssociativeMemory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Weight assigned to a synapse on creation (default: 0.1).
    pub initial_weight: f64,

    /// Hebbian reinforcement rate; each co-firing adds
    /// `learning_rate * (1 - weight)` (default: 0.1).
    pub learning_rate: f64,

    /// Activation removed from every neuron per decay pass (default: 0.01).
    pub decay_rate: f64,

    /// Activation level at which a neuron fires (default: 0.5).
    pub firing_threshold: f64,

    /// Capacity ceiling; reaching it triggers eviction of weak neurons
    /// (default: 10 000).
    pub max_neurons: usize,

    /// Length of the recent-activation history used for Hebbian
    /// reinforcement and pattern mining (default: 50).
    pub activation_history: usize,

    /// How many recent activations are considered co-active for Hebbian
    /// reinforcement (default: 10).
    pub hebbian_window: usize,

    /// A synapse unused for longer than this decays (default: 1 day).
    pub synapse_idle_ms: i64,

    /// A neuron idle for longer than this is eligible for eviction
    /// (default: 7 days).
    pub eviction_idle_ms: i64,

    /// Minimum weight for a synapse to count as an association
    /// (default: 0.2).
    pub association_floor: f64,

    /// Weight above which a connection is reported as strong
    /// (default: 0.7).
    pub strong_connection_threshold: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            initial_weight: 0.1,
            learning_rate: 0.1,
            decay_rate: 0.01,
            firing_threshold: 0.5,
            max_neurons: 10_000,
            activation_history: 50,
            hebbian_window: 10,
            synapse_idle_ms: 24 * 60 * 60 * 1000,
            eviction_idle_ms: 7 * 24 * 60 * 60 * 1000,
            association_floor: 0.2,
            strong_connection_threshold: 0.7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds() {
        let config = NetworkConfig::default();
        assert!(config.firing_threshold > config.decay_rate);
        assert_eq!(config.max_neurons, 10_000);
        assert_eq!(config.activation_history, 50);
        assert_eq!(config.hebbian_window, 10);
    }

    #[test]
    fn default_idle_windows() {
        let config = NetworkConfig::default();
        assert_eq!(config.synapse_idle_ms, 86_400_000);
        assert_eq!(config.eviction_idle_ms, 604_800_000);
    }
}
