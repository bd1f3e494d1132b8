//! Configurable parameters for the survival state machine.
//!
//! Every numeric constant of the survival mechanics lives here with its
//! default value, so tests and alternative deployments can tune the
//! creature's metabolism without touching the state machine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tunable parameters for [`SurvivalCore`].
///
/// [`SurvivalCore`]: crate::core::SurvivalCore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivalConfig {
    /// Minimum milliseconds between energy drains (default: 10 000).
    pub drain_interval_ms: i64,

    /// Energy removed per drain interval (default: 0.1).
    pub drain_amount: Decimal,

    /// Milliseconds without interaction before loneliness rises
    /// (default: 60 000).
    pub interaction_timeout_ms: i64,

    /// Loneliness added per tick once the interaction timeout has passed
    /// (default: 0.1).
    pub loneliness_rise: Decimal,

    /// Comfort removed per tick once the interaction timeout has passed
    /// (default: 0.05).
    pub comfort_decay: Decimal,

    /// Fear level above which stability erodes (default: 50).
    pub fear_pressure_threshold: Decimal,

    /// Loneliness level above which stability erodes (default: 70).
    pub loneliness_pressure_threshold: Decimal,

    /// Stability removed per tick while under fear or loneliness pressure
    /// (default: 0.1).
    pub stability_decay: Decimal,

    /// Curiosity level above which an unknown stimulus is explored rather
    /// than avoided (default: 30).
    pub explore_threshold: Decimal,

    /// Energy cost of exploring an unknown stimulus (default: 0.5).
    pub exploration_cost: Decimal,

    /// Curiosity never drops below this floor when negative outcomes
    /// discourage exploration (default: 10).
    pub curiosity_floor: Decimal,
}

impl Default for SurvivalConfig {
    fn default() -> Self {
        Self {
            drain_interval_ms: 10_000,
            drain_amount: Decimal::new(1, 1),
            interaction_timeout_ms: 60_000,
            loneliness_rise: Decimal::new(1, 1),
            comfort_decay: Decimal::new(5, 2),
            fear_pressure_threshold: Decimal::from(50),
            loneliness_pressure_threshold: Decimal::from(70),
            stability_decay: Decimal::new(1, 1),
            explore_threshold: Decimal::from(30),
            exploration_cost: Decimal::new(5, 1),
            curiosity_floor: Decimal::from(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_drain_is_a_tenth_every_ten_seconds() {
        let config = SurvivalConfig::default();
        assert_eq!(config.drain_interval_ms, 10_000);
        assert_eq!(config.drain_amount, Decimal::new(1, 1));
    }

    #[test]
    fn default_pressure_thresholds() {
        let config = SurvivalConfig::default();
        assert_eq!(config.fear_pressure_threshold, Decimal::from(50));
        assert_eq!(config.loneliness_pressure_threshold, Decimal::from(70));
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let parsed: Result<SurvivalConfig, _> =
            serde_json::from_str(r#"{ "drain_interval_ms": 5000 }"#);
        let config = parsed.ok();
        assert_eq!(config.as_ref().map(|c| c.drain_interval_ms), Some(5000));
        // Unspecified fields fall back to defaults.
        assert_eq!(
            config.map(|c| c.explore_threshold),
            Some(Decimal::from(30))
        );
    }
}
