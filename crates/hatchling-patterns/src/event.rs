//! The event record fed into the analyzer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Build the canonical key for an event type and data pair.
pub fn event_key(kind: &str, data: &str) -> String {
    format!("{kind}:{data}")
}

/// A discrete labeled observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type (the channel it arrived on).
    pub kind: String,
    /// Event payload label.
    pub data: String,
    /// When the event was observed.
    pub timestamp: DateTime<Utc>,
    /// Free-form context captured with the event.
    pub context: BTreeMap<String, serde_json::Value>,
}

impl Event {
    /// The canonical `kind:data` key for this event.
    pub fn key(&self) -> String {
        event_key(&self.kind, &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_joins_kind_and_data() {
        let event = Event {
            kind: String::from("door"),
            data: String::from("open"),
            timestamp: DateTime::UNIX_EPOCH,
            context: BTreeMap::new(),
        };
        assert_eq!(event.key(), "door:open");
        assert_eq!(event_key("door", "open"), "door:open");
    }
}
