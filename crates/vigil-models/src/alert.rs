//! Alerts and alert identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an alert, e.g. "ALERT007".
///
/// The numeric part is zero-padded to 3 digits and keeps growing past 999
/// ("ALERT1000"). Identifiers are process-monotonic and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub String);

impl AlertId {
    /// Build an identifier from a counter value.
    pub fn from_counter(counter: u64) -> Self {
        Self(format!("ALERT{:03}", counter))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An alert produced by the debouncer for one or more newly seen labels.
///
/// Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Alert identifier
    pub id: AlertId,
    /// Labels that triggered the alert, in first-observed order
    pub labels: Vec<String>,
    /// When the alert fired
    pub created_at: DateTime<Utc>,
    /// Human-readable description
    pub description: String,
}

impl Alert {
    /// Build an alert from a counter value and the new labels of a frame.
    pub fn new(counter: u64, labels: Vec<String>, created_at: DateTime<Utc>) -> Self {
        let description = format!("Violation(s) detected: {}", labels.join(", "));
        Self {
            id: AlertId::from_counter(counter),
            labels,
            created_at,
            description,
        }
    }

    /// Labels joined for display ("fire, smoke").
    pub fn labels_joined(&self) -> String {
        self.labels.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_id_zero_padding() {
        assert_eq!(AlertId::from_counter(7).as_str(), "ALERT007");
        assert_eq!(AlertId::from_counter(42).as_str(), "ALERT042");
        assert_eq!(AlertId::from_counter(999).as_str(), "ALERT999");
        assert_eq!(AlertId::from_counter(1000).as_str(), "ALERT1000");
    }

    #[test]
    fn test_alert_description() {
        let alert = Alert::new(1, vec!["fire".into(), "smoke".into()], Utc::now());
        assert_eq!(alert.id.as_str(), "ALERT001");
        assert_eq!(alert.description, "Violation(s) detected: fire, smoke");
        assert_eq!(alert.labels_joined(), "fire, smoke");
    }
}
