//! Temporal debouncing of detections.
//!
//! The debouncer decides which labels of a frame's active set are worth a
//! new alert and which are repeats still inside their cooldown window. It
//! is the only durable-within-process state of the pipeline besides the
//! alert counter, and it is owned exclusively by the frame-processing task.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::warn;

/// Default cooldown between two alerts for the same label.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(10);

/// Per-label last-alert timestamps with a cooldown window.
///
/// Time is passed in by the caller, so tests control the clock.
#[derive(Debug)]
pub struct Debouncer {
    status: HashMap<String, DateTime<Utc>>,
    cooldown: chrono::Duration,
}

impl Debouncer {
    /// Create a debouncer with the given cooldown window.
    pub fn new(cooldown: Duration) -> Self {
        let cooldown = chrono::Duration::from_std(cooldown).unwrap_or_else(|_| {
            warn!("Cooldown {:?} out of range, using 10s", cooldown);
            chrono::Duration::seconds(10)
        });
        Self {
            status: HashMap::new(),
            cooldown,
        }
    }

    /// Classify a frame's active label set at time `now`.
    ///
    /// Returns the labels that should alert, in `active` order. Labels
    /// absent from `active` are evicted once they have been quiet for a
    /// full cooldown; a label that reappears inside its window is still a
    /// duplicate. That asymmetry (cooldown governs re-alerting, not
    /// presence) is intentional.
    pub fn observe(&mut self, active: &[String], now: DateTime<Utc>) -> Vec<String> {
        let mut new_labels = Vec::new();

        for label in active {
            match self.status.get(label) {
                None => {
                    self.status.insert(label.clone(), now);
                    new_labels.push(label.clone());
                }
                Some(&last) if now - last >= self.cooldown => {
                    self.status.insert(label.clone(), now);
                    new_labels.push(label.clone());
                }
                Some(_) => {} // still cooling down, suppressed
            }
        }

        self.status
            .retain(|label, &mut last| active.contains(label) || now - last < self.cooldown);

        new_labels
    }

    /// Number of labels currently tracked.
    pub fn tracked(&self) -> usize {
        self.status.len()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
