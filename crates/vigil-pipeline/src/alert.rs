//! Alert identity allocation.

use chrono::{DateTime, Utc};
use tracing::debug;
use vigil_models::Alert;

/// Allocates monotonically increasing alert identifiers.
///
/// The counter starts at a configured value, increments by exactly one per
/// alert-producing frame and never resets during the process lifetime.
/// Same single-writer discipline as the debouncer: only the frame loop
/// touches it.
#[derive(Debug)]
pub struct AlertAllocator {
    counter: u64,
}

impl AlertAllocator {
    /// Create an allocator starting at `initial` (1 in the default config).
    pub fn new(initial: u64) -> Self {
        Self { counter: initial }
    }

    /// Allocate an alert for a frame's new labels.
    ///
    /// Returns `None` for an empty label list; the counter is only
    /// consumed when an alert is actually produced.
    pub fn allocate(&mut self, labels: Vec<String>, now: DateTime<Utc>) -> Option<Alert> {
        if labels.is_empty() {
            return None;
        }
        let alert = Alert::new(self.counter, labels, now);
        self.counter += 1;
        debug!(alert_id = %alert.id, "Allocated alert");
        Some(alert)
    }

    /// The value the next alert would get.
    pub fn next_counter(&self) -> u64 {
        self.counter
    }
}
