//! Read-only pipeline status snapshots.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use vigil_models::ChannelKind;

/// Point-in-time view of the pipeline, safe to read from any task.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    /// Channel kinds the configuration enables
    pub enabled_channels: Vec<ChannelKind>,
    /// Number of configured recipients
    pub recipient_count: usize,
    /// Value the next alert would be allocated
    pub alert_counter: u64,
    /// Whether an evidence recording is in progress
    pub recording_active: bool,
    /// Timestamp of the last processed frame
    pub last_update: Option<DateTime<Utc>>,
}

/// Shared handle around the status snapshot.
///
/// The frame loop is the only writer; readers always get a copy, never the
/// live structure. The lock is held only for the copy.
#[derive(Clone)]
pub struct StatusHandle {
    inner: Arc<RwLock<PipelineStatus>>,
}

impl StatusHandle {
    pub fn new(initial: PipelineStatus) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Apply an update from the frame loop.
    pub fn update(&self, f: impl FnOnce(&mut PipelineStatus)) {
        let mut guard = self.inner.write().expect("status lock poisoned");
        f(&mut guard);
    }

    /// Take a snapshot copy of the current status.
    pub fn snapshot(&self) -> PipelineStatus {
        self.inner.read().expect("status lock poisoned").clone()
    }
}
