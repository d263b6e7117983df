//! Shared data models for the vigil alert pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Raw detections and frame events from the external detector
//! - Alerts and alert identifiers
//! - Delivery jobs, per-recipient outcomes and send receipts

pub mod alert;
pub mod delivery;
pub mod detection;
pub mod event;

// Re-export common types
pub use alert::{Alert, AlertId};
pub use delivery::{
    ChannelKind, DeliveryJob, DeliveryOutcome, DeliverySummary, SendReceipt,
};
pub use detection::{BoundingBox, Detection};
pub use event::FrameEvent;
