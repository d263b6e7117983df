//! Delivery jobs and outcomes.

use serde::{Deserialize, Serialize};

use crate::alert::Alert;

/// The kind of channel a delivery job goes out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Plain text message
    Text,
    /// Still image with caption
    Image,
    /// Video clip with caption
    Video,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Text => "text",
            ChannelKind::Image => "image",
            ChannelKind::Video => "video",
        }
    }
}

/// A unit of outbound work queued for asynchronous delivery.
///
/// Created once, consumed by exactly one worker, never mutated after
/// enqueue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryJob {
    /// The alert being delivered
    pub alert: Alert,
    /// Channel kind for this job
    pub kind: ChannelKind,
    /// Media payload (JPEG bytes for image jobs, clip bytes for video jobs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<u8>>,
    /// Recipients to fan out to, in configured order
    pub recipients: Vec<String>,
}

impl DeliveryJob {
    /// Create a text delivery job.
    pub fn text(alert: Alert, recipients: Vec<String>) -> Self {
        Self {
            alert,
            kind: ChannelKind::Text,
            media: None,
            recipients,
        }
    }

    /// Create an image delivery job.
    pub fn image(alert: Alert, image: Vec<u8>, recipients: Vec<String>) -> Self {
        Self {
            alert,
            kind: ChannelKind::Image,
            media: Some(image),
            recipients,
        }
    }

    /// Create a video delivery job.
    pub fn video(alert: Alert, clip: Vec<u8>, recipients: Vec<String>) -> Self {
        Self {
            alert,
            kind: ChannelKind::Video,
            media: Some(clip),
            recipients,
        }
    }
}

/// Result of sending one message through the notification channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendReceipt {
    /// Whether the channel accepted the message
    pub success: bool,
    /// Human-readable status from the channel
    pub message: String,
    /// Provider message id, when the channel reports one
    #[serde(rename = "messageId", skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl SendReceipt {
    /// A successful receipt.
    pub fn ok(message: impl Into<String>, message_id: Option<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            message_id,
        }
    }

    /// A failed receipt.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            message_id: None,
        }
    }
}

/// Per-recipient delivery outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    /// Recipient this outcome is for
    pub recipient: String,
    /// Whether delivery succeeded
    pub success: bool,
    /// Failure detail, when delivery did not succeed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn success(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            success: true,
            error: None,
        }
    }

    pub fn failure(recipient: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregated fan-out result for one delivery job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliverySummary {
    /// Number of recipients that were delivered to
    pub success_count: usize,
    /// Number of recipients attempted
    pub total: usize,
    /// Per-recipient details, in recipient order
    pub details: Vec<DeliveryOutcome>,
}

impl DeliverySummary {
    /// Summary for a dispatch that attempted nothing (no recipients).
    pub fn empty() -> Self {
        Self {
            success_count: 0,
            total: 0,
            details: Vec::new(),
        }
    }

    /// Aggregate per-recipient outcomes.
    pub fn from_outcomes(details: Vec<DeliveryOutcome>) -> Self {
        let success_count = details.iter().filter(|o| o.success).count();
        Self {
            success_count,
            total: details.len(),
            details,
        }
    }

    /// Overall success: at least one recipient got the message.
    pub fn succeeded(&self) -> bool {
        self.success_count > 0
    }
}
