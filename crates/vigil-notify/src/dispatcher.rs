//! Fan-out delivery dispatcher.
//!
//! One delivery job goes out to every recipient independently and in
//! parallel. A recipient that fails, hangs or rejects the payload never
//! affects the others; each send is bounded by a per-channel-kind timeout.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::timeout;
use tracing::{info, warn};

use vigil_models::{Alert, ChannelKind, DeliveryJob, DeliveryOutcome, DeliverySummary};

use crate::channel::NotificationChannel;

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Per-send timeout for text messages
    pub text_timeout: Duration,
    /// Per-send timeout for images
    pub image_timeout: Duration,
    /// Per-send timeout for video clips
    pub video_timeout: Duration,
    /// Priority line stamped into the alert message body
    pub priority: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            text_timeout: Duration::from_secs(30),
            image_timeout: Duration::from_secs(60),
            video_timeout: Duration::from_secs(120),
            priority: "High".to_string(),
        }
    }
}

/// Fans one alert out to N recipients over a notification channel.
pub struct Dispatcher<C> {
    channel: Arc<C>,
    config: DispatchConfig,
}

impl<C: NotificationChannel> Dispatcher<C> {
    pub fn new(channel: C, config: DispatchConfig) -> Self {
        Self {
            channel: Arc::new(channel),
            config,
        }
    }

    /// Deliver a job to all its recipients.
    ///
    /// Returns an aggregate summary; overall success means at least one
    /// recipient got the message. An empty recipient list fails
    /// immediately with zero channel activity.
    pub async fn dispatch(&self, job: &DeliveryJob) -> DeliverySummary {
        if job.recipients.is_empty() {
            warn!(alert_id = %job.alert.id, "No recipients configured, nothing delivered");
            return DeliverySummary::empty();
        }

        if job.kind != ChannelKind::Text && job.media.is_none() {
            warn!(
                alert_id = %job.alert.id,
                kind = job.kind.as_str(),
                "Media job without payload, failing without channel activity"
            );
            let details = job
                .recipients
                .iter()
                .map(|r| DeliveryOutcome::failure(r, "job is missing its media payload"))
                .collect();
            return DeliverySummary::from_outcomes(details);
        }

        let message = format_alert_message(&job.alert, &self.config.priority);
        let sends = job.recipients.iter().map(|r| self.send_one(r, job, &message));
        let details = join_all(sends).await;
        let summary = DeliverySummary::from_outcomes(details);

        info!(
            alert_id = %job.alert.id,
            kind = job.kind.as_str(),
            "Delivered to {}/{} recipients",
            summary.success_count,
            summary.total
        );
        summary
    }

    async fn send_one(&self, recipient: &str, job: &DeliveryJob, message: &str) -> DeliveryOutcome {
        let limit = self.timeout_for(job.kind);
        let media = job.media.as_deref().unwrap_or_default();

        let receipt = match job.kind {
            ChannelKind::Text => timeout(limit, self.channel.send_text(recipient, message)).await,
            ChannelKind::Image => {
                timeout(limit, self.channel.send_image(recipient, media, message)).await
            }
            ChannelKind::Video => {
                timeout(limit, self.channel.send_video(recipient, media, message)).await
            }
        };

        match receipt {
            Ok(receipt) if receipt.success => DeliveryOutcome::success(recipient),
            Ok(receipt) => {
                warn!(recipient, alert_id = %job.alert.id, "Delivery failed: {}", receipt.message);
                DeliveryOutcome::failure(recipient, receipt.message)
            }
            Err(_) => {
                warn!(
                    recipient,
                    alert_id = %job.alert.id,
                    "Delivery timed out after {:?}", limit
                );
                DeliveryOutcome::failure(recipient, format!("timed out after {:?}", limit))
            }
        }
    }

    fn timeout_for(&self, kind: ChannelKind) -> Duration {
        match kind {
            ChannelKind::Text => self.config.text_timeout,
            ChannelKind::Image => self.config.image_timeout,
            ChannelKind::Video => self.config.video_timeout,
        }
    }
}

/// Build the notification message body for an alert.
pub fn format_alert_message(alert: &Alert, priority: &str) -> String {
    format!(
        "*ALERT NOTIFICATION*\n\n\
         Alert ID: {}\n\
         Type: {}\n\
         Timestamp: {}\n\
         Priority: {}\n\n\
         Description:\n{}",
        alert.id,
        alert.labels_joined(),
        alert.created_at.format("%Y-%m-%d %H:%M:%S"),
        priority,
        alert.description
    )
}
