//! Application configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use vigil_notify::DispatchConfig;
use vigil_pipeline::PipelineConfig;

use crate::error::{WorkerError, WorkerResult};

/// What to do with jobs still queued when shutdown is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrainPolicy {
    /// Process the remaining backlog before stopping
    #[default]
    Finish,
    /// Drop the backlog (alerts are advisory, not durable)
    Discard,
}

impl FromStr for DrainPolicy {
    type Err = WorkerError;

    fn from_str(s: &str) -> WorkerResult<Self> {
        match s.to_lowercase().as_str() {
            "finish" => Ok(DrainPolicy::Finish),
            "discard" => Ok(DrainPolicy::Discard),
            other => Err(WorkerError::config(format!(
                "unknown drain policy: {}",
                other
            ))),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Minimum detector confidence (strict)
    pub confidence_threshold: f64,
    /// Debounce cooldown window
    pub cooldown: Duration,
    /// Starting alert counter value
    pub initial_alert_counter: u64,
    /// Recipients to fan alerts out to
    pub recipients: Vec<String>,
    /// Base URL of the message gateway
    pub gateway_url: String,
    /// Deliver detection images instead of plain text
    pub send_images: bool,
    /// Capture and deliver evidence clips
    pub send_videos: bool,
    /// Evidence recording length
    pub recording_duration: Duration,
    /// Directory for evidence artifacts
    pub work_dir: PathBuf,
    /// Delivery queue capacity
    pub queue_capacity: usize,
    /// Shutdown backlog policy
    pub drain_policy: DrainPolicy,
    /// Per-send timeouts by channel kind
    pub text_timeout: Duration,
    pub image_timeout: Duration,
    pub video_timeout: Duration,
    /// Priority line for alert messages
    pub priority: String,
    /// Graceful shutdown timeout for the delivery worker
    pub shutdown_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            cooldown: Duration::from_secs(10),
            initial_alert_counter: 1,
            recipients: Vec::new(),
            gateway_url: "http://localhost:8000".to_string(),
            send_images: false,
            send_videos: false,
            recording_duration: Duration::from_secs(5),
            work_dir: PathBuf::from("/tmp/vigil"),
            queue_capacity: 64,
            drain_policy: DrainPolicy::Finish,
            text_timeout: Duration::from_secs(30),
            image_timeout: Duration::from_secs(60),
            video_timeout: Duration::from_secs(120),
            priority: "High".to_string(),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl AppConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            confidence_threshold: std::env::var("VIGIL_CONFIDENCE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.confidence_threshold),
            cooldown: Duration::from_secs(
                std::env::var("VIGIL_COOLDOWN_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            initial_alert_counter: std::env::var("VIGIL_INITIAL_ALERT_COUNTER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.initial_alert_counter),
            recipients: std::env::var("VIGIL_RECIPIENTS")
                .map(|s| parse_recipients(&s))
                .unwrap_or_default(),
            gateway_url: std::env::var("VIGIL_GATEWAY_URL")
                .unwrap_or_else(|_| defaults.gateway_url.clone()),
            send_images: std::env::var("VIGIL_SEND_IMAGES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            send_videos: std::env::var("VIGIL_SEND_VIDEOS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            recording_duration: Duration::from_secs(
                std::env::var("VIGIL_RECORDING_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            work_dir: std::env::var("VIGIL_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| defaults.work_dir.clone()),
            queue_capacity: std::env::var("VIGIL_QUEUE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.queue_capacity),
            drain_policy: std::env::var("VIGIL_DRAIN_POLICY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            text_timeout: Duration::from_secs(
                std::env::var("VIGIL_TEXT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            image_timeout: Duration::from_secs(
                std::env::var("VIGIL_IMAGE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            video_timeout: Duration::from_secs(
                std::env::var("VIGIL_VIDEO_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            priority: std::env::var("VIGIL_ALERT_PRIORITY")
                .unwrap_or_else(|_| defaults.priority.clone()),
            shutdown_timeout: Duration::from_secs(
                std::env::var("VIGIL_SHUTDOWN_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Pipeline view of the configuration.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            confidence_threshold: self.confidence_threshold,
            cooldown: self.cooldown,
            initial_alert_counter: self.initial_alert_counter,
            send_images: self.send_images,
            send_videos: self.send_videos,
            recording_duration: self.recording_duration,
            work_dir: self.work_dir.clone(),
            recipients: self.recipients.clone(),
        }
    }

    /// Dispatcher view of the configuration.
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            text_timeout: self.text_timeout,
            image_timeout: self.image_timeout,
            video_timeout: self.video_timeout,
            priority: self.priority.clone(),
        }
    }
}

/// Split a comma-separated recipient list, dropping empty entries.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
