//! The frame-processing pipeline.
//!
//! One `FramePipeline` is owned by the frame loop and is the single writer
//! of all debounce and alert-counter state. Its only output is delivery
//! jobs pushed into the queue, which it does without blocking.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use vigil_models::{Alert, ChannelKind, DeliveryJob, FrameEvent};

use crate::alert::AlertAllocator;
use crate::debounce::{Debouncer, DEFAULT_COOLDOWN};
use crate::normalize::active_labels;
use crate::recorder::{EvidenceRecorder, DEFAULT_RECORDING_DURATION};
use crate::status::{PipelineStatus, StatusHandle};

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum detector confidence for a detection to count (strict)
    pub confidence_threshold: f64,
    /// Cooldown window between two alerts for the same label
    pub cooldown: Duration,
    /// Starting value for the alert counter
    pub initial_alert_counter: u64,
    /// Deliver detection images (suppresses plain text delivery)
    pub send_images: bool,
    /// Capture and deliver evidence clips
    pub send_videos: bool,
    /// Evidence recording length
    pub recording_duration: Duration,
    /// Directory for evidence artifacts
    pub work_dir: PathBuf,
    /// Recipients stamped onto every delivery job
    pub recipients: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            cooldown: DEFAULT_COOLDOWN,
            initial_alert_counter: 1,
            send_images: false,
            send_videos: false,
            recording_duration: DEFAULT_RECORDING_DURATION,
            work_dir: PathBuf::from("/tmp/vigil"),
            recipients: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// The effective delivery mode, by precedence: video, then image,
    /// then text. A richer channel suppresses text.
    pub fn enabled_channels(&self) -> Vec<ChannelKind> {
        if self.send_videos {
            vec![ChannelKind::Video]
        } else if self.send_images {
            vec![ChannelKind::Image]
        } else {
            vec![ChannelKind::Text]
        }
    }
}

/// Detection normalizer + debouncer + allocator + evidence capture,
/// wired to the delivery queue.
pub struct FramePipeline {
    config: PipelineConfig,
    debouncer: Debouncer,
    allocator: AlertAllocator,
    recorder: Option<EvidenceRecorder>,
    jobs: mpsc::Sender<DeliveryJob>,
    status: StatusHandle,
}

impl FramePipeline {
    pub fn new(config: PipelineConfig, jobs: mpsc::Sender<DeliveryJob>) -> Self {
        let recorder = config.send_videos.then(|| {
            EvidenceRecorder::new(
                config.work_dir.clone(),
                config.recording_duration,
                config.recipients.clone(),
                jobs.clone(),
            )
        });

        let status = StatusHandle::new(PipelineStatus {
            enabled_channels: config.enabled_channels(),
            recipient_count: config.recipients.len(),
            alert_counter: config.initial_alert_counter,
            recording_active: false,
            last_update: None,
        });

        Self {
            debouncer: Debouncer::new(config.cooldown),
            allocator: AlertAllocator::new(config.initial_alert_counter),
            recorder,
            jobs,
            status,
            config,
        }
    }

    /// Handle to the status snapshot, for the observability surface.
    pub fn status(&self) -> StatusHandle {
        self.status.clone()
    }

    /// Process one frame event.
    ///
    /// Returns the alert allocated for this frame, if any. Never fails: a
    /// detector error yields an empty active set and the frame still ticks
    /// the cooldown clocks.
    pub fn process(&mut self, event: &FrameEvent) -> Option<Alert> {
        if let Some(err) = &event.error {
            warn!("Detector failed on frame, treating as empty: {}", err);
        }
        let detections: &[_] = if event.error.is_some() {
            &[]
        } else {
            &event.detections
        };

        let active = active_labels(detections, self.config.confidence_threshold);
        let new_labels = self.debouncer.observe(&active, event.timestamp);

        let alert = self.allocator.allocate(new_labels, event.timestamp);
        if let Some(alert) = &alert {
            info!(
                alert_id = %alert.id,
                labels = %alert.labels_joined(),
                "New alert"
            );
            let recording = match &mut self.recorder {
                Some(recorder) => match recorder.start(alert) {
                    Ok(_) => recorder.is_active(),
                    Err(e) => {
                        error!(alert_id = %alert.id, "Failed to start recording: {}", e);
                        false
                    }
                },
                None => false,
            };
            if let Some(job) = self.build_job(alert, event, recording) {
                self.enqueue(job);
            }
        }

        // While recording, every frame image goes into the artifact,
        // whether or not it alerted.
        if let Some(recorder) = &mut self.recorder {
            if let Some(image) = &event.image {
                recorder.append_frame(image);
            }
        }

        let counter = self.allocator.next_counter();
        let recording = self.recorder.as_ref().is_some_and(|r| r.is_active());
        self.status.update(|s| {
            s.alert_counter = counter;
            s.recording_active = recording;
            s.last_update = Some(event.timestamp);
        });

        alert
    }

    /// Pick the effective channel for a fresh alert.
    ///
    /// Mode precedence is video, then image, then text; a richer channel
    /// suppresses text. In video mode the only delivery is the clip queued
    /// when the recording finalizes, so an alert with a live recording
    /// produces no immediate job. Each mode falls back to the next one
    /// down when it cannot apply to this alert.
    fn build_job(&self, alert: &Alert, event: &FrameEvent, recording: bool) -> Option<DeliveryJob> {
        if self.config.send_videos {
            if recording {
                return None;
            }
            warn!(
                alert_id = %alert.id,
                "Video delivery enabled but no recording is running, falling back"
            );
        }
        if self.config.send_images {
            match &event.image {
                Some(image) => {
                    return Some(DeliveryJob::image(
                        alert.clone(),
                        image.clone(),
                        self.config.recipients.clone(),
                    ))
                }
                None => warn!(
                    alert_id = %alert.id,
                    "Image delivery enabled but frame carried no image, falling back to text"
                ),
            }
        }
        Some(DeliveryJob::text(alert.clone(), self.config.recipients.clone()))
    }

    fn enqueue(&self, job: DeliveryJob) {
        match self.jobs.try_send(job) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(alert_id = %job.alert.id, "Delivery queue full, dropping job");
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                warn!(alert_id = %job.alert.id, "Delivery queue closed, dropping job");
            }
        }
    }
}
