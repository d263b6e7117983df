//! Timed evidence capture.
//!
//! When an alert fires with video capture enabled, the recorder starts a
//! session that appends every subsequent frame image to an artifact file.
//! A timer finalizes the session after a fixed duration and hands the clip
//! to the delivery queue as a video job. At most one session is active at
//! a time; a fire while recording is ignored, not queued.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use vigil_models::{Alert, AlertId, DeliveryJob};

use crate::error::PipelineResult;

/// Default recording length.
pub const DEFAULT_RECORDING_DURATION: Duration = Duration::from_secs(5);

/// Metadata of the live session, shared with the finalize timer.
///
/// The mutex is held only to check or flip the session state, never across
/// file or queue I/O.
#[derive(Debug, Clone)]
struct SessionMeta {
    alert: Alert,
    path: PathBuf,
}

struct SessionFile {
    alert_id: AlertId,
    file: File,
}

/// Evidence recorder: Idle -> Recording -> Idle.
pub struct EvidenceRecorder {
    work_dir: PathBuf,
    target_duration: Duration,
    recipients: Vec<String>,
    jobs: mpsc::Sender<DeliveryJob>,
    active: Arc<Mutex<Option<SessionMeta>>>,
    // Owned by the frame loop; the timer only ever clears `active`.
    writer: Option<SessionFile>,
}

impl EvidenceRecorder {
    pub fn new(
        work_dir: impl Into<PathBuf>,
        target_duration: Duration,
        recipients: Vec<String>,
        jobs: mpsc::Sender<DeliveryJob>,
    ) -> Self {
        Self {
            work_dir: work_dir.into(),
            target_duration,
            recipients,
            jobs,
            active: Arc::new(Mutex::new(None)),
            writer: None,
        }
    }

    /// Whether a session is currently recording.
    pub fn is_active(&self) -> bool {
        self.lock_active().is_some()
    }

    /// Start a recording session for `alert`.
    ///
    /// Returns `Ok(false)` (and does nothing) when a session is already
    /// active. Any stale artifact left over for the same alert id is
    /// removed first.
    pub fn start(&mut self, alert: &Alert) -> PipelineResult<bool> {
        if self.lock_active().is_some() {
            debug!(alert_id = %alert.id, "Recording already active, ignoring start");
            return Ok(false);
        }

        std::fs::create_dir_all(&self.work_dir)?;
        let path = self.artifact_path(&alert.id);
        if path.exists() {
            std::fs::remove_file(&path)?;
            debug!(alert_id = %alert.id, "Removed stale evidence artifact");
        }
        let file = File::create(&path)?;

        let meta = SessionMeta {
            alert: alert.clone(),
            path,
        };
        self.writer = Some(SessionFile {
            alert_id: alert.id.clone(),
            file,
        });
        *self.lock_active() = Some(meta);

        info!(
            alert_id = %alert.id,
            duration_secs = self.target_duration.as_secs(),
            "Recording session started"
        );
        self.spawn_finalize_timer();
        Ok(true)
    }

    /// Append a frame image to the live artifact.
    ///
    /// No-op when idle. A write failure abandons the session (forced back
    /// to Idle, no video job).
    pub fn append_frame(&mut self, image: &[u8]) {
        if self.lock_active().is_none() {
            // Timer fired; release the handle the frame loop still holds.
            self.writer = None;
            return;
        }

        if let Some(session) = &mut self.writer {
            if let Err(e) = session.file.write_all(image) {
                error!(
                    alert_id = %session.alert_id,
                    "Evidence write failed, abandoning recording: {}", e
                );
                self.writer = None;
                *self.lock_active() = None;
            }
        }
    }

    fn artifact_path(&self, alert_id: &AlertId) -> PathBuf {
        self.work_dir.join(format!("{}.mjpeg", alert_id))
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<SessionMeta>> {
        self.active.lock().expect("recorder session lock poisoned")
    }

    fn spawn_finalize_timer(&self) {
        let active = Arc::clone(&self.active);
        let jobs = self.jobs.clone();
        let recipients = self.recipients.clone();
        let duration = self.target_duration;

        tokio::spawn(async move {
            tokio::time::sleep(duration).await;

            let meta = active.lock().expect("recorder session lock poisoned").take();
            let Some(meta) = meta else {
                // Session was abandoned before the timer fired.
                return;
            };

            match tokio::fs::read(&meta.path).await {
                Ok(clip) => {
                    let alert_id = meta.alert.id.clone();
                    let bytes = clip.len();
                    let job = DeliveryJob::video(meta.alert, clip, recipients);
                    if jobs.send(job).await.is_err() {
                        warn!(alert_id = %alert_id, "Delivery queue closed, dropping video job");
                    } else {
                        info!(alert_id = %alert_id, bytes, "Recording finalized, video job queued");
                    }
                }
                Err(e) => {
                    warn!(
                        alert_id = %meta.alert.id,
                        "Evidence artifact unreadable at finalize, skipping hand-off: {}", e
                    );
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vigil_models::ChannelKind;

    fn alert(counter: u64) -> Alert {
        Alert::new(counter, vec!["fire".into()], Utc::now())
    }

    fn recorder(
        dir: &std::path::Path,
        duration: Duration,
    ) -> (EvidenceRecorder, mpsc::Receiver<DeliveryJob>) {
        let (tx, rx) = mpsc::channel(4);
        let rec = EvidenceRecorder::new(dir, duration, vec!["+100".into()], tx);
        (rec, rx)
    }

    #[tokio::test]
    async fn test_start_removes_stale_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("ALERT001.mjpeg");
        std::fs::write(&stale, b"old run").unwrap();

        let (mut rec, _rx) = recorder(dir.path(), Duration::from_secs(60));
        assert!(rec.start(&alert(1)).unwrap());
        assert_eq!(std::fs::read(&stale).unwrap(), Vec::<u8>::new());
    }

    #[tokio::test]
    async fn test_second_start_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (mut rec, _rx) = recorder(dir.path(), Duration::from_secs(60));
        assert!(rec.start(&alert(1)).unwrap());
        assert!(!rec.start(&alert(2)).unwrap());
        assert!(rec.is_active());
        // only the first session's artifact exists
        assert!(dir.path().join("ALERT001.mjpeg").exists());
        assert!(!dir.path().join("ALERT002.mjpeg").exists());
    }

    #[tokio::test]
    async fn test_finalize_queues_video_job() {
        let dir = tempfile::tempdir().unwrap();
        let (mut rec, mut rx) = recorder(dir.path(), Duration::from_millis(50));
        rec.start(&alert(1)).unwrap();
        rec.append_frame(b"frame-1");
        rec.append_frame(b"frame-2");

        let job = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timer should finalize")
            .expect("job should be queued");
        assert_eq!(job.kind, ChannelKind::Video);
        assert_eq!(job.alert.id.as_str(), "ALERT001");
        assert_eq!(job.media.as_deref(), Some(&b"frame-1frame-2"[..]));
        assert_eq!(job.recipients, vec!["+100".to_string()]);
        assert!(!rec.is_active());
    }

    #[tokio::test]
    async fn test_missing_artifact_skips_handoff() {
        let dir = tempfile::tempdir().unwrap();
        let (mut rec, mut rx) = recorder(dir.path(), Duration::from_millis(50));
        rec.start(&alert(1)).unwrap();
        std::fs::remove_file(dir.path().join("ALERT001.mjpeg")).unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
        assert!(!rec.is_active());
    }

    #[tokio::test]
    async fn test_append_after_finalize_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (mut rec, mut rx) = recorder(dir.path(), Duration::from_millis(30));
        rec.start(&alert(1)).unwrap();
        let _ = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
        rec.append_frame(b"late frame");
        assert!(!rec.is_active());
    }

    #[tokio::test]
    async fn test_start_propagates_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        // work dir cannot be created underneath a regular file
        let (mut rec, _rx) = recorder(&blocker.join("evidence"), Duration::from_secs(60));
        assert!(rec.start(&alert(1)).is_err());
        assert!(!rec.is_active());
    }
}
