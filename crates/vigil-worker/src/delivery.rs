//! The delivery worker task.
//!
//! Pulls delivery jobs off the queue and hands each to the dispatcher.
//! The frame loop never waits on deliveries; this task absorbs slow
//! gateways so detection keeps ticking.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use vigil_models::DeliveryJob;
use vigil_notify::{Dispatcher, NotificationChannel};

use crate::config::DrainPolicy;

/// Queue-driven delivery loop.
pub struct DeliveryWorker<C> {
    jobs: mpsc::Receiver<DeliveryJob>,
    dispatcher: Dispatcher<C>,
    shutdown: watch::Receiver<bool>,
    drain_policy: DrainPolicy,
}

impl<C: NotificationChannel> DeliveryWorker<C> {
    pub fn new(
        jobs: mpsc::Receiver<DeliveryJob>,
        dispatcher: Dispatcher<C>,
        shutdown: watch::Receiver<bool>,
        drain_policy: DrainPolicy,
    ) -> Self {
        Self {
            jobs,
            dispatcher,
            shutdown,
            drain_policy,
        }
    }

    /// Run until the queue closes or shutdown is signalled.
    pub async fn run(mut self) {
        info!(policy = ?self.drain_policy, "Delivery worker started");
        loop {
            let job = tokio::select! {
                biased;
                changed = self.shutdown.changed() => {
                    // a dropped sender counts as a shutdown request
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                job = self.jobs.recv() => match job {
                    Some(job) => job,
                    None => {
                        debug!("Delivery queue closed, worker exiting");
                        return;
                    }
                },
            };
            self.handle(job).await;
        }
        self.drain().await;
    }

    /// Handle the backlog left in the queue at shutdown.
    async fn drain(&mut self) {
        match self.drain_policy {
            DrainPolicy::Finish => {
                let mut drained = 0usize;
                while let Ok(job) = self.jobs.try_recv() {
                    self.handle(job).await;
                    drained += 1;
                }
                info!(drained, "Delivery worker drained backlog and stopped");
            }
            DrainPolicy::Discard => {
                let mut discarded = 0usize;
                while self.jobs.try_recv().is_ok() {
                    discarded += 1;
                }
                if discarded > 0 {
                    warn!(discarded, "Delivery worker discarded queued jobs at shutdown");
                }
            }
        }
    }

    async fn handle(&self, job: DeliveryJob) {
        let summary = self.dispatcher.dispatch(&job).await;
        if !summary.succeeded() {
            warn!(
                alert_id = %job.alert.id,
                kind = job.kind.as_str(),
                "Delivery reached no recipient ({}/{})",
                summary.success_count,
                summary.total
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::Utc;
    use vigil_models::{Alert, SendReceipt};
    use vigil_notify::DispatchConfig;

    #[derive(Default)]
    struct CountingChannel {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl NotificationChannel for CountingChannel {
        async fn send_text(&self, _recipient: &str, _message: &str) -> SendReceipt {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SendReceipt::ok("sent", None)
        }

        async fn send_image(&self, _recipient: &str, _image: &[u8], _caption: &str) -> SendReceipt {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SendReceipt::ok("sent", None)
        }

        async fn send_video(&self, _recipient: &str, _video: &[u8], _caption: &str) -> SendReceipt {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SendReceipt::ok("sent", None)
        }
    }

    fn job(counter: u64) -> DeliveryJob {
        DeliveryJob::text(
            Alert::new(counter, vec!["fire".into()], Utc::now()),
            vec!["+100".into()],
        )
    }

    fn worker(
        policy: DrainPolicy,
    ) -> (
        mpsc::Sender<DeliveryJob>,
        watch::Sender<bool>,
        DeliveryWorker<Arc<CountingChannel>>,
        Arc<CountingChannel>,
    ) {
        let channel = Arc::new(CountingChannel::default());
        let (tx, rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = DeliveryWorker::new(
            rx,
            Dispatcher::new(channel.clone(), DispatchConfig::default()),
            shutdown_rx,
            policy,
        );
        (tx, shutdown_tx, worker, channel)
    }

    #[tokio::test]
    async fn test_processes_jobs_until_queue_closes() {
        let (tx, _shutdown, worker, channel) = worker(DrainPolicy::Finish);
        tx.send(job(1)).await.unwrap();
        tx.send(job(2)).await.unwrap();
        drop(tx);

        worker.run().await;
        assert_eq!(channel.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_finish_policy_drains_backlog() {
        let (tx, shutdown, worker, channel) = worker(DrainPolicy::Finish);
        for i in 1..=3 {
            tx.send(job(i)).await.unwrap();
        }
        shutdown.send(true).unwrap();

        worker.run().await;
        assert_eq!(channel.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_discard_policy_drops_backlog() {
        let (tx, shutdown, worker, channel) = worker(DrainPolicy::Discard);
        for i in 1..=3 {
            tx.send(job(i)).await.unwrap();
        }
        shutdown.send(true).unwrap();

        worker.run().await;
        assert_eq!(channel.calls.load(Ordering::SeqCst), 0);
    }
}
