//! Detection alert pipeline binary.

use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vigil_notify::{Dispatcher, GatewayClient};
use vigil_pipeline::FramePipeline;
use vigil_worker::{AppConfig, DeliveryWorker, DetectionFeed};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("vigil=info".parse().unwrap())
        .add_directive("hyper=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting vigil");

    let config = AppConfig::from_env();
    info!("Config: {:?}", config);
    if config.recipients.is_empty() {
        warn!("No recipients configured; alerts will be detected but not delivered");
    }

    let gateway = match GatewayClient::new(&config.gateway_url) {
        Ok(g) => g,
        Err(e) => {
            error!("Failed to create gateway client: {}", e);
            std::process::exit(1);
        }
    };

    match gateway.health().await {
        Ok(health) => info!(status = %health.status, "Gateway reachable"),
        Err(e) => warn!("Gateway health check failed, continuing anyway: {}", e),
    }

    let (jobs_tx, jobs_rx) = mpsc::channel(config.queue_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = DeliveryWorker::new(
        jobs_rx,
        Dispatcher::new(gateway, config.dispatch_config()),
        shutdown_rx,
        config.drain_policy,
    );
    let worker_handle = tokio::spawn(worker.run());

    let mut pipeline = FramePipeline::new(config.pipeline_config(), jobs_tx);
    let status = pipeline.status();
    let mut feed = DetectionFeed::stdin();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
            event = feed.next_event() => match event {
                Ok(Some(event)) => {
                    pipeline.process(&event);
                }
                Ok(None) => {
                    info!("Detection feed ended");
                    break;
                }
                Err(e) => {
                    error!("Detection feed error: {}", e);
                    break;
                }
            },
        }
    }

    // Close the queue and let the worker apply its drain policy.
    drop(pipeline);
    shutdown_tx.send(true).ok();
    if tokio::time::timeout(config.shutdown_timeout, worker_handle)
        .await
        .is_err()
    {
        warn!("Delivery worker did not stop within {:?}", config.shutdown_timeout);
    }

    let snapshot = status.snapshot();
    info!(
        alerts_allocated = snapshot.alert_counter.saturating_sub(config.initial_alert_counter),
        "Shutdown complete"
    );
}
