//! Runner for the vigil detection alert pipeline.
//!
//! Wires the frame-processing pipeline to the delivery worker: a detection
//! feed drives the pipeline, which pushes delivery jobs into a bounded
//! queue drained by the worker task.

pub mod config;
pub mod delivery;
pub mod error;
pub mod feed;

pub use config::{AppConfig, DrainPolicy};
pub use delivery::DeliveryWorker;
pub use error::{WorkerError, WorkerResult};
pub use feed::DetectionFeed;
