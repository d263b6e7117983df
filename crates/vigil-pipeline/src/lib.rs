//! Frame-processing core for the vigil alert pipeline.
//!
//! This crate owns the single-writer hot path: detection normalization,
//! temporal debouncing, alert allocation, optional evidence capture and the
//! status snapshot. Everything here is driven from one frame-processing
//! task; delivery happens elsewhere, behind a queue.

pub mod alert;
pub mod debounce;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod recorder;
pub mod status;

pub use alert::AlertAllocator;
pub use debounce::Debouncer;
pub use error::{PipelineError, PipelineResult};
pub use normalize::active_labels;
pub use pipeline::{FramePipeline, PipelineConfig};
pub use recorder::EvidenceRecorder;
pub use status::{PipelineStatus, StatusHandle};
