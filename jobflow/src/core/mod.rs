//! Core types shared across the pipeline.

mod status;

pub use status::{PipelineStage, RunStatus};
