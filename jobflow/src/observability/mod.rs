//! Observability utilities.

mod tracing;

pub use tracing::{
    init_tracing, LoggingTracingEmitter, NoOpTracingEmitter, RunSpanAttributes, SpanTimer,
    StageSpanAttributes, TracingEmitter,
};
