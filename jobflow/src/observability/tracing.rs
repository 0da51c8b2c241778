//! Structured tracing for harvest runs.
//!
//! Runs and stages are described by attribute structs that flatten into
//! dotted key/value maps, so the same fields appear whether events go to the
//! console, to JSON logs or to a collector.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::core::PipelineStage;
use crate::errors::JobflowError;

/// Installs the global subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. With `json` set,
/// events are written as one JSON object per line.
pub fn init_tracing(json: bool) -> Result<(), JobflowError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_target(true)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_target(false)))
        .try_init()
        .map_err(|e| JobflowError::config(format!("tracing already initialized: {e}")))
}

/// Span attributes for a harvest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSpanAttributes {
    /// Run ID.
    pub run_id: Uuid,
    /// Listing pages requested.
    pub page_count: u32,
    /// Reference date for relative posted dates.
    pub as_of: NaiveDate,
    /// Output table path.
    pub output: Option<String>,
    /// Detail fetch concurrency.
    pub max_concurrent: Option<usize>,
}

impl RunSpanAttributes {
    /// Creates run attributes.
    #[must_use]
    pub fn new(run_id: Uuid, page_count: u32, as_of: NaiveDate) -> Self {
        Self {
            run_id,
            page_count,
            as_of,
            output: None,
            max_concurrent: None,
        }
    }

    /// Sets the output path.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Sets the detail fetch concurrency.
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = Some(max);
        self
    }

    /// Flattens into dotted attribute keys.
    #[must_use]
    pub fn to_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();

        attrs.insert("run.id".to_string(), self.run_id.to_string());
        attrs.insert("run.page_count".to_string(), self.page_count.to_string());
        attrs.insert("run.as_of".to_string(), self.as_of.to_string());
        if let Some(ref v) = self.output {
            attrs.insert("run.output".to_string(), v.clone());
        }
        if let Some(v) = self.max_concurrent {
            attrs.insert("run.max_concurrent".to_string(), v.to_string());
        }

        attrs
    }
}

/// Span attributes for one pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSpanAttributes {
    /// The stage.
    pub stage: PipelineStage,
    /// Rows produced by the stage.
    pub rows: Option<usize>,
    /// Duration in milliseconds.
    pub duration_ms: Option<f64>,
    /// Error message if failed.
    pub error: Option<String>,
}

impl StageSpanAttributes {
    /// Creates stage attributes.
    #[must_use]
    pub fn new(stage: PipelineStage) -> Self {
        Self {
            stage,
            rows: None,
            duration_ms: None,
            error: None,
        }
    }

    /// Sets the row count.
    #[must_use]
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Sets the error.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Flattens into dotted attribute keys.
    #[must_use]
    pub fn to_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();

        attrs.insert("stage.name".to_string(), self.stage.to_string());
        if let Some(v) = self.rows {
            attrs.insert("stage.rows".to_string(), v.to_string());
        }
        if let Some(v) = self.duration_ms {
            attrs.insert("stage.duration_ms".to_string(), v.to_string());
        }
        if let Some(ref v) = self.error {
            attrs.insert("stage.error".to_string(), v.clone());
        }

        attrs
    }
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    stage: PipelineStage,
}

impl SpanTimer {
    /// Starts timing `stage`.
    #[must_use]
    pub fn start(stage: PipelineStage) -> Self {
        Self {
            start: Instant::now(),
            stage,
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// The stage being timed.
    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Finishes the span and returns the duration.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}

/// Receives run and stage span events.
pub trait TracingEmitter: Send + Sync {
    /// Emits a span start event.
    fn span_start(&self, name: &str, attributes: &HashMap<String, String>);

    /// Emits a span end event.
    fn span_end(&self, name: &str, duration_ms: f64, attributes: &HashMap<String, String>);

    /// Emits an error event.
    fn span_error(&self, name: &str, error: &str, attributes: &HashMap<String, String>);
}

/// No-op tracing emitter.
#[derive(Debug, Clone, Default)]
pub struct NoOpTracingEmitter;

impl TracingEmitter for NoOpTracingEmitter {
    fn span_start(&self, _name: &str, _attributes: &HashMap<String, String>) {}
    fn span_end(&self, _name: &str, _duration_ms: f64, _attributes: &HashMap<String, String>) {}
    fn span_error(&self, _name: &str, _error: &str, _attributes: &HashMap<String, String>) {}
}

/// Logging-based tracing emitter.
#[derive(Debug, Clone, Default)]
pub struct LoggingTracingEmitter;

impl TracingEmitter for LoggingTracingEmitter {
    fn span_start(&self, name: &str, attributes: &HashMap<String, String>) {
        tracing::debug!(span_name = name, ?attributes, "Span started");
    }

    fn span_end(&self, name: &str, duration_ms: f64, attributes: &HashMap<String, String>) {
        tracing::info!(span_name = name, duration_ms, ?attributes, "Span ended");
    }

    fn span_error(&self, name: &str, error: &str, attributes: &HashMap<String, String>) {
        tracing::error!(span_name = name, error, ?attributes, "Span error");
    }
}
