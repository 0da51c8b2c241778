//! The run entry point: harvest, normalize, write.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use super::aggregator::Aggregator;
use super::normalize::Normalizer;
use super::writer::CsvWriter;
use crate::core::{PipelineStage, RunStatus};
use crate::errors::{JobflowError, NormalizationError};
use crate::observability::{
    LoggingTracingEmitter, RunSpanAttributes, SpanTimer, StageSpanAttributes, TracingEmitter,
};
use crate::scrape::{FetchObserver, Fetcher, HarvestConfig, HttpFetcher, LoggingFetchObserver};

/// Status message prefix for a written table.
pub const SAVED_MESSAGE: &str = "Data saved successfully!";

/// Arguments of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Listing pages to harvest.
    pub page_count: u32,
    /// Reference date for relative posted dates.
    pub as_of: NaiveDate,
    /// Output table path.
    pub output: PathBuf,
}

impl RunRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(page_count: u32, as_of: NaiveDate, output: impl Into<PathBuf>) -> Self {
        Self {
            page_count,
            as_of,
            output: output.into(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run ID.
    pub run_id: Uuid,
    /// Final status.
    pub status: RunStatus,
    /// Data rows written.
    pub rows_written: usize,
    /// The written table.
    pub output: PathBuf,
    /// Fields left empty during normalization.
    pub issues: Vec<NormalizationError>,
    /// Wall time per stage in milliseconds.
    pub durations_ms: HashMap<PipelineStage, f64>,
}

impl RunReport {
    /// The completion status line.
    #[must_use]
    pub fn status_message(&self) -> String {
        let mut message = format!(
            "{SAVED_MESSAGE} {} rows written to {}",
            self.rows_written,
            self.output.display()
        );
        if !self.issues.is_empty() {
            message.push_str(&format!(" ({} fields could not be normalized)", self.issues.len()));
        }
        message
    }

    /// Total wall time in milliseconds.
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.durations_ms.values().sum()
    }
}

/// Runs harvests against one site configuration.
pub struct Pipeline {
    config: HarvestConfig,
    fetcher: Arc<dyn Fetcher>,
    observer: Arc<dyn FetchObserver>,
    emitter: Arc<dyn TracingEmitter>,
    writer: CsvWriter,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("writer", &self.writer)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline fetching over HTTP.
    pub fn new(config: HarvestConfig) -> Result<Self, JobflowError> {
        config.validate()?;
        let fetcher = Arc::new(HttpFetcher::new(config.fetch.clone())?);
        Self::with_fetcher(config, fetcher)
    }

    /// Creates a pipeline using `fetcher` for every page.
    pub fn with_fetcher(config: HarvestConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, JobflowError> {
        config.validate()?;
        Ok(Self {
            config,
            fetcher,
            observer: Arc::new(LoggingFetchObserver),
            emitter: Arc::new(LoggingTracingEmitter),
            writer: CsvWriter::new(),
        })
    }

    /// Sets the fetch observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Sets the span emitter.
    #[must_use]
    pub fn with_emitter(mut self, emitter: Arc<dyn TracingEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    /// Sets the table writer.
    #[must_use]
    pub fn with_writer(mut self, writer: CsvWriter) -> Self {
        self.writer = writer;
        self
    }

    /// The site configuration.
    #[must_use]
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Harvests `request.page_count` pages, normalizes the table and writes it
    /// to `request.output`.
    ///
    /// Any fetch or structural failure aborts the run before the output is
    /// touched; the error names the stage and URL.
    pub async fn run(&self, request: RunRequest) -> Result<RunReport, JobflowError> {
        let run_id = Uuid::now_v7();
        let attrs = RunSpanAttributes::new(run_id, request.page_count, request.as_of)
            .with_output(request.output.display().to_string())
            .with_max_concurrent(self.config.max_concurrent)
            .to_attributes();
        let span = tracing::info_span!(
            "jobflow_run",
            run_id = %run_id,
            pages = request.page_count,
            as_of = %request.as_of,
        );

        self.emitter.span_start("run", &attrs);
        let started = Instant::now();
        let result = self.execute(run_id, request).instrument(span).await;

        match &result {
            Ok(report) => {
                self.emitter
                    .span_end("run", started.elapsed().as_secs_f64() * 1000.0, &attrs);
                tracing::info!(
                    run_id = %run_id,
                    status = %report.status,
                    rows = report.rows_written,
                    "{}",
                    report.status_message()
                );
            }
            Err(err) => {
                self.emitter.span_error("run", &err.to_string(), &attrs);
                let stage = err.stage();
                let stage_attrs = StageSpanAttributes::new(stage)
                    .with_error(err.to_string())
                    .to_attributes();
                self.emitter
                    .span_error(&stage.to_string(), &err.to_string(), &stage_attrs);
                tracing::error!(
                    run_id = %run_id,
                    stage = %stage,
                    url = err.url().unwrap_or("-"),
                    error = %err,
                    "Run failed"
                );
            }
        }
        result
    }

    async fn execute(&self, run_id: Uuid, request: RunRequest) -> Result<RunReport, JobflowError> {
        let mut durations_ms = HashMap::new();

        let timer = SpanTimer::start(PipelineStage::Aggregate);
        let mut aggregator = Aggregator::new(self.config.clone(), self.fetcher.clone())?
            .with_observer(self.observer.clone());
        aggregator.harvest(request.page_count).await?;
        let records = aggregator.into_records();
        self.finish_stage(timer, records.len(), &mut durations_ms);

        let timer = SpanTimer::start(PipelineStage::Normalize);
        let table = Normalizer::new(request.as_of)
            .strict(self.config.strict_normalization)
            .normalize_table(records)?;
        self.finish_stage(timer, table.records.len(), &mut durations_ms);

        let timer = SpanTimer::start(PipelineStage::Write);
        let rows_written = self.writer.write(&request.output, &table.records)?;
        self.finish_stage(timer, rows_written, &mut durations_ms);

        let status = if table.issues.is_empty() {
            RunStatus::Succeeded
        } else {
            RunStatus::CompletedWithIssues
        };

        Ok(RunReport {
            run_id,
            status,
            rows_written,
            output: request.output,
            issues: table.issues,
            durations_ms,
        })
    }

    fn finish_stage(&self, timer: SpanTimer, rows: usize, durations_ms: &mut HashMap<PipelineStage, f64>) {
        let stage = timer.stage();
        let duration_ms = timer.finish();
        let attrs = StageSpanAttributes::new(stage)
            .with_rows(rows)
            .with_duration_ms(duration_ms)
            .to_attributes();
        self.emitter.span_end(&stage.to_string(), duration_ms, &attrs);
        durations_ms.insert(stage, duration_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::FetchConfig;
    use crate::testing::StaticFetcher;
    use parking_lot::Mutex;

    #[test]
    fn test_status_message() {
        let mut report = RunReport {
            run_id: Uuid::now_v7(),
            status: RunStatus::Succeeded,
            rows_written: 40,
            output: PathBuf::from("data/jobs.csv"),
            issues: Vec::new(),
            durations_ms: HashMap::from([(PipelineStage::Aggregate, 10.0), (PipelineStage::Write, 2.5)]),
        };
        assert_eq!(
            report.status_message(),
            "Data saved successfully! 40 rows written to data/jobs.csv"
        );
        assert_eq!(report.total_ms(), 12.5);

        report.issues.push(NormalizationError::new("min_salary", "NGN", "no amount line"));
        assert!(report.status_message().ends_with("(1 fields could not be normalized)"));
    }

    #[test]
    fn test_pipeline_rejects_invalid_config() {
        let err = Pipeline::new(HarvestConfig::new().with_max_concurrent(0)).unwrap_err();
        assert!(matches!(err, JobflowError::Config(_)));
    }

    #[test]
    fn test_pipeline_rejects_unrepresentable_timeout() {
        for seconds in [-1.0, 1e30] {
            let config = HarvestConfig::new().with_fetch(FetchConfig::new().with_timeout(seconds));
            let err = Pipeline::new(config).unwrap_err();
            assert!(matches!(err, JobflowError::Config(_)), "timeout {seconds}");
        }
    }

    #[derive(Default)]
    struct RecordingEmitter {
        errors: Mutex<Vec<(String, HashMap<String, String>)>>,
    }

    impl TracingEmitter for RecordingEmitter {
        fn span_start(&self, _name: &str, _attributes: &HashMap<String, String>) {}
        fn span_end(&self, _name: &str, _duration_ms: f64, _attributes: &HashMap<String, String>) {}
        fn span_error(&self, name: &str, _error: &str, attributes: &HashMap<String, String>) {
            self.errors.lock().push((name.to_string(), attributes.clone()));
        }
    }

    #[tokio::test]
    async fn test_failed_run_reports_failing_stage() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = Arc::new(RecordingEmitter::default());
        let fetcher = StaticFetcher::new().with_failure("https://jobs.test/jobs?page=1", 503);
        let config = HarvestConfig::new().with_base_url("https://jobs.test");
        let pipeline = Pipeline::with_fetcher(config, Arc::new(fetcher))
            .unwrap()
            .with_emitter(emitter.clone());

        let as_of = NaiveDate::from_ymd_opt(2024, 7, 25).unwrap();
        pipeline
            .run(RunRequest::new(1, as_of, dir.path().join("jobs.csv")))
            .await
            .unwrap_err();

        let errors = emitter.errors.lock();
        let names: Vec<_> = errors.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["run", "fetch"]);
        assert_eq!(errors[1].1["stage.name"], "fetch");
        assert!(errors[1].1["stage.error"].contains("HTTP 503"));
    }
}
