//! # Jobflow
//!
//! Harvests job listings from a paginated job board, enriches each listing
//! from its detail page and normalizes the free-text fields into typed
//! columns.
//!
//! A run moves through these stages:
//!
//! - **Fetch**: HTTP GET through the [`scrape::Fetcher`] protocol
//! - **Listing / Detail**: CSS-selector extraction of job cards and detail pages
//! - **Aggregate**: pagination with bounded, order-preserving detail fetches
//! - **Normalize**: posted dates, currency, salary bounds, qualifications
//! - **Write**: a delimited file with one row per job
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jobflow::prelude::*;
//!
//! let pipeline = Pipeline::new(HarvestConfig::default())?;
//! let as_of = chrono::Local::now().date_naive();
//! let report = pipeline.run(RunRequest::new(2, as_of, "data/jobs.csv")).await?;
//! println!("{}", report.status_message());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod core;
pub mod errors;
pub mod observability;
pub mod pipeline;
pub mod scrape;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{PipelineStage, RunStatus};
    pub use crate::errors::{
        FetchError, JobflowError, NormalizationError, StructuralParseError, TableError,
    };
    pub use crate::observability::{init_tracing, LoggingTracingEmitter, TracingEmitter};
    pub use crate::pipeline::{
        read_page, CsvWriter, NormalizedJobRecord, Normalizer, PageQuery, Pipeline, ReadEnvelope,
        RunReport, RunRequest, SalaryBound,
    };
    pub use crate::scrape::{
        Fetcher, FetchConfig, HarvestConfig, HttpFetcher, JobRecord, ListingSummary,
        DetailEnrichment, SelectorConfig,
    };
}
