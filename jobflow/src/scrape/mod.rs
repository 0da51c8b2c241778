//! Page retrieval and structural extraction.
//!
//! This module provides:
//! - Configuration for fetching, pagination and page selectors
//! - Data models for listing summaries and detail enrichment
//! - The `Fetcher` protocol and its HTTP implementation
//! - Listing and detail page extractors

mod config;
mod detail;
mod http;
mod listing;
mod models;
mod protocols;

pub use config::{FetchConfig, HarvestConfig, SelectorConfig};
pub use detail::DetailExtractor;
pub use http::HttpFetcher;
pub use listing::ListingExtractor;
pub use models::{BadgeLabel, DetailEnrichment, JobRecord, ListingSummary};
pub use protocols::{FetchObserver, FetchResult, Fetcher, LoggingFetchObserver, NoOpFetchObserver};
