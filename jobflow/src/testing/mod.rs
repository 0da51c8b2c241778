//! Testing utilities for jobflow pipelines.
//!
//! This module provides:
//! - An in-memory `Fetcher` serving fixture pages
//! - Listing and detail page HTML builders

mod fixtures;
mod mocks;

pub use fixtures::{listing_page_html, DetailPageFixture, ListingCardFixture};
pub use mocks::StaticFetcher;
