//! In-memory fetchers for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::FetchError;
use crate::scrape::{FetchResult, Fetcher};

/// A fetcher that serves fixed pages by URL and records every request.
///
/// Unknown URLs answer 404. Per-URL delays let tests make later requests
/// finish before earlier ones.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    failures: HashMap<String, u16>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StaticFetcher {
    /// Creates an empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` for `url`.
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Answers `url` with a non-success status.
    #[must_use]
    pub fn with_failure(mut self, url: impl Into<String>, status: u16) -> Self {
        self.failures.insert(url.into(), status);
        self
    }

    /// Delays the response for `url`.
    #[must_use]
    pub fn with_delay(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    /// URLs requested so far, in request order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of requests made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Highest number of requests that were in flight at once.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        self.calls.lock().push(url.to_string());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        let result = if let Some(status) = self.failures.get(url) {
            Err(FetchError::status(url, *status))
        } else if let Some(html) = self.pages.get(url) {
            Ok(FetchResult::html(html.clone()))
        } else {
            Err(FetchError::status(url, 404))
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_fetcher_serves_and_records() {
        let fetcher = StaticFetcher::new()
            .with_page("https://example.com/a", "<p>a</p>")
            .with_failure("https://example.com/b", 500);

        let ok = fetcher.fetch("https://example.com/a").await.unwrap();
        assert_eq!(ok.text, "<p>a</p>");

        let failed = fetcher.fetch("https://example.com/b").await.unwrap_err();
        assert_eq!(failed.status, Some(500));

        let missing = fetcher.fetch("https://example.com/c").await.unwrap_err();
        assert_eq!(missing.status, Some(404));

        assert_eq!(fetcher.call_count(), 3);
        assert_eq!(fetcher.calls()[0], "https://example.com/a");
        assert_eq!(fetcher.peak_in_flight(), 1);
    }
}
