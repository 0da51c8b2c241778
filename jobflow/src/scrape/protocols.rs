//! Protocol traits for harvesting components.
//!
//! These traits define the seams between the pipeline and the network, so the
//! aggregator can run against a live site or an in-memory fixture.

use async_trait::async_trait;

use crate::errors::FetchError;

/// Result of a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// HTTP status code.
    pub status_code: u16,
    /// Response body as text.
    pub text: String,
    /// Content type from headers.
    pub content_type: Option<String>,
    /// Time taken to fetch in milliseconds.
    pub duration_ms: f64,
}

impl FetchResult {
    /// A 200 HTML response, mainly for fixtures.
    #[must_use]
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            text: text.into(),
            content_type: Some("text/html; charset=utf-8".to_string()),
            duration_ms: 0.0,
        }
    }

    /// Whether the response is HTML.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_ref()
            .map(|ct| ct.contains("text/html") || ct.contains("application/xhtml"))
            .unwrap_or(false)
    }
}

/// Protocol for HTTP fetching.
///
/// Implementations return an error for transport failures and for any
/// non-success status; they never retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a URL and returns the response.
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError>;
}

/// Observability callbacks for harvesting.
pub trait FetchObserver: Send + Sync {
    /// Called when a fetch starts.
    fn on_fetch_start(&self, url: &str);

    /// Called when a fetch completes.
    fn on_fetch_complete(&self, url: &str, duration_ms: f64, status_code: u16);

    /// Called when a fetch fails.
    fn on_fetch_error(&self, url: &str, error: &FetchError);

    /// Called after a listing page has been parsed.
    fn on_page_extracted(&self, page: u32, url: &str, cards: usize);
}

/// No-op implementation of FetchObserver.
#[derive(Debug, Clone, Default)]
pub struct NoOpFetchObserver;

impl FetchObserver for NoOpFetchObserver {
    fn on_fetch_start(&self, _url: &str) {}
    fn on_fetch_complete(&self, _url: &str, _duration_ms: f64, _status_code: u16) {}
    fn on_fetch_error(&self, _url: &str, _error: &FetchError) {}
    fn on_page_extracted(&self, _page: u32, _url: &str, _cards: usize) {}
}

/// Observer that reports through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LoggingFetchObserver;

impl FetchObserver for LoggingFetchObserver {
    fn on_fetch_start(&self, url: &str) {
        tracing::debug!(url, "Fetch started");
    }

    fn on_fetch_complete(&self, url: &str, duration_ms: f64, status_code: u16) {
        tracing::debug!(url, duration_ms, status_code, "Fetch completed");
    }

    fn on_fetch_error(&self, url: &str, error: &FetchError) {
        tracing::error!(url, status = ?error.status, reason = %error.reason, "Fetch failed");
    }

    fn on_page_extracted(&self, page: u32, url: &str, cards: usize) {
        tracing::info!(page, url, cards, "Scraping page {}", page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_result_is_html() {
        let html_result = FetchResult::html("<html></html>");
        assert!(html_result.is_html());

        let json_result = FetchResult {
            content_type: Some("application/json".to_string()),
            ..html_result.clone()
        };
        assert!(!json_result.is_html());

        let untyped = FetchResult {
            content_type: None,
            ..html_result
        };
        assert!(!untyped.is_html());
    }

    #[test]
    fn test_observers_do_not_panic() {
        let err = FetchError::status("https://example.com", 500);
        for observer in [&NoOpFetchObserver as &dyn FetchObserver, &LoggingFetchObserver] {
            observer.on_fetch_start("https://example.com");
            observer.on_fetch_complete("https://example.com", 12.5, 200);
            observer.on_fetch_error("https://example.com", &err);
            observer.on_page_extracted(1, "https://example.com/jobs?page=1", 20);
        }
    }
}
