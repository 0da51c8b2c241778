//! `reqwest`-backed [`Fetcher`].

use async_trait::async_trait;
use std::time::Instant;

use super::config::FetchConfig;
use super::protocols::{FetchResult, Fetcher};
use crate::errors::{FetchError, JobflowError};

/// Fetches pages over HTTP with a shared connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Builds a client from the fetch configuration.
    pub fn new(config: FetchConfig) -> Result<Self, JobflowError> {
        let timeout = config.timeout()?;
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        for (key, value) in &config.headers {
            let name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| JobflowError::config(format!("invalid header name {key:?}: {e}")))?;
            let value = reqwest::header::HeaderValue::from_str(value)
                .map_err(|e| JobflowError::config(format!("invalid value for header {key:?}: {e}")))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| JobflowError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let started = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(url, status.as_u16()));
        }

        let max = self.config.max_response_size;
        if response.content_length().is_some_and(|len| len > max as u64) {
            return Err(FetchError::transport(url, format!("response exceeds {max} bytes")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::transport(url, format!("failed to read body: {e}")))?;
        if text.len() > max {
            return Err(FetchError::transport(url, format!("response exceeds {max} bytes")));
        }

        Ok(FetchResult {
            status_code: status.as_u16(),
            text,
            content_type,
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .and(header("x-run", "test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>ok</body></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(FetchConfig::new().with_header("x-run", "test")).unwrap();
        let result = fetcher.fetch(&format!("{}/jobs", server.uri())).await.unwrap();

        assert_eq!(result.status_code, 200);
        assert!(result.is_html());
        assert!(result.text.contains("ok"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
        let url = format!("{}/missing", server.uri());
        let err = fetcher.fetch(&url).await.unwrap_err();

        assert_eq!(err.status, Some(404));
        assert_eq!(err.url, url);
    }

    #[tokio::test]
    async fn test_fetch_oversized_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&server)
            .await;

        let mut config = FetchConfig::default();
        config.max_response_size = 16;
        let fetcher = HttpFetcher::new(config).unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();

        assert_eq!(err.status, None);
        assert!(err.reason.contains("exceeds"));
    }

    #[tokio::test]
    async fn test_fetch_transport_error() {
        let fetcher = HttpFetcher::new(FetchConfig::new().with_timeout(1.0)).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:1/jobs").await.unwrap_err();
        assert_eq!(err.status, None);
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let err = HttpFetcher::new(FetchConfig::new().with_header("bad header", "v")).unwrap_err();
        assert!(matches!(err, JobflowError::Config(_)));
    }

    #[test]
    fn test_unrepresentable_timeout_is_config_error() {
        for seconds in [-1.0, 1e30] {
            let err = HttpFetcher::new(FetchConfig::new().with_timeout(seconds)).unwrap_err();
            assert!(matches!(err, JobflowError::Config(_)));
        }
    }
}
