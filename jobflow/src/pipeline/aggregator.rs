//! Pagination and detail enrichment.

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use crate::errors::{FetchError, JobflowError, StructuralParseError};
use crate::scrape::{
    DetailExtractor, FetchObserver, FetchResult, Fetcher, HarvestConfig, JobRecord,
    ListingExtractor, ListingSummary, NoOpFetchObserver,
};

/// Progress of a harvest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarvestProgress {
    /// Listing pages fully processed.
    pub pages_completed: u32,
    /// Detail pages fetched and extracted.
    pub details_completed: usize,
    /// Listing page currently being processed.
    pub current_page: Option<u32>,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: f64,
}

impl HarvestProgress {
    /// Records a finished listing page and its details.
    pub fn record_page(&mut self, page: u32, details: usize, elapsed_ms: f64) {
        self.pages_completed += 1;
        self.details_completed += details;
        self.current_page = Some(page);
        self.elapsed_ms = elapsed_ms;
    }
}

/// Fetches `url`, reporting to `observer`.
async fn observed_fetch(
    fetcher: &dyn Fetcher,
    observer: &dyn FetchObserver,
    url: &str,
) -> Result<FetchResult, FetchError> {
    observer.on_fetch_start(url);
    let start = Instant::now();
    match fetcher.fetch(url).await {
        Ok(result) => {
            let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
            observer.on_fetch_complete(url, duration_ms, result.status_code);
            if !result.is_html() {
                tracing::warn!(url, content_type = ?result.content_type, "Response is not HTML");
            }
            Ok(result)
        }
        Err(err) => {
            observer.on_fetch_error(url, &err);
            Err(err)
        }
    }
}

/// Builds the job table for one run: listing pages in order, each card
/// enriched from its detail page.
///
/// Detail fetches within a page run up to `max_concurrent` at a time and are
/// joined back in card order. The first failure aborts the harvest.
pub struct Aggregator {
    config: HarvestConfig,
    base_url: Url,
    fetcher: Arc<dyn Fetcher>,
    observer: Arc<dyn FetchObserver>,
    listing: ListingExtractor,
    detail: DetailExtractor,
    records: Vec<JobRecord>,
    progress: HarvestProgress,
    started: Instant,
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("base_url", &self.base_url.as_str())
            .field("max_concurrent", &self.config.max_concurrent)
            .field("records", &self.records.len())
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

impl Aggregator {
    /// Creates an aggregator with an empty table.
    pub fn new(config: HarvestConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, JobflowError> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| JobflowError::config(format!("invalid base_url {:?}: {e}", config.base_url)))?;

        Ok(Self {
            listing: ListingExtractor::new(&config.base_url, &config.selectors)?,
            detail: DetailExtractor::new(&config.selectors)?,
            base_url,
            fetcher,
            observer: Arc::new(NoOpFetchObserver),
            records: Vec::new(),
            progress: HarvestProgress::default(),
            started: Instant::now(),
            config,
        })
    }

    /// Sets the fetch observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Harvests listing pages `1..=page_count`.
    pub async fn harvest(&mut self, page_count: u32) -> Result<(), JobflowError> {
        for page in 1..=page_count {
            self.harvest_page(page).await?;
        }
        Ok(())
    }

    /// Harvests one listing page and appends its records; returns how many.
    pub async fn harvest_page(&mut self, page: u32) -> Result<usize, JobflowError> {
        let page_url = self.config.listing_url(page);
        let fetcher = self.fetcher.as_ref();
        let observer = self.observer.as_ref();

        let response = observed_fetch(fetcher, observer, &page_url).await?;
        let summaries = self.listing.extract(&response.text, &page_url)?;
        observer.on_page_extracted(page, &page_url, summaries.len());

        let base_url = &self.base_url;
        let detail = &self.detail;
        let page_url = page_url.as_str();
        let records: Vec<JobRecord> = stream::iter(summaries.into_iter().enumerate().map(
            |(index, summary)| async move {
                let url = detail_url(base_url, &summary, index, page_url)?;
                let response = observed_fetch(fetcher, observer, &url).await?;
                let enrichment = detail.extract(&response.text, &url)?;
                tracing::debug!(page, index, url = %url, "Detail extracted");
                Ok::<_, JobflowError>(JobRecord::new(summary, enrichment))
            },
        ))
        .buffered(self.config.max_concurrent)
        .try_collect()
        .await?;

        let added = records.len();
        self.records.extend(records);
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.progress.record_page(page, added, elapsed_ms);
        Ok(added)
    }

    /// Records accumulated so far, in table order.
    #[must_use]
    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    /// Progress so far.
    #[must_use]
    pub fn progress(&self) -> &HarvestProgress {
        &self.progress
    }

    /// Consumes the aggregator, returning the table.
    #[must_use]
    pub fn into_records(self) -> Vec<JobRecord> {
        self.records
    }
}

/// Absolute URL of a card's detail page.
fn detail_url(
    base_url: &Url,
    summary: &ListingSummary,
    index: usize,
    page_url: &str,
) -> Result<String, StructuralParseError> {
    base_url
        .join(&summary.job_url)
        .map(String::from)
        .map_err(|_| StructuralParseError::listing(page_url, format!("card {index}: job_url")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PipelineStage;
    use crate::testing::{listing_page_html, DetailPageFixture, ListingCardFixture, StaticFetcher};
    use std::time::Duration;

    const BASE: &str = "https://jobs.test";

    fn config() -> HarvestConfig {
        HarvestConfig::new().with_base_url(BASE)
    }

    fn listing(page: u32) -> String {
        format!("{BASE}/jobs?page={page}")
    }

    fn job(slug: &str) -> String {
        format!("{BASE}/listings/{slug}")
    }

    /// Two pages of `per_page` cards each, with every detail page served.
    fn two_page_site(per_page: usize) -> StaticFetcher {
        let mut fetcher = StaticFetcher::new();
        for page in 1..=2u32 {
            let cards: Vec<_> = (0..per_page)
                .map(|i| ListingCardFixture::new(job(&format!("p{page}-{i}")), format!("Job {page}.{i}")))
                .collect();
            fetcher = fetcher.with_page(listing(page), listing_page_html(&cards));
            for i in 0..per_page {
                fetcher = fetcher.with_page(job(&format!("p{page}-{i}")), DetailPageFixture::new().to_html());
            }
        }
        fetcher
    }

    #[tokio::test]
    async fn test_table_order_is_page_then_card() {
        let fetcher = Arc::new(
            two_page_site(3)
                .with_delay(job("p1-0"), Duration::from_millis(60))
                .with_delay(job("p2-0"), Duration::from_millis(40)),
        );
        let mut aggregator = Aggregator::new(config().with_max_concurrent(3), fetcher.clone()).unwrap();

        aggregator.harvest(2).await.unwrap();

        let titles: Vec<_> = aggregator.records().iter().map(|r| r.summary.title.as_str()).collect();
        assert_eq!(titles, ["Job 1.0", "Job 1.1", "Job 1.2", "Job 2.0", "Job 2.1", "Job 2.2"]);
        assert!(fetcher.peak_in_flight() > 1);
        assert!(fetcher.peak_in_flight() <= 3);
        assert_eq!(aggregator.progress().pages_completed, 2);
        assert_eq!(aggregator.progress().details_completed, 6);
    }

    #[tokio::test]
    async fn test_concurrency_of_one_is_sequential() {
        let fetcher = Arc::new(two_page_site(3).with_delay(job("p1-0"), Duration::from_millis(20)));
        let mut aggregator = Aggregator::new(config().with_max_concurrent(1), fetcher.clone()).unwrap();

        aggregator.harvest(2).await.unwrap();

        assert_eq!(fetcher.peak_in_flight(), 1);
        assert_eq!(
            fetcher.calls()[..3],
            [listing(1), job("p1-0"), job("p1-1")]
        );
    }

    #[tokio::test]
    async fn test_listing_pages_fetched_in_order() {
        let fetcher = Arc::new(two_page_site(1));
        let mut aggregator = Aggregator::new(config(), fetcher.clone()).unwrap();

        aggregator.harvest(2).await.unwrap();

        assert_eq!(fetcher.calls(), [listing(1), job("p1-0"), listing(2), job("p2-0")]);
    }

    #[tokio::test]
    async fn test_relative_job_url_is_resolved_for_fetch_only() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_page(listing(1), listing_page_html(&[ListingCardFixture::new("/listings/rel", "Clerk")]))
                .with_page(job("rel"), DetailPageFixture::new().to_html()),
        );
        let mut aggregator = Aggregator::new(config(), fetcher.clone()).unwrap();

        aggregator.harvest(1).await.unwrap();

        assert_eq!(fetcher.calls()[1], job("rel"));
        assert_eq!(aggregator.records()[0].job_url(), "/listings/rel");
        assert_eq!(aggregator.records()[0].detail.location.as_deref(), Some("Lagos"));
    }

    #[tokio::test]
    async fn test_duplicate_job_urls_are_kept() {
        let card = ListingCardFixture::new(job("same"), "Driver");
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_page(listing(1), listing_page_html(&[card.clone()]))
                .with_page(listing(2), listing_page_html(&[card]))
                .with_page(job("same"), DetailPageFixture::new().to_html()),
        );
        let mut aggregator = Aggregator::new(config(), fetcher).unwrap();

        aggregator.harvest(2).await.unwrap();

        assert_eq!(aggregator.into_records().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_listing_page() {
        let fetcher = Arc::new(StaticFetcher::new().with_page(listing(1), listing_page_html(&[])));
        let mut aggregator = Aggregator::new(config(), fetcher).unwrap();

        assert_eq!(aggregator.harvest_page(1).await.unwrap(), 0);
        assert!(aggregator.records().is_empty());
    }

    #[tokio::test]
    async fn test_failed_detail_fetch_aborts_with_url() {
        let fetcher = Arc::new(two_page_site(2).with_failure(job("p1-1"), 503));
        let mut aggregator = Aggregator::new(config(), fetcher).unwrap();

        let err = aggregator.harvest(2).await.unwrap_err();

        assert_eq!(err.stage(), PipelineStage::Fetch);
        assert_eq!(err.url(), Some(job("p1-1").as_str()));
        assert!(aggregator.records().is_empty());
    }

    #[tokio::test]
    async fn test_failed_listing_fetch_keeps_earlier_pages() {
        let fetcher = Arc::new(two_page_site(1).with_failure(listing(2), 500));
        let mut aggregator = Aggregator::new(config(), fetcher).unwrap();

        let err = aggregator.harvest(2).await.unwrap_err();

        assert_eq!(err.url(), Some(listing(2).as_str()));
        assert_eq!(aggregator.records().len(), 1);
    }

    #[tokio::test]
    async fn test_structural_errors_carry_stage() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_page(
                    listing(1),
                    listing_page_html(&[ListingCardFixture::new(job("a"), "A").without_title()]),
                ),
        );
        let mut aggregator = Aggregator::new(config(), fetcher).unwrap();
        let err = aggregator.harvest(1).await.unwrap_err();
        assert_eq!(err.stage(), PipelineStage::Listing);

        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_page(listing(1), listing_page_html(&[ListingCardFixture::new(job("a"), "A")]))
                .with_page(job("a"), DetailPageFixture::new().without_salary().to_html()),
        );
        let mut aggregator = Aggregator::new(config(), fetcher).unwrap();
        let err = aggregator.harvest(1).await.unwrap_err();
        assert_eq!(err.stage(), PipelineStage::Detail);
        assert_eq!(err.url(), Some(job("a").as_str()));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let fetcher = Arc::new(StaticFetcher::new());
        assert!(Aggregator::new(config().with_max_concurrent(0), fetcher).is_err());
    }
}
