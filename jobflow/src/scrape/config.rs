//! Configuration types for harvesting and fetching.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::errors::JobflowError;

/// Configuration for HTTP fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum response size in bytes.
    #[serde(default = "default_max_size")]
    pub max_response_size: usize,
    /// Additional headers to include.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_timeout() -> f64 {
    30.0
}

fn default_user_agent() -> String {
    "jobflow/0.1".to_string()
}

fn default_max_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            max_response_size: default_max_size(),
            headers: HashMap::new(),
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Gets timeout as Duration.
    ///
    /// Fails for a timeout that is not positive or does not fit a `Duration`.
    pub fn timeout(&self) -> Result<Duration, JobflowError> {
        let seconds = self.timeout_seconds;
        if seconds <= 0.0 {
            return Err(JobflowError::config("fetch.timeout_seconds must be positive"));
        }
        Duration::try_from_secs_f64(seconds).map_err(|e| {
            JobflowError::config(format!("invalid fetch.timeout_seconds {seconds}: {e}"))
        })
    }
}

/// CSS selectors locating each structural role on listing and detail pages.
///
/// The defaults match the class names the job board renders today. Card-level
/// selectors are evaluated relative to the matched card element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// One job card on a listing page.
    #[serde(default = "default_card")]
    pub card: String,
    /// The card's detail link; its text is the listing name.
    #[serde(default = "default_card_link")]
    pub card_link: String,
    /// The hiring firm paragraph.
    #[serde(default = "default_firm")]
    pub firm: String,
    /// The link inside the firm paragraph, when the firm has a profile page.
    #[serde(default = "default_firm_link")]
    pub firm_link: String,
    /// The job function tag.
    #[serde(default = "default_job_function")]
    pub job_function: String,
    /// The job title.
    #[serde(default = "default_title")]
    pub title: String,
    /// The relative posted-date tag.
    #[serde(default = "default_date_posted")]
    pub date_posted: String,
    /// Location / job type / industry badges on a detail page.
    #[serde(default = "default_badge")]
    pub badge: String,
    /// The salary badge on a detail page.
    #[serde(default = "default_salary")]
    pub salary: String,
    /// The bullet list holding qualification details.
    #[serde(default = "default_details_list")]
    pub details_list: String,
    /// An item inside the details list.
    #[serde(default = "default_details_item")]
    pub details_item: String,
    /// Auxiliary info blocks.
    #[serde(default = "default_info_block")]
    pub info_block: String,
}

fn default_card() -> String {
    "div.flex-wrap.col-span-1.rounded-lg.border-gray-300".to_string()
}

fn default_card_link() -> String {
    "a[href]".to_string()
}

fn default_firm() -> String {
    "p.text-sm.text-link-500".to_string()
}

fn default_firm_link() -> String {
    "a[href]".to_string()
}

fn default_job_function() -> String {
    "p.text-sm.text-gray-500.inline-block".to_string()
}

fn default_title() -> String {
    "p.text-lg.font-medium.break-words.text-link-500".to_string()
}

fn default_date_posted() -> String {
    "p.ml-auto.text-sm.text-gray-700".to_string()
}

fn default_badge() -> String {
    "a.text-sm.font-normal.px-3.rounded.bg-brand-secondary-50".to_string()
}

fn default_salary() -> String {
    "span.text-sm.font-normal.px-3.rounded.bg-brand-secondary-50".to_string()
}

fn default_details_list() -> String {
    "ul.pl-5.text-sm.list-disc.text-gray-500".to_string()
}

fn default_details_item() -> String {
    "li".to_string()
}

fn default_info_block() -> String {
    "ul.list-disc.list-inside".to_string()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: default_card(),
            card_link: default_card_link(),
            firm: default_firm(),
            firm_link: default_firm_link(),
            job_function: default_job_function(),
            title: default_title(),
            date_posted: default_date_posted(),
            badge: default_badge(),
            salary: default_salary(),
            details_list: default_details_list(),
            details_item: default_details_item(),
            info_block: default_info_block(),
        }
    }
}

/// Top-level configuration for a harvesting run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Site root; relative job and firm links are resolved against it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the paginated listing.
    #[serde(default = "default_listing_path")]
    pub listing_path: String,
    /// Query parameter carrying the page number.
    #[serde(default = "default_page_param")]
    pub page_param: String,
    /// Number of listing pages to harvest.
    #[serde(default = "default_page_count")]
    pub page_count: u32,
    /// Maximum concurrent detail-page fetches.
    #[serde(default = "default_concurrent")]
    pub max_concurrent: usize,
    /// Abort the run on the first field that cannot be normalized.
    #[serde(default)]
    pub strict_normalization: bool,
    /// Fetch configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Page structure selectors.
    #[serde(default)]
    pub selectors: SelectorConfig,
}

fn default_base_url() -> String {
    "https://www.jobberman.com".to_string()
}

fn default_listing_path() -> String {
    "/jobs".to_string()
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_page_count() -> u32 {
    2
}

fn default_concurrent() -> usize {
    5
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            listing_path: default_listing_path(),
            page_param: default_page_param(),
            page_count: default_page_count(),
            max_concurrent: default_concurrent(),
            strict_normalization: false,
            fetch: FetchConfig::default(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl HarvestConfig {
    /// Creates a new harvest configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file; missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, JobflowError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JobflowError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the site base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the number of listing pages.
    #[must_use]
    pub fn with_page_count(mut self, pages: u32) -> Self {
        self.page_count = pages;
        self
    }

    /// Sets the maximum concurrent detail fetches.
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }

    /// Enables strict normalization.
    #[must_use]
    pub fn with_strict_normalization(mut self, strict: bool) -> Self {
        self.strict_normalization = strict;
        self
    }

    /// Replaces the fetch configuration.
    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), JobflowError> {
        if self.max_concurrent == 0 {
            return Err(JobflowError::config("max_concurrent must be at least 1"));
        }
        self.fetch.timeout()?;
        url::Url::parse(&self.base_url)
            .map_err(|e| JobflowError::config(format!("invalid base_url {:?}: {e}", self.base_url)))?;
        Ok(())
    }

    /// The URL of listing page `page` (1-based).
    #[must_use]
    pub fn listing_url(&self, page: u32) -> String {
        format!(
            "{}{}?{}={}",
            self.base_url.trim_end_matches('/'),
            self.listing_path,
            self.page_param,
            page
        )
    }
}
