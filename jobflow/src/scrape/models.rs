//! Data models for harvested job listings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One job card from a listing page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingSummary {
    /// Text of the card's detail link.
    pub name: String,
    /// Detail page link as found in the markup (absolute or relative).
    pub job_url: String,
    /// Hiring firm name.
    pub hiring_firm: String,
    /// Absolute firm profile URL; `None` when the firm name is not a link.
    pub hiring_firm_url: Option<String>,
    /// Job function tag.
    pub job_function: String,
    /// Job title.
    pub title: String,
    /// Posted date as displayed, e.g. "3 days" or "Today".
    pub date_posted_raw: String,
}

/// The three badge slots on a detail page, in the order the site renders them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BadgeLabel {
    /// Job location.
    Location,
    /// Full-time, contract, ...
    JobType,
    /// Employer industry.
    Industry,
}

impl BadgeLabel {
    /// Slots in positional order.
    pub const ORDER: [Self; 3] = [Self::Location, Self::JobType, Self::Industry];

    /// Matches a label as printed on the page, ignoring case and surrounding space.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ORDER
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(label))
    }

    /// The label text.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "Location",
            Self::JobType => "Job type",
            Self::Industry => "Industry",
        }
    }
}

impl fmt::Display for BadgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields only available on a job's detail page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetailEnrichment {
    /// Location badge.
    pub location: Option<String>,
    /// Job type badge.
    pub job_type: Option<String>,
    /// Industry badge.
    pub industry: Option<String>,
    /// Salary badge text, e.g. "NGN\n\n100,000 - 150,000".
    pub salary_raw: String,
    /// Qualification bullet points, in page order.
    #[serde(default)]
    pub details_raw: Vec<String>,
    /// Auxiliary list blocks, in page order.
    #[serde(default)]
    pub info: Vec<String>,
}

impl DetailEnrichment {
    /// Stores a badge value in its slot.
    pub fn set_badge(&mut self, label: BadgeLabel, value: impl Into<String>) {
        let slot = match label {
            BadgeLabel::Location => &mut self.location,
            BadgeLabel::JobType => &mut self.job_type,
            BadgeLabel::Industry => &mut self.industry,
        };
        *slot = Some(value.into());
    }

    /// Reads a badge slot.
    #[must_use]
    pub fn badge(&self, label: BadgeLabel) -> Option<&str> {
        match label {
            BadgeLabel::Location => self.location.as_deref(),
            BadgeLabel::JobType => self.job_type.as_deref(),
            BadgeLabel::Industry => self.industry.as_deref(),
        }
    }

    /// The details list joined the way it is stored in the table.
    #[must_use]
    pub fn details_joined(&self) -> String {
        self.details_raw.join(";")
    }
}

/// A listing summary merged with its detail-page enrichment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobRecord {
    /// Listing-page fields.
    #[serde(flatten)]
    pub summary: ListingSummary,
    /// Detail-page fields.
    #[serde(flatten)]
    pub detail: DetailEnrichment,
}

impl JobRecord {
    /// Merges a summary with its enrichment.
    #[must_use]
    pub fn new(summary: ListingSummary, detail: DetailEnrichment) -> Self {
        Self { summary, detail }
    }

    /// The join key.
    #[must_use]
    pub fn job_url(&self) -> &str {
        &self.summary.job_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_label_parse() {
        assert_eq!(BadgeLabel::parse("location"), Some(BadgeLabel::Location));
        assert_eq!(BadgeLabel::parse(" Job Type "), Some(BadgeLabel::JobType));
        assert_eq!(BadgeLabel::parse("INDUSTRY"), Some(BadgeLabel::Industry));
        assert_eq!(BadgeLabel::parse("Salary"), None);
    }

    #[test]
    fn test_set_and_read_badge() {
        let mut detail = DetailEnrichment::default();
        detail.set_badge(BadgeLabel::Industry, "Banking");

        assert_eq!(detail.badge(BadgeLabel::Industry), Some("Banking"));
        assert_eq!(detail.badge(BadgeLabel::Location), None);
    }

    #[test]
    fn test_details_joined() {
        let detail = DetailEnrichment {
            details_raw: vec!["Minimum Qualification: BSc".into(), "Experience Level: Mid".into()],
            ..Default::default()
        };
        assert_eq!(detail.details_joined(), "Minimum Qualification: BSc;Experience Level: Mid");
    }

    #[test]
    fn test_job_record_serializes_flat() {
        let record = JobRecord::new(
            ListingSummary {
                job_url: "https://example.com/a".into(),
                ..Default::default()
            },
            DetailEnrichment {
                salary_raw: "Confidential".into(),
                ..Default::default()
            },
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["job_url"], "https://example.com/a");
        assert_eq!(value["salary_raw"], "Confidential");
        assert_eq!(record.job_url(), "https://example.com/a");
    }
}
