//! Enrichment extraction from job detail pages.

use scraper::{ElementRef, Html, Selector};

use super::config::SelectorConfig;
use super::listing::{compile, element_text};
use super::models::{BadgeLabel, DetailEnrichment};
use crate::errors::{JobflowError, StructuralParseError};

/// Attributes that may carry a badge's label.
const LABEL_ATTRIBUTES: [&str; 3] = ["data-label", "aria-label", "title"];

/// Extracts a [`DetailEnrichment`] from a job's detail page.
#[derive(Debug, Clone)]
pub struct DetailExtractor {
    badge: Selector,
    salary: Selector,
    details_list: Selector,
    details_item: Selector,
    info_block: Selector,
}

impl DetailExtractor {
    /// Compiles the detail-page selectors.
    pub fn new(selectors: &SelectorConfig) -> Result<Self, JobflowError> {
        Ok(Self {
            badge: compile("badge", &selectors.badge)?,
            salary: compile("salary", &selectors.salary)?,
            details_list: compile("details_list", &selectors.details_list)?,
            details_item: compile("details_item", &selectors.details_item)?,
            info_block: compile("info_block", &selectors.info_block)?,
        })
    }

    /// Extracts the enrichment fields of one job.
    ///
    /// Badges are tolerant: a page with fewer than three leaves the trailing
    /// slots empty. The salary badge and the details list are required.
    pub fn extract(&self, html: &str, job_url: &str) -> Result<DetailEnrichment, StructuralParseError> {
        let document = Html::parse_document(html);
        let mut enrichment = DetailEnrichment::default();

        assign_badges(&mut enrichment, document.select(&self.badge).collect());

        enrichment.salary_raw = document
            .select(&self.salary)
            .next()
            .map(element_text)
            .ok_or_else(|| StructuralParseError::detail(job_url, "salary"))?;

        let details_list = document
            .select(&self.details_list)
            .next()
            .ok_or_else(|| StructuralParseError::detail(job_url, "details_list"))?;
        enrichment.details_raw = details_list
            .select(&self.details_item)
            .map(element_text)
            .collect();

        enrichment.info = document.select(&self.info_block).map(element_text).collect();

        Ok(enrichment)
    }
}

fn badge_label(badge: &ElementRef<'_>) -> Option<BadgeLabel> {
    LABEL_ATTRIBUTES
        .iter()
        .find_map(|attr| badge.value().attr(attr).and_then(BadgeLabel::parse))
}

/// Fills the location / job type / industry slots.
///
/// If any badge is labeled, labeled badges go to their slot and unlabeled ones
/// are dropped. Otherwise badges fill the slots in [`BadgeLabel::ORDER`];
/// missing trailing badges leave their slots empty and extra badges are ignored.
fn assign_badges(enrichment: &mut DetailEnrichment, badges: Vec<ElementRef<'_>>) {
    let labeled: Vec<(BadgeLabel, ElementRef<'_>)> = badges
        .iter()
        .filter_map(|badge| badge_label(badge).map(|label| (label, *badge)))
        .collect();

    if labeled.is_empty() {
        for (label, badge) in BadgeLabel::ORDER.into_iter().zip(badges) {
            enrichment.set_badge(label, element_text(badge));
        }
        return;
    }

    if labeled.len() < badges.len() {
        tracing::debug!(
            labeled = labeled.len(),
            total = badges.len(),
            "Ignoring unlabeled badges on a labeled page"
        );
    }
    for (label, badge) in labeled {
        enrichment.set_badge(label, element_text(badge));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::DetailPageFixture;
    use pretty_assertions::assert_eq;

    const JOB: &str = "https://www.jobberman.com/listings/accountant-1";

    fn extractor() -> DetailExtractor {
        DetailExtractor::new(&SelectorConfig::default()).unwrap()
    }

    #[test]
    fn test_full_detail_page() {
        let html = DetailPageFixture::new()
            .with_badges(&["Lagos", "Full Time", "Banking"])
            .with_salary("NGN\n\n100,000 - 150,000")
            .with_details(&["Minimum Qualification: BSc", "Experience Level: Mid", "Experience Length: 3 years"])
            .with_info(&["Prepare reports", "Reconcile accounts"])
            .to_html();

        let detail = extractor().extract(&html, JOB).unwrap();

        assert_eq!(
            detail,
            DetailEnrichment {
                location: Some("Lagos".into()),
                job_type: Some("Full Time".into()),
                industry: Some("Banking".into()),
                salary_raw: "NGN\n\n100,000 - 150,000".into(),
                details_raw: vec![
                    "Minimum Qualification: BSc".into(),
                    "Experience Level: Mid".into(),
                    "Experience Length: 3 years".into(),
                ],
                info: vec!["Prepare reports".into(), "Reconcile accounts".into()],
            }
        );
    }

    #[test]
    fn test_fewer_badges_truncates() {
        let html = DetailPageFixture::new().with_badges(&["Abuja"]).to_html();

        let detail = extractor().extract(&html, JOB).unwrap();

        assert_eq!(detail.location.as_deref(), Some("Abuja"));
        assert_eq!(detail.job_type, None);
        assert_eq!(detail.industry, None);
    }

    #[test]
    fn test_extra_badges_are_ignored() {
        let html = DetailPageFixture::new()
            .with_badges(&["Lagos", "Contract", "Oil & Gas", "Remote"])
            .to_html();

        let detail = extractor().extract(&html, JOB).unwrap();
        assert_eq!(detail.industry.as_deref(), Some("Oil & Gas"));
    }

    #[test]
    fn test_labeled_badges_map_by_label() {
        let html = DetailPageFixture::new()
            .with_labeled_badges(&[("Industry", "Banking"), ("Location", "Lagos")])
            .to_html();

        let detail = extractor().extract(&html, JOB).unwrap();

        assert_eq!(detail.location.as_deref(), Some("Lagos"));
        assert_eq!(detail.job_type, None);
        assert_eq!(detail.industry.as_deref(), Some("Banking"));
    }

    #[test]
    fn test_empty_details_list_is_allowed() {
        let html = DetailPageFixture::new().with_details(&[]).to_html();
        let detail = extractor().extract(&html, JOB).unwrap();
        assert!(detail.details_raw.is_empty());
        assert!(detail.info.is_empty());
    }

    #[test]
    fn test_missing_salary_is_structural_error() {
        let html = DetailPageFixture::new().without_salary().to_html();

        let err = extractor().extract(&html, JOB).unwrap_err();

        assert_eq!(err, StructuralParseError::detail(JOB, "salary"));
    }

    #[test]
    fn test_missing_details_list_is_structural_error() {
        let html = DetailPageFixture::new().without_details_list().to_html();
        let err = extractor().extract(&html, JOB).unwrap_err();
        assert_eq!(err.element, "details_list");
    }
}
