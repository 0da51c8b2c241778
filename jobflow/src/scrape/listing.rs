//! Job-card extraction from listing pages.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::config::SelectorConfig;
use super::models::ListingSummary;
use crate::errors::{JobflowError, StructuralParseError};

/// Parses a CSS selector, reporting which configured role it belongs to.
pub(crate) fn compile(role: &str, css: &str) -> Result<Selector, JobflowError> {
    Selector::parse(css)
        .map_err(|e| JobflowError::config(format!("invalid {role} selector {css:?}: {e}")))
}

/// Trimmed text content of an element and its descendants.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extracts one [`ListingSummary`] per job card on a listing page.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    base_url: Url,
    card: Selector,
    card_link: Selector,
    firm: Selector,
    firm_link: Selector,
    job_function: Selector,
    title: Selector,
    date_posted: Selector,
}

impl ListingExtractor {
    /// Compiles the listing selectors.
    pub fn new(base_url: &str, selectors: &SelectorConfig) -> Result<Self, JobflowError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| JobflowError::config(format!("invalid base_url {base_url:?}: {e}")))?;

        Ok(Self {
            base_url,
            card: compile("card", &selectors.card)?,
            card_link: compile("card_link", &selectors.card_link)?,
            firm: compile("firm", &selectors.firm)?,
            firm_link: compile("firm_link", &selectors.firm_link)?,
            job_function: compile("job_function", &selectors.job_function)?,
            title: compile("title", &selectors.title)?,
            date_posted: compile("date_posted", &selectors.date_posted)?,
        })
    }

    /// Extracts every card on the page, in document order.
    ///
    /// A card missing anything other than the firm link fails the whole page.
    pub fn extract(
        &self,
        html: &str,
        page_url: &str,
    ) -> Result<Vec<ListingSummary>, StructuralParseError> {
        let document = Html::parse_document(html);
        document
            .select(&self.card)
            .enumerate()
            .map(|(index, card)| self.extract_card(card, index, page_url))
            .collect()
    }

    fn extract_card(
        &self,
        card: ElementRef<'_>,
        index: usize,
        page_url: &str,
    ) -> Result<ListingSummary, StructuralParseError> {
        let require = |selector: &Selector, role: &str| {
            card.select(selector)
                .next()
                .ok_or_else(|| StructuralParseError::listing(page_url, format!("card {index}: {role}")))
        };

        let link = require(&self.card_link, "card_link")?;
        let job_url = link
            .value()
            .attr("href")
            .ok_or_else(|| StructuralParseError::listing(page_url, format!("card {index}: card_link href")))?
            .trim()
            .to_string();

        let firm = require(&self.firm, "firm")?;
        let hiring_firm_url = firm
            .select(&self.firm_link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| self.resolve(href));

        Ok(ListingSummary {
            name: element_text(link),
            job_url,
            hiring_firm: element_text(firm),
            hiring_firm_url,
            job_function: element_text(require(&self.job_function, "job_function")?),
            title: element_text(require(&self.title, "title")?),
            date_posted_raw: element_text(require(&self.date_posted, "date_posted")?),
        })
    }

    fn resolve(&self, href: &str) -> String {
        let href = href.trim();
        self.base_url
            .join(href)
            .map_or_else(|_| href.to_string(), String::from)
    }
}
