//! HTML fixtures shaped like the job board's listing and detail pages.

const CARD_CLASS: &str = "mx-5 md:mx-0 flex flex-wrap col-span-1 mb-5 bg-white rounded-lg border border-gray-300 hover:border-gray-400 focus-within:ring-2 focus-within:ring-offset-2 focus-within:ring-gray-500";
const BADGE_CLASS: &str = "text-sm font-normal px-3 rounded bg-brand-secondary-50 mr-2 mb-3 inline-block";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// One job card on a listing page.
#[derive(Debug, Clone)]
pub struct ListingCardFixture {
    /// Detail page href.
    pub job_url: String,
    /// Title text, also the link text.
    pub title: Option<String>,
    /// Firm name and optional profile href.
    pub firm: (String, Option<String>),
    /// Job function tag.
    pub job_function: String,
    /// Posted-date tag.
    pub date_posted: String,
}

impl ListingCardFixture {
    /// A complete card with placeholder firm, function and date.
    #[must_use]
    pub fn new(job_url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            job_url: job_url.into(),
            title: Some(title.into()),
            firm: ("Acme Ltd".to_string(), Some("/employers/acme".to_string())),
            job_function: "Administrative & Office".to_string(),
            date_posted: "Today".to_string(),
        }
    }

    /// Sets the firm name and profile link.
    #[must_use]
    pub fn with_firm(mut self, name: impl Into<String>, href: Option<&str>) -> Self {
        self.firm = (name.into(), href.map(String::from));
        self
    }

    /// Sets the job function tag.
    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.job_function = function.into();
        self
    }

    /// Sets the posted-date tag.
    #[must_use]
    pub fn with_date_posted(mut self, date: impl Into<String>) -> Self {
        self.date_posted = date.into();
        self
    }

    /// Drops the title element.
    #[must_use]
    pub fn without_title(mut self) -> Self {
        self.title = None;
        self
    }

    /// Renders the card markup.
    #[must_use]
    pub fn to_html(&self) -> String {
        let title = self.title.as_deref().map_or_else(String::new, |t| {
            format!(r#"<p class="text-lg font-medium break-words text-link-500">{}</p>"#, escape(t))
        });
        let firm = match &self.firm.1 {
            Some(href) => format!(r#"<a href="{}">{}</a>"#, escape(href), escape(&self.firm.0)),
            None => escape(&self.firm.0),
        };

        format!(
            r#"<div class="{card_class}">
  <div class="flex-1">
    <a href="{url}" class="relative mb-3 text-lg font-medium break-words focus:outline-none text-link-500">
      {title}
    </a>
    <p class="text-sm text-link-500">{firm}</p>
    <div class="flex flex-wrap">
      <p class="text-sm text-gray-500 text-loading-animate inline-block">{function}</p>
      <p class="ml-auto text-sm font-normal text-gray-700 text-loading-animate">{date}</p>
    </div>
  </div>
</div>"#,
            card_class = CARD_CLASS,
            url = escape(&self.job_url),
            function = escape(&self.job_function),
            date = escape(&self.date_posted),
        )
    }
}

/// Renders a listing page holding `cards`.
#[must_use]
pub fn listing_page_html(cards: &[ListingCardFixture]) -> String {
    let body: String = cards.iter().map(ListingCardFixture::to_html).collect::<Vec<_>>().join("\n");
    format!("<!DOCTYPE html><html><head><title>Jobs</title></head><body><main>{body}</main></body></html>")
}

/// A job detail page.
#[derive(Debug, Clone)]
pub struct DetailPageFixture {
    badges: Vec<(Option<String>, String)>,
    salary: Option<String>,
    details: Option<Vec<String>>,
    info: Vec<String>,
}

impl Default for DetailPageFixture {
    fn default() -> Self {
        Self {
            badges: ["Lagos", "Full Time", "Banking"]
                .into_iter()
                .map(|b| (None, b.to_string()))
                .collect(),
            salary: Some("NGN\n\n100,000 - 150,000".to_string()),
            details: Some(vec![
                "Minimum Qualification: BSc".to_string(),
                "Experience Level: Mid".to_string(),
                "Experience Length: 3 years".to_string(),
            ]),
            info: Vec::new(),
        }
    }
}

impl DetailPageFixture {
    /// A complete page with three badges, a salary range and three details.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the badges with unlabeled ones.
    #[must_use]
    pub fn with_badges(mut self, badges: &[&str]) -> Self {
        self.badges = badges.iter().map(|b| (None, (*b).to_string())).collect();
        self
    }

    /// Replaces the badges with `(label, value)` pairs.
    #[must_use]
    pub fn with_labeled_badges(mut self, badges: &[(&str, &str)]) -> Self {
        self.badges = badges
            .iter()
            .map(|(label, value)| (Some((*label).to_string()), (*value).to_string()))
            .collect();
        self
    }

    /// Sets the salary badge text.
    #[must_use]
    pub fn with_salary(mut self, salary: impl Into<String>) -> Self {
        self.salary = Some(salary.into());
        self
    }

    /// Drops the salary badge.
    #[must_use]
    pub fn without_salary(mut self) -> Self {
        self.salary = None;
        self
    }

    /// Sets the details list items.
    #[must_use]
    pub fn with_details(mut self, details: &[&str]) -> Self {
        self.details = Some(details.iter().map(|d| (*d).to_string()).collect());
        self
    }

    /// Drops the details list element.
    #[must_use]
    pub fn without_details_list(mut self) -> Self {
        self.details = None;
        self
    }

    /// Sets the info blocks.
    #[must_use]
    pub fn with_info(mut self, info: &[&str]) -> Self {
        self.info = info.iter().map(|i| (*i).to_string()).collect();
        self
    }

    /// Renders the page markup.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut body = String::new();

        for (label, value) in &self.badges {
            let label = label
                .as_deref()
                .map_or_else(String::new, |l| format!(r#" data-label="{}""#, escape(l)));
            body.push_str(&format!(
                r##"<a href="#" class="{BADGE_CLASS}"{label}>{value}</a>"##,
                BADGE_CLASS = BADGE_CLASS,
                label = label,
                value = escape(value)
            ));
        }
        if let Some(salary) = &self.salary {
            body.push_str(&format!(r#"<span class="{}">{}</span>"#, BADGE_CLASS, escape(salary)));
        }
        if let Some(details) = &self.details {
            body.push_str(r#"<ul class="pl-5 text-sm list-disc text-gray-500">"#);
            for item in details {
                body.push_str(&format!("<li>{}</li>", escape(item)));
            }
            body.push_str("</ul>");
        }
        for block in &self.info {
            body.push_str(&format!(r#"<ul class="list-disc list-inside"><li>{}</li></ul>"#, escape(block)));
        }

        format!("<!DOCTYPE html><html><head><title>Job</title></head><body><article>{body}</article></body></html>")
    }
}
