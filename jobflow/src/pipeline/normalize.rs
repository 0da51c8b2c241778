//! Derivation of typed columns from raw listing text.
//!
//! All functions here are pure: the as-of date is an argument, never the
//! wall clock, so the same table always normalizes to the same output.

use chrono::{Days, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::errors::NormalizationError;
use crate::scrape::JobRecord;

/// Separates the currency line from the amount line in a salary badge.
pub const SALARY_DELIMITER: &str = "\n\n";

/// Separates qualification segments in the joined details string.
pub const DETAILS_DELIMITER: char = ';';

/// Derived qualification columns, in segment order.
pub const QUALIFICATION_FIELDS: [&str; 3] =
    ["minimum_qualification", "experience_level", "experience_length"];

static RELATIVE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*(day|week|month)s?(?:\s+ago)?$").expect("relative date pattern is valid")
});

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

/// A salary bound: an amount, or one of the site's non-numeric placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SalaryBound {
    /// Digits only, thousands separators removed.
    Amount(String),
    /// Salary withheld by the employer.
    Confidential,
    /// Pay is commission only.
    CommissionOnly,
}

impl SalaryBound {
    /// The amount, when the bound is numeric.
    #[must_use]
    pub fn amount(&self) -> Option<&str> {
        match self {
            Self::Amount(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for SalaryBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(value) => f.write_str(value),
            Self::Confidential => f.write_str("Confidential"),
            Self::CommissionOnly => f.write_str("Commission Only"),
        }
    }
}

impl From<String> for SalaryBound {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Confidential" => Self::Confidential,
            "Commission Only" => Self::CommissionOnly,
            _ => Self::Amount(value),
        }
    }
}

impl From<SalaryBound> for String {
    fn from(bound: SalaryBound) -> Self {
        bound.to_string()
    }
}

/// Resolves a relative posted date against `as_of`.
///
/// Months count as 30 days. Unrecognized text resolves to `None`.
#[must_use]
pub fn resolve_date(raw: &str, as_of: NaiveDate) -> Option<NaiveDate> {
    let text = raw.trim().to_lowercase();
    match text.as_str() {
        "today" => return Some(as_of),
        "yesterday" => return as_of.checked_sub_days(Days::new(1)),
        _ => {}
    }

    let caps = RELATIVE_DATE.captures(&text)?;
    let count: u64 = caps[1].parse().ok()?;
    let unit_days = match &caps[2] {
        "day" => 1,
        "week" => 7,
        _ => 30,
    };
    as_of.checked_sub_days(Days::new(count.checked_mul(unit_days)?))
}

/// The currency line of a salary badge (the whole text when it has no amount line).
#[must_use]
pub fn extract_currency(salary: &str) -> String {
    salary
        .split_once(SALARY_DELIMITER)
        .map_or(salary, |(currency, _)| currency)
        .trim()
        .to_string()
}

fn strip_separators(value: &str) -> String {
    value.replace(',', "").trim().to_string()
}

fn numeric(field: &str, salary: &str, part: &str) -> Result<String, NormalizationError> {
    let value = strip_separators(part);
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(NormalizationError::new(
            field,
            salary,
            format!("{part:?} is not a number"),
        ));
    }
    Ok(value)
}

/// Splits a salary badge into `(min, max)`.
///
/// "Less than X" and "More than X" give `X` for both bounds.
pub fn salary_bounds(salary: &str) -> Result<(SalaryBound, SalaryBound), NormalizationError> {
    if salary.contains("Confidential") {
        return Ok((SalaryBound::Confidential, SalaryBound::Confidential));
    }
    if salary.contains("Commission Only") {
        return Ok((SalaryBound::CommissionOnly, SalaryBound::CommissionOnly));
    }
    if salary.contains("Less than") || salary.contains("More than") {
        let stripped = salary.replace(',', "");
        let amount = DIGITS
            .find(&stripped)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| NormalizationError::new("min_salary", salary, "open-ended salary has no amount"))?;
        return Ok((SalaryBound::Amount(amount.clone()), SalaryBound::Amount(amount)));
    }

    let range = salary
        .split(SALARY_DELIMITER)
        .nth(1)
        .ok_or_else(|| NormalizationError::new("min_salary", salary, "no amount line after the currency"))?;
    let (low, high) = range
        .split_once(" - ")
        .filter(|(_, high)| !high.contains(" - "))
        .ok_or_else(|| NormalizationError::new("min_salary", salary, "amount line is not a 'min - max' range"))?;

    Ok((
        SalaryBound::Amount(numeric("min_salary", salary, low)?),
        SalaryBound::Amount(numeric("max_salary", salary, high)?),
    ))
}

fn clean_value(value: &str) -> String {
    let mut value = value.trim();
    loop {
        let next = value
            .trim_start_matches("\\n")
            .trim_end_matches("\\n")
            .trim();
        if next.len() == value.len() {
            return value.to_string();
        }
        value = next;
    }
}

/// Qualification attributes parsed from the details list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualifications {
    /// Minimum education.
    pub minimum_qualification: Option<String>,
    /// Seniority.
    pub experience_level: Option<String>,
    /// Required years of experience.
    pub experience_length: Option<String>,
}

/// Splits `"Label: value;Label: value;Label: value"` into qualification columns.
///
/// Segments map to [`QUALIFICATION_FIELDS`] by position; missing trailing
/// segments stay `None`. A segment with no `:` leaves its field `None` and is
/// returned as an error alongside the parsed values.
#[must_use]
pub fn split_qualifications(details: &str) -> (Qualifications, Vec<NormalizationError>) {
    let mut values: [Option<String>; 3] = Default::default();
    let mut errors = Vec::new();

    if !details.trim().is_empty() {
        for ((field, segment), slot) in QUALIFICATION_FIELDS
            .iter()
            .zip(details.split(DETAILS_DELIMITER))
            .zip(values.iter_mut())
        {
            match segment.split_once(':') {
                Some((_, value)) => *slot = Some(clean_value(value)),
                None => errors.push(NormalizationError::new(
                    *field,
                    segment,
                    "segment has no 'Label:' prefix",
                )),
            }
        }
    }

    let [minimum_qualification, experience_level, experience_length] = values;
    (
        Qualifications {
            minimum_qualification,
            experience_level,
            experience_length,
        },
        errors,
    )
}

/// A job record with its derived columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedJobRecord {
    /// The harvested record.
    #[serde(flatten)]
    pub record: JobRecord,
    /// Absolute posted date, when the raw text was recognized.
    pub date_posted: Option<NaiveDate>,
    /// Currency line of the salary badge.
    pub currency: String,
    /// Lower salary bound.
    pub min_salary: Option<SalaryBound>,
    /// Upper salary bound.
    pub max_salary: Option<SalaryBound>,
    /// Qualification attributes.
    #[serde(flatten)]
    pub qualifications: Qualifications,
}

/// The normalized table plus every field that could not be derived.
#[derive(Debug, Clone, Default)]
pub struct NormalizedTable {
    /// Rows in harvest order.
    pub records: Vec<NormalizedJobRecord>,
    /// Fields left empty because their raw text was malformed.
    pub issues: Vec<NormalizationError>,
}

/// Applies the column derivations to harvested records.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    as_of: NaiveDate,
    strict: bool,
}

impl Normalizer {
    /// Creates a lenient normalizer resolving dates against `as_of`.
    #[must_use]
    pub fn new(as_of: NaiveDate) -> Self {
        Self { as_of, strict: false }
    }

    /// Fails on the first malformed field instead of leaving it empty.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The reference date.
    #[must_use]
    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Normalizes one record, returning the problems found along the way.
    #[must_use]
    pub fn normalize_record(&self, record: JobRecord) -> (NormalizedJobRecord, Vec<NormalizationError>) {
        let job_url = record.job_url().to_string();
        let salary = &record.detail.salary_raw;
        let mut issues = Vec::new();

        let (min_salary, max_salary) = match salary_bounds(salary) {
            Ok((min, max)) => (Some(min), Some(max)),
            Err(err) => {
                issues.push(err);
                (None, None)
            }
        };
        let (qualifications, qualification_issues) = split_qualifications(&record.detail.details_joined());
        issues.extend(qualification_issues);

        let normalized = NormalizedJobRecord {
            date_posted: resolve_date(&record.summary.date_posted_raw, self.as_of),
            currency: extract_currency(salary),
            min_salary,
            max_salary,
            qualifications,
            record,
        };
        let issues = issues.into_iter().map(|e| e.with_job_url(job_url.clone())).collect();
        (normalized, issues)
    }

    /// Normalizes the whole table, preserving row order.
    pub fn normalize_table(&self, records: Vec<JobRecord>) -> Result<NormalizedTable, NormalizationError> {
        let mut table = NormalizedTable {
            records: Vec::with_capacity(records.len()),
            issues: Vec::new(),
        };

        for record in records {
            let (normalized, issues) = self.normalize_record(record);
            if self.strict {
                if let Some(first) = issues.into_iter().next() {
                    return Err(first);
                }
            } else {
                for issue in &issues {
                    tracing::warn!(
                        job_url = issue.job_url.as_deref().unwrap_or_default(),
                        field = %issue.field,
                        reason = %issue.reason,
                        "Field left empty"
                    );
                }
                table.issues.extend(issues);
            }
            table.records.push(normalized);
        }

        Ok(table)
    }
}
