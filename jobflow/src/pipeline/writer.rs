//! Delimited-file output for the normalized table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::normalize::{NormalizedJobRecord, SalaryBound};
use crate::errors::{JobflowError, TableError};

/// Header row, in column order.
pub const COLUMNS: [&str; 20] = [
    "name",
    "job_url",
    "hiring_firm",
    "hiring_firm_url",
    "job_function",
    "title",
    "date_posted_raw",
    "location",
    "job_type",
    "industry",
    "salary",
    "details",
    "info",
    "date_posted",
    "currency",
    "min_salary",
    "max_salary",
    "minimum_qualification",
    "experience_level",
    "experience_length",
];

/// One output row. Field order matches [`COLUMNS`]; `None` is an empty cell.
///
/// An empty optional value is stored as `None`, so a row reads back exactly
/// as it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRow {
    /// Card link text.
    pub name: String,
    /// Detail page link as harvested.
    pub job_url: String,
    /// Hiring firm name.
    pub hiring_firm: String,
    /// Firm profile URL.
    pub hiring_firm_url: Option<String>,
    /// Job function tag.
    pub job_function: String,
    /// Job title.
    pub title: String,
    /// Posted date as displayed.
    pub date_posted_raw: String,
    /// Location badge.
    pub location: Option<String>,
    /// Job type badge.
    pub job_type: Option<String>,
    /// Industry badge.
    pub industry: Option<String>,
    /// Raw salary badge text.
    pub salary: String,
    /// `;`-joined details list.
    pub details: String,
    /// Info blocks as a JSON array.
    pub info: String,
    /// Resolved posted date.
    pub date_posted: Option<NaiveDate>,
    /// Salary currency.
    pub currency: String,
    /// Lower salary bound.
    pub min_salary: Option<SalaryBound>,
    /// Upper salary bound.
    pub max_salary: Option<SalaryBound>,
    /// Minimum education.
    pub minimum_qualification: Option<String>,
    /// Seniority.
    pub experience_level: Option<String>,
    /// Required experience.
    pub experience_length: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

impl NormalizedRow {
    /// Flattens a normalized record into its output row.
    pub fn from_record(record: &NormalizedJobRecord) -> Result<Self, JobflowError> {
        let summary = &record.record.summary;
        let detail = &record.record.detail;
        let quals = &record.qualifications;

        Ok(Self {
            name: summary.name.clone(),
            job_url: summary.job_url.clone(),
            hiring_firm: summary.hiring_firm.clone(),
            hiring_firm_url: non_empty(summary.hiring_firm_url.as_ref()),
            job_function: summary.job_function.clone(),
            title: summary.title.clone(),
            date_posted_raw: summary.date_posted_raw.clone(),
            location: non_empty(detail.location.as_ref()),
            job_type: non_empty(detail.job_type.as_ref()),
            industry: non_empty(detail.industry.as_ref()),
            salary: detail.salary_raw.clone(),
            details: detail.details_joined(),
            info: serde_json::to_string(&detail.info)?,
            date_posted: record.date_posted,
            currency: record.currency.clone(),
            min_salary: record.min_salary.clone(),
            max_salary: record.max_salary.clone(),
            minimum_qualification: non_empty(quals.minimum_qualification.as_ref()),
            experience_level: non_empty(quals.experience_level.as_ref()),
            experience_length: non_empty(quals.experience_length.as_ref()),
        })
    }
}

/// Writes the normalized table as a delimited file with a header row and no
/// index column.
#[derive(Debug, Clone, Copy)]
pub struct CsvWriter {
    delimiter: u8,
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvWriter {
    /// A comma-delimited writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// The field delimiter.
    #[must_use]
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Writes `records` to `path`, replacing any existing file. Returns the
    /// number of data rows written.
    pub fn write(&self, path: &Path, records: &[NormalizedJobRecord]) -> Result<usize, JobflowError> {
        let shown = path.display().to_string();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| TableError::write(&shown, e))?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_path(path)
            .map_err(|e| TableError::write(&shown, e))?;

        writer
            .write_record(COLUMNS)
            .map_err(|e| TableError::write(&shown, e))?;
        for record in records {
            writer
                .serialize(NormalizedRow::from_record(record)?)
                .map_err(|e| TableError::write(&shown, e))?;
        }
        writer.flush().map_err(|e| TableError::write(&shown, e))?;

        tracing::debug!(path = %shown, rows = records.len(), "Table written");
        Ok(records.len())
    }
}
