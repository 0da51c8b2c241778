//! Paginated read-back of a written table.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use super::writer::NormalizedRow;
use crate::errors::{JobflowError, TableError};

/// Envelope message for a successful read.
pub const READ_OK_MESSAGE: &str = "Successfully fetched jobs";

/// Page selection for [`read_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: usize,
    /// Rows per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    10
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageQuery {
    /// Creates a query.
    #[must_use]
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// Row index range `[(page-1)*page_size, page*page_size)`; empty for page 0.
    #[must_use]
    pub fn bounds(&self) -> std::ops::Range<usize> {
        if self.page == 0 {
            return 0..0;
        }
        let start = (self.page - 1).saturating_mul(self.page_size);
        start..start.saturating_add(self.page_size)
    }
}

/// JSON response shape of a read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadEnvelope {
    /// Outcome message.
    pub message: String,
    /// Rows keyed by their index in the table.
    pub data: Map<String, Value>,
    /// Failure description, when the read failed.
    pub error: Option<String>,
}

impl ReadEnvelope {
    /// An envelope for a failed read.
    #[must_use]
    pub fn failure(err: &JobflowError) -> Self {
        Self {
            message: "Failed to fetch jobs".to_string(),
            data: Map::new(),
            error: Some(err.to_string()),
        }
    }
}

/// Reads every row of a table written by [`super::CsvWriter`].
pub fn read_table(path: &Path, delimiter: u8) -> Result<Vec<NormalizedRow>, JobflowError> {
    let shown = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| TableError::read(&shown, e))?;

    let rows = reader
        .deserialize()
        .collect::<Result<Vec<NormalizedRow>, _>>()
        .map_err(|e| TableError::read(&shown, e))?;
    Ok(rows)
}

/// Loads the comma-delimited table at `path` and returns the rows selected by
/// `query`.
///
/// Out-of-range pages give an empty `data` object rather than an error.
pub fn read_page(path: &Path, query: PageQuery) -> Result<ReadEnvelope, JobflowError> {
    read_page_delimited(path, query, b',')
}

/// [`read_page`] for a table written with another delimiter.
pub fn read_page_delimited(
    path: &Path,
    query: PageQuery,
    delimiter: u8,
) -> Result<ReadEnvelope, JobflowError> {
    let rows = read_table(path, delimiter)?;
    let bounds = query.bounds();

    let mut data = Map::new();
    for (index, row) in rows.into_iter().enumerate() {
        if bounds.contains(&index) {
            data.insert(index.to_string(), serde_json::to_value(row)?);
        }
    }

    tracing::debug!(path = %path.display(), page = query.page, rows = data.len(), "Page read");
    Ok(ReadEnvelope {
        message: READ_OK_MESSAGE.to_string(),
        data,
        error: None,
    })
}
