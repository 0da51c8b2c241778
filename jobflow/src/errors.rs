//! Error types for the jobflow pipeline.
//!
//! Every error knows the [`PipelineStage`] it was raised in and, where one
//! exists, the URL being processed, so a failed run can report exactly which
//! page or job broke it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::PipelineStage;

/// The main error type for jobflow operations.
#[derive(Debug, Error)]
pub enum JobflowError {
    /// A page could not be retrieved.
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// A required element was absent from the markup.
    #[error("{0}")]
    StructuralParse(#[from] StructuralParseError),

    /// A raw field could not be normalized (strict mode only).
    #[error("{0}")]
    Normalization(#[from] NormalizationError),

    /// Reading or writing the output table failed.
    #[error("{0}")]
    Table(#[from] TableError),

    /// The run configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JobflowError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// The stage this error was raised in.
    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Fetch(_) => PipelineStage::Fetch,
            Self::StructuralParse(e) => e.stage,
            Self::Normalization(_) => PipelineStage::Normalize,
            Self::Table(e) => e.stage,
            Self::Config(_) | Self::Serialization(_) => PipelineStage::Aggregate,
            Self::Io(_) => PipelineStage::Write,
        }
    }

    /// The URL that was being processed, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Fetch(e) => Some(&e.url),
            Self::StructuralParse(e) => Some(&e.url),
            Self::Normalization(e) => e.job_url.as_deref(),
            _ => None,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("stage".to_string(), serde_json::json!(self.stage()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        if let Some(url) = self.url() {
            map.insert("url".to_string(), serde_json::json!(url));
        }
        map
    }
}

impl From<serde_json::Error> for JobflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Error raised when an HTTP fetch fails or returns a non-success status.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("Fetch failed for {url}: {reason}")]
pub struct FetchError {
    /// The requested URL.
    pub url: String,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Human-readable failure reason.
    pub reason: String,
}

impl FetchError {
    /// Creates an error for a transport-level failure (connect, timeout, body read).
    #[must_use]
    pub fn transport(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: None,
            reason: reason.into(),
        }
    }

    /// Creates an error for a non-success HTTP status.
    #[must_use]
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            status: Some(status),
            reason: format!("HTTP {status}"),
        }
    }
}

/// Error raised when an expected element is missing from a page.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("Missing '{element}' on {stage} page {url}")]
pub struct StructuralParseError {
    /// The page URL.
    pub url: String,
    /// Listing or detail.
    pub stage: PipelineStage,
    /// The structural role that could not be located.
    pub element: String,
}

impl StructuralParseError {
    /// Creates an error for a listing page.
    #[must_use]
    pub fn listing(url: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            stage: PipelineStage::Listing,
            element: element.into(),
        }
    }

    /// Creates an error for a detail page.
    #[must_use]
    pub fn detail(url: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            stage: PipelineStage::Detail,
            element: element.into(),
        }
    }
}

/// Error raised when a raw text field does not have the expected shape.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("Cannot normalize {field} from {value:?}: {reason}")]
pub struct NormalizationError {
    /// The derived column being computed.
    pub field: String,
    /// The offending raw value.
    pub value: String,
    /// What was wrong with it.
    pub reason: String,
    /// The record the value came from.
    pub job_url: Option<String>,
}

impl NormalizationError {
    /// Creates a new normalization error.
    #[must_use]
    pub fn new(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            job_url: None,
        }
    }

    /// Attaches the record's job URL.
    #[must_use]
    pub fn with_job_url(mut self, url: impl Into<String>) -> Self {
        self.job_url = Some(url.into());
        self
    }
}

/// Error raised when the output table cannot be written or read back.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("Table {stage} failed for '{path}': {reason}")]
pub struct TableError {
    /// Write or read.
    pub stage: PipelineStage,
    /// The table path.
    pub path: String,
    /// The underlying failure.
    pub reason: String,
}

impl TableError {
    /// Creates a write failure.
    #[must_use]
    pub fn write(path: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            stage: PipelineStage::Write,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a read failure.
    #[must_use]
    pub fn read(path: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            stage: PipelineStage::Read,
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
