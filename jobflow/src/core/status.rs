//! Pipeline stage and run status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The pipeline stage a piece of work (or a failure) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// HTTP retrieval of a listing or detail page.
    Fetch,
    /// Job-card extraction from a listing page.
    Listing,
    /// Enrichment extraction from a detail page.
    Detail,
    /// Pagination and merging of records into the table.
    Aggregate,
    /// Derivation of typed columns from raw text.
    Normalize,
    /// Serialization of the table to disk.
    Write,
    /// Paginated read of a written table.
    Read,
}

impl PipelineStage {
    /// All stages in data-flow order.
    pub const ALL: [Self; 7] = [
        Self::Fetch,
        Self::Listing,
        Self::Detail,
        Self::Aggregate,
        Self::Normalize,
        Self::Write,
        Self::Read,
    ];
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Listing => write!(f, "listing"),
            Self::Detail => write!(f, "detail"),
            Self::Aggregate => write!(f, "aggregate"),
            Self::Normalize => write!(f, "normalize"),
            Self::Write => write!(f, "write"),
            Self::Read => write!(f, "read"),
        }
    }
}

/// The terminal status of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every page was harvested and the table was written.
    Succeeded,
    /// The table was written, but some fields could not be normalized.
    CompletedWithIssues,
    /// The run aborted before writing.
    Failed,
}

impl RunStatus {
    /// Whether the output file was produced.
    #[must_use]
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Succeeded | Self::CompletedWithIssues)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::CompletedWithIssues => write!(f, "completed_with_issues"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display_matches_serde() {
        for stage in PipelineStage::ALL {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{stage}\""));
        }
    }

    #[test]
    fn test_run_status_is_written() {
        assert!(RunStatus::Succeeded.is_written());
        assert!(RunStatus::CompletedWithIssues.is_written());
        assert!(!RunStatus::Failed.is_written());
    }

    #[test]
    fn test_run_status_display() {
        assert_eq!(RunStatus::CompletedWithIssues.to_string(), "completed_with_issues");
    }
}
