//! Run orchestration and table transforms.
//!
//! This module provides:
//! - The aggregator driving pagination and detail enrichment
//! - Column normalization (dates, currency, salary bounds, qualifications)
//! - Delimited-file output and paginated read-back
//! - The `Pipeline` run entry point

mod aggregator;
mod normalize;
mod reader;
mod run;
mod writer;

pub use aggregator::{Aggregator, HarvestProgress};
pub use normalize::{
    extract_currency, resolve_date, salary_bounds, split_qualifications, NormalizedJobRecord,
    NormalizedTable, Normalizer, Qualifications, SalaryBound, DETAILS_DELIMITER,
    QUALIFICATION_FIELDS, SALARY_DELIMITER,
};
pub use reader::{
    read_page, read_page_delimited, read_table, PageQuery, ReadEnvelope, READ_OK_MESSAGE,
};
pub use run::{Pipeline, RunReport, RunRequest, SAVED_MESSAGE};
pub use writer::{CsvWriter, NormalizedRow, COLUMNS};
