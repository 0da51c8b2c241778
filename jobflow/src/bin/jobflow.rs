//! Command-line entry point.
//!
//! `jobflow run` harvests, normalizes and writes a table; `jobflow query`
//! prints one page of a written table as a JSON envelope.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use jobflow::core::RunStatus;
use jobflow::observability::init_tracing;
use jobflow::pipeline::{
    read_page_delimited, CsvWriter, PageQuery, Pipeline, ReadEnvelope, RunRequest,
};
use jobflow::scrape::HarvestConfig;

#[derive(Parser)]
#[command(name = "jobflow")]
#[command(about = "Harvest job listings into a normalized table", version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest listing pages and write the normalized table
    Run {
        /// Listing pages to harvest (defaults to the configured page count)
        #[arg(long)]
        pages: Option<u32>,
        /// Reference date for relative posted dates (defaults to today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Output file
        #[arg(long, default_value = "job_data.csv")]
        output: PathBuf,
        /// JSON harvest configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Maximum concurrent detail fetches
        #[arg(long)]
        concurrency: Option<usize>,
        /// Fail on the first field that cannot be normalized
        #[arg(long)]
        strict: bool,
        /// Field delimiter of the output file
        #[arg(long, default_value = ",", value_parser = parse_delimiter)]
        delimiter: u8,
    },

    /// Print one page of a written table
    Query {
        /// Table written by `run`
        #[arg(long)]
        input: PathBuf,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Rows per page
        #[arg(long, default_value_t = 10)]
        page_size: usize,
        /// Field delimiter the table was written with
        #[arg(long, default_value = ",", value_parser = parse_delimiter)]
        delimiter: u8,
    },
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match raw.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(format!("delimiter must be a single ASCII character, got {raw:?}")),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;

    match cli.command {
        Commands::Run {
            pages,
            as_of,
            output,
            config,
            concurrency,
            strict,
            delimiter,
        } => {
            let mut harvest = match config {
                Some(path) => HarvestConfig::from_json_file(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => HarvestConfig::default(),
            };
            if let Some(max) = concurrency {
                harvest = harvest.with_max_concurrent(max);
            }
            if strict {
                harvest = harvest.with_strict_normalization(true);
            }

            let request = RunRequest::new(
                pages.unwrap_or(harvest.page_count),
                as_of.unwrap_or_else(|| chrono::Local::now().date_naive()),
                output,
            );
            let pipeline =
                Pipeline::new(harvest)?.with_writer(CsvWriter::new().with_delimiter(delimiter));

            match pipeline.run(request).await {
                Ok(report) => println!("{}", report.status_message()),
                Err(err) => {
                    eprintln!(
                        "{}: {} stage failed{}: {err}",
                        RunStatus::Failed,
                        err.stage(),
                        err.url().map(|u| format!(" at {u}")).unwrap_or_default()
                    );
                    std::process::exit(1);
                }
            }
        }
        Commands::Query {
            input,
            page,
            page_size,
            delimiter,
        } => {
            let envelope = read_page_delimited(&input, PageQuery::new(page, page_size), delimiter)
                .unwrap_or_else(|err| ReadEnvelope::failure(&err));
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            if envelope.error.is_some() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
