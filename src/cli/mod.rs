//! Command-line parsing for the daily sales tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the pipeline/query code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::RegionFilter;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "sales",
    version,
    about = "Daily sales consolidation and interactive revenue series"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Consolidate raw source CSVs into the normalized sales snapshot.
    Ingest(IngestArgs),
    /// Load the snapshot, print the aggregated series, and optionally export it.
    Query(QueryArgs),
    /// Launch the interactive terminal chart.
    ///
    /// This uses the same load/query engine as `sales query`, but renders the
    /// series in a terminal UI using Ratatui.
    View(ViewArgs),
    /// Write synthetic raw source CSVs (deterministic, seeded).
    GenData(GenDataArgs),
}

/// Options for an ingestion run.
#[derive(Debug, Parser, Clone)]
pub struct IngestArgs {
    /// Raw source CSV files, in concatenation order.
    #[arg(required = true, value_name = "CSV")]
    pub sources: Vec<PathBuf>,

    /// Product line to keep (case-insensitive).
    #[arg(short = 'p', long, default_value = "pink morsel")]
    pub product: String,

    /// Snapshot output path (defaults to $SALES_SNAPSHOT, then pink_morsel_sales.csv).
    #[arg(short = 'o', long, value_name = "CSV")]
    pub snapshot: Option<PathBuf>,
}

/// Options for a one-shot query run.
#[derive(Debug, Parser, Clone)]
pub struct QueryArgs {
    /// Snapshot path (defaults to $SALES_SNAPSHOT, then pink_morsel_sales.csv).
    #[arg(long, value_name = "CSV")]
    pub snapshot: Option<PathBuf>,

    /// Region restriction.
    #[arg(short = 'r', long, value_enum, ignore_case = true, default_value_t = RegionFilter::All)]
    pub region: RegionFilter,

    /// Export the aggregated series to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the aggregated series to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for the interactive view.
#[derive(Debug, Parser, Clone)]
pub struct ViewArgs {
    /// Snapshot path (defaults to $SALES_SNAPSHOT, then pink_morsel_sales.csv).
    #[arg(long, value_name = "CSV")]
    pub snapshot: Option<PathBuf>,

    /// Region selected at startup.
    #[arg(short = 'r', long, value_enum, ignore_case = true, default_value_t = RegionFilter::All)]
    pub region: RegionFilter,
}

/// Options for synthetic source generation.
#[derive(Debug, Parser, Clone)]
pub struct GenDataArgs {
    /// Directory for the generated source files.
    #[arg(long, default_value = "data", value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Number of source files to write; the date range is split across them.
    #[arg(long, default_value_t = 3)]
    pub files: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First day covered (inclusive).
    #[arg(long, default_value = "2020-07-01", value_name = "DATE")]
    pub start: NaiveDate,

    /// Last day covered (inclusive).
    #[arg(long, default_value = "2021-06-30", value_name = "DATE")]
    pub end: NaiveDate,
}
