//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during aggregation
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Region names accepted in raw sources (case-insensitive match).
pub const REGIONS: [&str; 4] = ["north", "east", "south", "west"];

/// One row of a raw source file.
///
/// `price` is kept as written (`$3.00` or `3.00`): the product filter runs
/// before price parsing, so a malformed price on a row outside the target
/// product line never aborts a run. Exists only during ingestion.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub product: String,
    pub quantity: u32,
    pub price: String,
    pub date: NaiveDate,
    /// Original-case region string; validated against `REGIONS`.
    pub region: String,
}

/// One row of the normalized snapshot: the durable hand-off artifact
/// between the ingestion pipeline and the query engine.
///
/// `sales = quantity × unit price`, always `>= 0`. Multiple records per
/// date are expected; the query engine sums them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub sales: f64,
    pub date: NaiveDate,
    pub region: String,
}

/// One point of an aggregated daily-revenue series.
///
/// A series is ascending by date with unique dates, ready to plot without
/// re-sorting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub total_sales: f64,
}

/// Region restriction applied by the query engine.
///
/// `All` is the sentinel for "no restriction". Matching against record
/// regions is case-insensitive and exact (no partial matches).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RegionFilter {
    All,
    North,
    East,
    South,
    West,
}

impl RegionFilter {
    pub const ALL: [RegionFilter; 5] = [
        RegionFilter::All,
        RegionFilter::North,
        RegionFilter::East,
        RegionFilter::South,
        RegionFilter::West,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            RegionFilter::All => "All Regions",
            RegionFilter::North => "North",
            RegionFilter::East => "East",
            RegionFilter::South => "South",
            RegionFilter::West => "West",
        }
    }

    /// The region name this filter matches, or `None` for `All`.
    pub fn region_name(self) -> Option<&'static str> {
        match self {
            RegionFilter::All => None,
            RegionFilter::North => Some("north"),
            RegionFilter::East => Some("east"),
            RegionFilter::South => Some("south"),
            RegionFilter::West => Some("west"),
        }
    }

    /// Whether a record with this region string passes the filter.
    pub fn matches(self, region: &str) -> bool {
        match self.region_name() {
            None => true,
            Some(name) => region.trim().eq_ignore_ascii_case(name),
        }
    }

    pub fn next(self) -> Self {
        match self {
            RegionFilter::All => RegionFilter::North,
            RegionFilter::North => RegionFilter::East,
            RegionFilter::East => RegionFilter::South,
            RegionFilter::South => RegionFilter::West,
            RegionFilter::West => RegionFilter::All,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            RegionFilter::All => RegionFilter::West,
            RegionFilter::North => RegionFilter::All,
            RegionFilter::East => RegionFilter::North,
            RegionFilter::South => RegionFilter::East,
            RegionFilter::West => RegionFilter::South,
        }
    }
}

/// A full ingestion run's configuration (derived from CLI flags).
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Raw source files, in concatenation order.
    pub sources: Vec<PathBuf>,
    /// Product line to keep (case-insensitive match).
    pub target_product: String,
    /// Where the normalized snapshot is written.
    pub snapshot_path: PathBuf,
}

/// Configuration for a one-shot query run.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub snapshot_path: PathBuf,
    pub region: RegionFilter,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// Configuration for synthetic source generation.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub out_dir: PathBuf,
    /// Number of source files; the date range is split across them.
    pub files: usize,
    pub seed: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
