//! Aggregation query engine.
//!
//! The snapshot is loaded once into an immutable `SalesTable`; every
//! filter-change event is answered by `query`, which only reads the table
//! and returns a freshly built series. Because the table is never mutated
//! after `load`, any number of `query` calls may run interleaved without
//! coordination.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::{RegionFilter, SalesRecord, SeriesPoint};
use crate::error::AppError;

/// The in-memory table: normalized records sorted ascending by date.
///
/// Constructed once at startup via [`SalesTable::load`] and read-only for
/// the rest of the process lifetime. A reload builds a complete new table
/// and swaps the handle only on success.
#[derive(Debug, Clone)]
pub struct SalesTable {
    records: Vec<SalesRecord>,
    path: PathBuf,
}

impl SalesTable {
    /// Load the snapshot at `path`, parse its dates, and sort rows by date.
    ///
    /// The sort is stable: rows sharing a date keep their snapshot order.
    /// Any snapshot defect is a `Load` error; the engine never serves a
    /// partially-loaded table.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let mut records = crate::io::snapshot::read_snapshot(path)?;
        records.sort_by_key(|r| r.date);
        Ok(Self {
            records,
            path: path.to_path_buf(),
        })
    }

    /// Build a table directly from records (fixtures, tests).
    pub fn from_records(mut records: Vec<SalesRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self {
            records,
            path: PathBuf::new(),
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last date in the table, if any rows exist.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}

/// Aggregate daily revenue, optionally restricted to one region.
///
/// Output points are ascending by date with unique dates, ready to plot
/// without re-sorting. Zero matching rows yields an empty series, which is
/// a valid result (renders as an empty chart, not a failure).
pub fn query(table: &SalesTable, region: RegionFilter) -> Vec<SeriesPoint> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in table.records() {
        if !region.matches(&record.region) {
            continue;
        }
        *by_date.entry(record.date).or_insert(0.0) += record.sales;
    }

    by_date
        .into_iter()
        .map(|(date, total_sales)| SeriesPoint { date, total_sales })
        .collect()
}

/// Sum of a series (used for header stats and reporting).
pub fn series_total(series: &[SeriesPoint]) -> f64 {
    series.iter().map(|p| p.total_sales).sum()
}
