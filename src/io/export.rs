//! Export the aggregated series for downstream renderers.
//!
//! The exports are meant to be easy to consume in spreadsheets or scripts:
//! CSV for tabular tools, JSON (region + points) for chart frontends.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::{RegionFilter, SeriesPoint};
use crate::error::AppError;

/// Write the series as `date,total_sales` rows.
pub fn write_series_csv(path: &Path, series: &[SeriesPoint]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| persist_error(path, e))?;

    writeln!(file, "date,total_sales").map_err(|e| persist_error(path, e))?;
    for point in series {
        writeln!(
            file,
            "{},{}",
            point.date.format("%Y-%m-%d"),
            point.total_sales,
        )
        .map_err(|e| persist_error(path, e))?;
    }

    Ok(())
}

/// JSON document for a rendered series.
///
/// The schema is the query-engine boundary made portable: the filter that
/// produced the series plus the date-sorted points.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesFile {
    pub region: RegionFilter,
    pub points: Vec<SeriesPoint>,
}

/// Write the series as pretty JSON.
pub fn write_series_json(
    path: &Path,
    series: &[SeriesPoint],
    region: RegionFilter,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| persist_error(path, e))?;
    let doc = SeriesFile {
        region,
        points: series.to_vec(),
    };
    serde_json::to_writer_pretty(file, &doc).map_err(|e| AppError::Persist {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}

fn persist_error(path: &Path, e: std::io::Error) -> AppError {
    AppError::Persist {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}
