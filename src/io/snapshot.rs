//! Snapshot read/write.
//!
//! The snapshot is the hand-off artifact between the ingestion pipeline and
//! the query engine: a flat CSV with header `Sales,Date,Region` and one row
//! per normalized record, in ingestion order. It is written once per batch
//! run and read-only thereafter.

use std::collections::HashMap;
use std::fs;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::SalesRecord;
use crate::error::AppError;
use crate::io::build_header_map;

pub const SNAPSHOT_HEADER: &str = "Sales,Date,Region";

/// Write the snapshot, replacing any previous file at `path`.
///
/// Rows go to a temp file first and are renamed into place, so an aborted
/// run never leaves a partial snapshot behind. Formatting is deterministic:
/// identical records always produce byte-identical files.
pub fn write_snapshot(path: &Path, records: &[SalesRecord]) -> Result<(), AppError> {
    let tmp_path = path.with_extension("csv.tmp");

    let mut out = String::with_capacity(32 + records.len() * 24);
    out.push_str(SNAPSHOT_HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&format!(
            "{},{},{}\n",
            record.sales,
            record.date.format("%Y-%m-%d"),
            record.region,
        ));
    }

    fs::write(&tmp_path, out).map_err(|e| AppError::Persist {
        path: tmp_path.clone(),
        reason: e.to_string(),
    })?;
    fs::rename(&tmp_path, path).map_err(|e| AppError::Persist {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(())
}

/// Read a snapshot back into records, in file order.
///
/// Any defect (missing file, missing columns, unparseable cells) is a
/// `Load` error: a corrupted snapshot must never be silently served.
pub fn read_snapshot(path: &Path) -> Result<Vec<SalesRecord>, AppError> {
    let file = File::open(path).map_err(|e| load_error(path, format!("failed to open: {e}")))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| load_error(path, format!("failed to read header: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let (sales_idx, date_idx, region_idx) = required_columns(path, &header_map)?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record =
            result.map_err(|e| load_error(path, format!("CSV parse error at line {line}: {e}")))?;

        let sales_raw = record.get(sales_idx).unwrap_or("");
        let sales: f64 = sales_raw
            .parse()
            .map_err(|_| load_error(path, format!("invalid `Sales` value '{sales_raw}' at line {line}")))?;

        let date_raw = record.get(date_idx).unwrap_or("");
        let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d")
            .map_err(|_| load_error(path, format!("invalid `Date` value '{date_raw}' at line {line}")))?;

        let region = record.get(region_idx).unwrap_or("").to_string();
        if region.is_empty() {
            return Err(load_error(path, format!("missing `Region` value at line {line}")));
        }

        records.push(SalesRecord { sales, date, region });
    }

    Ok(records)
}

fn required_columns(
    path: &Path,
    header_map: &HashMap<String, usize>,
) -> Result<(usize, usize, usize), AppError> {
    let index = |name: &str| {
        header_map
            .get(name)
            .copied()
            .ok_or_else(|| load_error(path, format!("missing required column: `{name}`")))
    };
    Ok((index("sales")?, index("date")?, index("region")?))
}

fn load_error(path: &Path, reason: String) -> AppError {
    AppError::Load {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sales: f64, date: (i32, u32, u32), region: &str) -> SalesRecord {
        SalesRecord {
            sales,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            region: region.to_string(),
        }
    }

    #[test]
    fn snapshot_round_trips_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.csv");
        let records = vec![
            record(7.5, (2021, 1, 12), "north"),
            record(3.0, (2021, 1, 10), "South"),
        ];

        write_snapshot(&path, &records).unwrap();
        let loaded = read_snapshot(&path).unwrap();
        assert_eq!(loaded, records);

        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("Sales,Date,Region\n"));
        assert!(body.contains("7.5,2021-01-12,north"));
    }

    #[test]
    fn missing_snapshot_is_a_load_error() {
        let err = read_snapshot(Path::new("/nonexistent/snapshot.csv")).unwrap_err();
        assert!(matches!(err, AppError::Load { .. }));
    }

    #[test]
    fn missing_column_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "Sales,Date\n1.0,2021-01-10\n").unwrap();

        let err = read_snapshot(&path).unwrap_err();
        assert!(matches!(err, AppError::Load { .. }));
    }

    #[test]
    fn unparseable_date_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "Sales,Date,Region\n1.0,10/01/2021,north\n").unwrap();

        let err = read_snapshot(&path).unwrap_err();
        assert!(matches!(err, AppError::Load { .. }));
    }

    #[test]
    fn no_tmp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.csv");
        write_snapshot(&path, &[record(1.0, (2021, 1, 10), "east")]).unwrap();
        assert!(!path.with_extension("csv.tmp").exists());
    }
}
