//! Formatted terminal output for ingest and query runs.
//!
//! We keep formatting code in one place so:
//! - the pipeline/engine code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::app::pipeline::IngestSummary;
use crate::domain::{IngestConfig, RegionFilter, SeriesPoint};
use crate::query::{SalesTable, series_total};

/// Format the outcome of an ingestion run.
pub fn format_ingest_summary(summary: &IngestSummary, config: &IngestConfig) -> String {
    let mut out = String::new();

    out.push_str("=== sales - Ingest ===\n");
    out.push_str(&format!("Product: {}\n", config.target_product));
    out.push_str(&format!("Sources: {}\n", config.sources.len()));
    out.push_str(&format!(
        "Rows: read={} | kept={}\n",
        summary.rows_read, summary.rows_kept
    ));
    out.push_str(&format!("Snapshot: {}\n", summary.snapshot_path.display()));

    out
}

/// Format an aggregated series with its header stats.
pub fn format_series(series: &[SeriesPoint], region: RegionFilter, table: &SalesTable) -> String {
    let mut out = String::new();

    out.push_str("=== sales - Daily Revenue ===\n");
    out.push_str(&format!("Snapshot: {}\n", table.path().display()));
    out.push_str(&format!("Region: {}\n", region.display_name()));

    if let Some((first, last)) = table.date_range() {
        out.push_str(&format!("Table: rows={} | dates=[{first}, {last}]\n", table.len()));
    } else {
        out.push_str(&format!("Table: rows={}\n", table.len()));
    }

    out.push_str(&format!(
        "Series: points={} | total={:.2}\n\n",
        series.len(),
        series_total(series)
    ));

    if series.is_empty() {
        out.push_str("(no rows match this region)\n");
        return out;
    }

    out.push_str("Date        Sales\n");
    for point in series {
        out.push_str(&format!(
            "{}  {:>12.2}\n",
            point.date.format("%Y-%m-%d"),
            point.total_sales
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SalesRecord;
    use chrono::NaiveDate;

    #[test]
    fn empty_series_renders_a_hint_not_an_error() {
        let table = SalesTable::from_records(vec![SalesRecord {
            sales: 5.0,
            date: NaiveDate::from_ymd_opt(2021, 1, 10).unwrap(),
            region: "south".to_string(),
        }]);
        let text = format_series(&[], RegionFilter::North, &table);
        assert!(text.contains("points=0"));
        assert!(text.contains("no rows match"));
    }

    #[test]
    fn series_rows_are_listed_in_order() {
        let table = SalesTable::from_records(Vec::new());
        let series = vec![
            SeriesPoint {
                date: NaiveDate::from_ymd_opt(2021, 1, 10).unwrap(),
                total_sales: 15.0,
            },
            SeriesPoint {
                date: NaiveDate::from_ymd_opt(2021, 1, 11).unwrap(),
                total_sales: 7.5,
            },
        ];
        let text = format_series(&series, RegionFilter::All, &table);
        let first = text.find("2021-01-10").unwrap();
        let second = text.find("2021-01-11").unwrap();
        assert!(first < second);
        assert!(text.contains("total=22.50"));
    }
}
