//! Raw source ingest and normalization.
//!
//! This module turns N heterogeneous daily-sales CSVs into a clean, ordered
//! sequence of `SalesRecord`s for a single product line.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Fail-fast on malformed cells** (a bad price is never coerced to zero)
//! - **Deterministic behavior** (source order preserved, no hidden randomness)
//! - **Separation of concerns**: no aggregation logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use rayon::prelude::*;

use crate::domain::{RawRecord, REGIONS, SalesRecord};
use crate::error::AppError;
use crate::io::build_header_map;

/// Columns every raw source must carry; extra columns are ignored.
const REQUIRED_COLUMNS: [&str; 5] = ["product", "quantity", "price", "date", "region"];

/// Ingest output: normalized records plus counts for reporting.
#[derive(Debug, Clone)]
pub struct NormalizedData {
    /// In concatenation order: source order, then row order within a source.
    pub records: Vec<SalesRecord>,
    pub rows_read: usize,
}

/// Load all sources and normalize them to `SalesRecord`s for `target_product`.
///
/// Sources are read independently (in parallel) and concatenated in the order
/// given. Any failure aborts the whole run; the failing source earliest in
/// input order is the one reported.
pub fn normalize(sources: &[PathBuf], target_product: &str) -> Result<NormalizedData, AppError> {
    let per_source: Vec<Result<SourceData, AppError>> = sources
        .par_iter()
        .map(|path| load_source(path, target_product))
        .collect();

    let mut records = Vec::new();
    let mut rows_read = 0usize;
    for result in per_source {
        let source = result?;
        rows_read += source.rows_read;
        records.extend(source.records);
    }

    Ok(NormalizedData { records, rows_read })
}

struct SourceData {
    records: Vec<SalesRecord>,
    rows_read: usize,
}

fn load_source(path: &Path, target_product: &str) -> Result<SourceData, AppError> {
    let file = File::open(path).map_err(|e| AppError::Ingestion {
        path: path.to_path_buf(),
        reason: format!("failed to open: {e}"),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Ingestion {
            path: path.to_path_buf(),
            reason: format!("failed to read headers: {e}"),
        })?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(path, &header_map)?;

    let mut records = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = result.map_err(|e| AppError::Ingestion {
            path: path.to_path_buf(),
            reason: format!("CSV parse error at line {line}: {e}"),
        })?;

        let raw = parse_row(&record, &header_map, path, line)?;
        if let Some(normalized) = normalize_record(&raw, target_product, path, line)? {
            records.push(normalized);
        }
    }

    Ok(SourceData { records, rows_read })
}

fn ensure_required_columns_exist(path: &Path, header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for column in REQUIRED_COLUMNS {
        if !header_map.contains_key(column) {
            return Err(AppError::Ingestion {
                path: path.to_path_buf(),
                reason: format!("missing required column: `{column}`"),
            });
        }
    }
    Ok(())
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    source: &Path,
    line: usize,
) -> Result<RawRecord, AppError> {
    let product = get_required(record, header_map, "product", source, line)?.to_string();

    let quantity_raw = get_required(record, header_map, "quantity", source, line)?;
    let quantity: u32 = quantity_raw
        .parse()
        .map_err(|_| malformed(source, line, "quantity", quantity_raw, "not a non-negative integer"))?;

    let price = get_required(record, header_map, "price", source, line)?.to_string();

    let date_raw = get_required(record, header_map, "date", source, line)?;
    let date = parse_date(date_raw).map_err(|reason| malformed(source, line, "date", date_raw, reason))?;

    let region = get_required(record, header_map, "region", source, line)?;
    if !REGIONS.iter().any(|known| region.eq_ignore_ascii_case(known)) {
        return Err(malformed(
            source,
            line,
            "region",
            region,
            "expected one of north, east, south, west",
        ));
    }

    Ok(RawRecord {
        product,
        quantity,
        price,
        date,
        region: region.to_string(),
    })
}

/// Apply the product filter and derive the revenue figure.
///
/// Returns `Ok(None)` for rows outside the target product line. The price
/// cell is only parsed for retained rows, so a malformed price on another
/// product never aborts a run.
fn normalize_record(
    raw: &RawRecord,
    target_product: &str,
    source: &Path,
    line: usize,
) -> Result<Option<SalesRecord>, AppError> {
    if !raw.product.trim().eq_ignore_ascii_case(target_product.trim()) {
        return Ok(None);
    }

    let price = parse_price(&raw.price)
        .map_err(|reason| malformed(source, line, "price", &raw.price, reason))?;

    Ok(Some(SalesRecord {
        sales: f64::from(raw.quantity) * price,
        date: raw.date,
        region: raw.region.clone(),
    }))
}

/// Parse a price cell of the form `$<number>` or `<number>`.
///
/// Exactly one leading `$` is stripped; the remainder must parse as a finite,
/// non-negative decimal. This is the single boundary where currency strings
/// become numbers.
pub fn parse_price(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    let amount = trimmed.strip_prefix('$').unwrap_or(trimmed);

    let value: f64 = amount
        .parse()
        .map_err(|_| "not a decimal amount".to_string())?;
    if !value.is_finite() {
        return Err("not a finite amount".to_string());
    }
    if value < 0.0 {
        return Err("negative amount".to_string());
    }
    Ok(value)
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Source exports are ISO-ish; accept the two variants seen in practice.
    const FMTS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!("invalid date '{s}', expected YYYY-MM-DD or YYYY/MM/DD"))
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &'static str,
    source: &Path,
    line: usize,
) -> Result<&'a str, AppError> {
    header_map
        .get(name)
        .and_then(|idx| record.get(*idx))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed(source, line, name, "", "missing value"))
}

fn malformed(
    source: &Path,
    line: usize,
    field: &'static str,
    value: &str,
    reason: impl Into<String>,
) -> AppError {
    AppError::MalformedField {
        path: source.to_path_buf(),
        line,
        field,
        value: value.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn price_strips_single_dollar_sign() {
        assert_eq!(parse_price("$2.50").unwrap(), 2.5);
        assert_eq!(parse_price("2.50").unwrap(), 2.5);
        assert_eq!(parse_price("$3").unwrap(), 3.0);
    }

    #[test]
    fn price_rejects_garbage() {
        assert!(parse_price("abc").is_err());
        assert!(parse_price("$").is_err());
        assert!(parse_price("$$3.00").is_err());
        assert!(parse_price("3,00").is_err());
        assert!(parse_price("-2.50").is_err());
        assert!(parse_price("inf").is_err());
        assert!(parse_price("NaN").is_err());
    }

    #[test]
    fn derivation_is_exact() {
        let raw = RawRecord {
            product: "pink morsel".to_string(),
            quantity: 3,
            price: "$2.50".to_string(),
            date: NaiveDate::from_ymd_opt(2021, 1, 10).unwrap(),
            region: "north".to_string(),
        };
        let record = normalize_record(&raw, "pink morsel", Path::new("x.csv"), 2)
            .unwrap()
            .unwrap();
        assert_eq!(record.sales, 7.5);
    }

    #[test]
    fn product_filter_is_case_insensitive_and_exact() {
        let mut raw = RawRecord {
            product: "PINK MORSEL".to_string(),
            quantity: 1,
            price: "$1.00".to_string(),
            date: NaiveDate::from_ymd_opt(2021, 1, 10).unwrap(),
            region: "east".to_string(),
        };
        let kept = normalize_record(&raw, "Pink Morsel", Path::new("x.csv"), 2).unwrap();
        assert!(kept.is_some());

        raw.product = "pink morsels".to_string();
        let dropped = normalize_record(&raw, "Pink Morsel", Path::new("x.csv"), 2).unwrap();
        assert!(dropped.is_none());
    }

    #[test]
    fn malformed_price_on_other_product_is_ignored() {
        let raw = RawRecord {
            product: "red morsel".to_string(),
            quantity: 1,
            price: "oops".to_string(),
            date: NaiveDate::from_ymd_opt(2021, 1, 10).unwrap(),
            region: "west".to_string(),
        };
        let result = normalize_record(&raw, "pink morsel", Path::new("x.csv"), 2).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn malformed_price_surfaces_source_and_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily_sales_data_0.csv");
        fs::write(
            &path,
            "product,quantity,price,date,region\npink morsel,3,abc,2021-01-10,north\n",
        )
        .unwrap();

        let err = normalize(&[path.clone()], "pink morsel").unwrap_err();
        match err {
            AppError::MalformedField { path: source, line, field, value, .. } => {
                assert_eq!(source, path);
                assert_eq!(line, 2);
                assert_eq!(field, "price");
                assert_eq!(value, "abc");
            }
            other => panic!("expected MalformedField, got {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_an_ingestion_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.csv");
        fs::write(&path, "product,quantity,price,date\npink morsel,3,$1,2021-01-10\n").unwrap();

        let err = normalize(&[path], "pink morsel").unwrap_err();
        assert!(matches!(err, AppError::Ingestion { .. }));
    }

    #[test]
    fn missing_source_is_an_ingestion_error() {
        let err = normalize(&[PathBuf::from("/nonexistent/nope.csv")], "pink morsel").unwrap_err();
        assert!(matches!(err, AppError::Ingestion { .. }));
    }

    #[test]
    fn concatenation_preserves_source_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(
            &a,
            "product,quantity,price,date,region\npink morsel,1,$1.00,2021-02-01,north\n",
        )
        .unwrap();
        fs::write(
            &b,
            "product,quantity,price,date,region\npink morsel,1,$2.00,2021-01-01,south\n",
        )
        .unwrap();

        // Later dates in the first source stay first: concatenation does not sort.
        let data = normalize(&[a, b], "pink morsel").unwrap();
        assert_eq!(data.rows_read, 2);
        assert_eq!(data.records[0].region, "north");
        assert_eq!(data.records[1].region, "south");
    }

    #[test]
    fn bom_on_first_header_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(
            &path,
            "\u{feff}product,quantity,price,date,region\npink morsel,2,$2.00,2021-01-10,WEST\n",
        )
        .unwrap();

        let data = normalize(&[path], "pink morsel").unwrap();
        assert_eq!(data.records.len(), 1);
        // Region case from the source is preserved.
        assert_eq!(data.records[0].region, "WEST");
        assert_eq!(data.records[0].sales, 4.0);
    }

    #[test]
    fn unknown_region_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region.csv");
        fs::write(
            &path,
            "product,quantity,price,date,region\npink morsel,2,$2.00,2021-01-10,central\n",
        )
        .unwrap();

        let err = normalize(&[path], "pink morsel").unwrap_err();
        match err {
            AppError::MalformedField { field, .. } => assert_eq!(field, "region"),
            other => panic!("expected MalformedField, got {other:?}"),
        }
    }
}
