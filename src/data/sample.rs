//! Synthetic daily sales source generation.
//!
//! Produces raw CSVs shaped like the production exports: one row per
//! product × region × day, quantities drawn from a seeded normal
//! distribution, and the target product's unit price stepping up on the
//! known price-change date. Identical seeds produce identical files.

use std::fs;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{REGIONS, SampleConfig};
use crate::error::AppError;

/// Products present in the raw exports. The first one is the line the
/// default ingest run keeps.
pub const SAMPLE_PRODUCTS: [&str; 4] = [
    "pink morsel",
    "gold morsel",
    "lapsang souchong morsel",
    "vermilion morsel",
];

/// Pink morsel unit price before and after the 2021-01-15 price change.
const PINK_PRICE_BEFORE: f64 = 3.00;
const PINK_PRICE_AFTER: f64 = 3.99;

/// Fixed unit prices for the other product lines.
const OTHER_PRICES: [f64; 3] = [9.99, 12.00, 4.50];

/// Write `config.files` raw source CSVs covering `[start_date, end_date]`,
/// split into contiguous date chunks (one chunk per file, like the
/// production `daily_sales_data_{0,1,2}.csv` exports).
pub fn generate_sources(config: &SampleConfig) -> Result<Vec<PathBuf>, AppError> {
    if config.files == 0 {
        return Err(AppError::Persist {
            path: config.out_dir.clone(),
            reason: "file count must be > 0".to_string(),
        });
    }
    if config.end_date < config.start_date {
        return Err(AppError::Persist {
            path: config.out_dir.clone(),
            reason: format!(
                "invalid date range: {} > {}",
                config.start_date, config.end_date
            ),
        });
    }

    fs::create_dir_all(&config.out_dir).map_err(|e| AppError::Persist {
        path: config.out_dir.clone(),
        reason: e.to_string(),
    })?;

    let total_days = (config.end_date - config.start_date).num_days() + 1;
    let files = config.files as i64;
    let chunk_days = (total_days + files - 1) / files;

    let mut written = Vec::with_capacity(config.files);
    for file_idx in 0..config.files {
        let chunk_start = config.start_date + Duration::days(file_idx as i64 * chunk_days);
        let chunk_end = (chunk_start + Duration::days(chunk_days - 1)).min(config.end_date);
        if chunk_start > config.end_date {
            break;
        }

        let path = config.out_dir.join(format!("daily_sales_data_{file_idx}.csv"));
        let body = render_source(config.seed.wrapping_add(file_idx as u64), chunk_start, chunk_end)?;
        fs::write(&path, body).map_err(|e| AppError::Persist {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        written.push(path);
    }

    Ok(written)
}

fn render_source(seed: u64, start: NaiveDate, end: NaiveDate) -> Result<String, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 8.0)
        .map_err(|e| AppError::Runtime(format!("noise distribution error: {e}")))?;

    let mut out = String::from("product,quantity,price,date,region\n");

    let mut date = start;
    while date <= end {
        for (product_idx, product) in SAMPLE_PRODUCTS.iter().enumerate() {
            for (region_idx, region) in REGIONS.iter().enumerate() {
                let base = 30.0 + product_idx as f64 * 5.0 + region_idx as f64 * 3.0;
                // Demand for the repriced line softens once the price steps up.
                let demand = if product_idx == 0 && date >= price_change_date() {
                    base * 0.85
                } else {
                    base
                };
                let quantity = (demand + noise.sample(&mut rng)).round().max(0.0) as u32;

                let price = unit_price(product_idx, date);
                out.push_str(&format!(
                    "{product},{quantity},${price:.2},{},{region}\n",
                    date.format("%Y-%m-%d"),
                ));
            }
        }
        date += Duration::days(1);
    }

    Ok(out)
}

fn unit_price(product_idx: usize, date: NaiveDate) -> f64 {
    if product_idx == 0 {
        if date >= price_change_date() {
            PINK_PRICE_AFTER
        } else {
            PINK_PRICE_BEFORE
        }
    } else {
        OTHER_PRICES[product_idx - 1]
    }
}

fn price_change_date() -> NaiveDate {
    // 2021-01-15 is always a valid calendar date; the fallback never fires.
    NaiveDate::from_ymd_opt(2021, 1, 15).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &std::path::Path) -> SampleConfig {
        SampleConfig {
            out_dir: dir.to_path_buf(),
            files: 3,
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2021, 1, 31).unwrap(),
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();

        let a = generate_sources(&config(dir_a.path())).unwrap();
        let b = generate_sources(&config(dir_b.path())).unwrap();
        assert_eq!(a.len(), 3);

        for (pa, pb) in a.iter().zip(&b) {
            assert_eq!(fs::read(pa).unwrap(), fs::read(pb).unwrap());
        }
    }

    #[test]
    fn price_steps_up_on_change_date() {
        let day_before = NaiveDate::from_ymd_opt(2021, 1, 14).unwrap();
        let day_of = NaiveDate::from_ymd_opt(2021, 1, 15).unwrap();
        assert_eq!(unit_price(0, day_before), PINK_PRICE_BEFORE);
        assert_eq!(unit_price(0, day_of), PINK_PRICE_AFTER);
        // Other products are unaffected by the change date.
        assert_eq!(unit_price(1, day_before), unit_price(1, day_of));
    }

    #[test]
    fn generated_sources_survive_ingestion() {
        let dir = tempfile::tempdir().unwrap();
        let sources = generate_sources(&config(dir.path())).unwrap();

        let data = crate::io::ingest::normalize(&sources, "pink morsel").unwrap();
        // One pink morsel row per region per day.
        assert_eq!(data.records.len(), 31 * REGIONS.len());
        assert_eq!(data.rows_read, 31 * REGIONS.len() * SAMPLE_PRODUCTS.len());
        assert!(data.records.iter().all(|r| r.sales >= 0.0));
    }

    #[test]
    fn chunks_cover_the_whole_range_without_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let sources = generate_sources(&config(dir.path())).unwrap();

        let data = crate::io::ingest::normalize(&sources, "pink morsel").unwrap();
        let mut dates: Vec<_> = data.records.iter().map(|r| r.date).collect();
        dates.sort();
        dates.dedup();
        assert_eq!(dates.len(), 31);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(dates[30], NaiveDate::from_ymd_opt(2021, 1, 31).unwrap());
    }
}
