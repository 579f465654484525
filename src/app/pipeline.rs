//! Shared pipeline logic used by both the CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! raw sources -> normalize -> snapshot -> in-memory table -> aggregate
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::PathBuf;

use crate::domain::IngestConfig;
use crate::error::AppError;

/// Outcome of a single `sales ingest` run.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    /// Raw rows read across all sources.
    pub rows_read: usize,
    /// Normalized rows written to the snapshot.
    pub rows_kept: usize,
    pub snapshot_path: PathBuf,
}

/// Execute the full ingestion pipeline: normalize all sources and persist
/// the snapshot.
///
/// One-shot batch transform: any failure aborts the run and no snapshot is
/// written (persistence goes through a temp file + rename).
pub fn run_ingest(config: &IngestConfig) -> Result<IngestSummary, AppError> {
    let data = crate::io::ingest::normalize(&config.sources, &config.target_product)?;
    crate::io::snapshot::write_snapshot(&config.snapshot_path, &data.records)?;

    Ok(IngestSummary {
        rows_read: data.rows_read,
        rows_kept: data.records.len(),
        snapshot_path: config.snapshot_path.clone(),
    })
}
