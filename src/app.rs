//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the ingestion pipeline
//! - loads the snapshot and answers aggregation queries
//! - prints reports / launches the TUI
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{Command, GenDataArgs, IngestArgs, QueryArgs, ViewArgs};
use crate::domain::{IngestConfig, QueryConfig, SampleConfig};
use crate::error::AppError;

pub mod pipeline;

/// Snapshot path used when neither `--snapshot` nor `SALES_SNAPSHOT` is set.
const DEFAULT_SNAPSHOT: &str = "pink_morsel_sales.csv";

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `sales` and `sales -r north` to behave like `sales view ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Ingest(args) => handle_ingest(args),
        Command::Query(args) => handle_query(args),
        Command::View(args) => handle_view(args),
        Command::GenData(args) => handle_gen_data(args),
    }
}

fn handle_ingest(args: IngestArgs) -> Result<(), AppError> {
    let config = IngestConfig {
        sources: args.sources,
        target_product: args.product,
        snapshot_path: resolve_snapshot_path(args.snapshot),
    };

    let summary = pipeline::run_ingest(&config)?;
    println!("{}", crate::report::format_ingest_summary(&summary, &config));
    Ok(())
}

fn handle_query(args: QueryArgs) -> Result<(), AppError> {
    let config = QueryConfig {
        snapshot_path: resolve_snapshot_path(args.snapshot),
        region: args.region,
        export_csv: args.export,
        export_json: args.export_json,
    };

    let table = crate::query::SalesTable::load(&config.snapshot_path)?;
    let series = crate::query::query(&table, config.region);

    println!("{}", crate::report::format_series(&series, config.region, &table));

    if let Some(path) = &config.export_csv {
        crate::io::export::write_series_csv(path, &series)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_series_json(path, &series, config.region)?;
    }

    Ok(())
}

fn handle_view(args: ViewArgs) -> Result<(), AppError> {
    crate::tui::run(resolve_snapshot_path(args.snapshot), args.region)
}

fn handle_gen_data(args: GenDataArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        out_dir: args.out_dir,
        files: args.files,
        seed: args.seed,
        start_date: args.start,
        end_date: args.end,
    };

    let written = crate::data::generate_sources(&config)?;
    for path in &written {
        println!("wrote {}", path.display());
    }
    Ok(())
}

/// Resolve the snapshot path: CLI flag, then `SALES_SNAPSHOT`, then default.
fn resolve_snapshot_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("SALES_SNAPSHOT").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT))
}

/// Rewrite argv so `sales` defaults to `sales view`.
///
/// Rules:
/// - `sales`                     -> `sales view`
/// - `sales -r north ...`        -> `sales view -r north ...`
/// - `sales --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("view".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "ingest" | "query" | "view" | "gen-data");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "view flags".
    if arg1.starts_with('-') {
        argv.insert(1, "view".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_view() {
        assert_eq!(rewrite_args(args(&["sales"])), args(&["sales", "view"]));
    }

    #[test]
    fn leading_flag_targets_view() {
        assert_eq!(
            rewrite_args(args(&["sales", "-r", "north"])),
            args(&["sales", "view", "-r", "north"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(args(&["sales", "ingest", "a.csv"])),
            args(&["sales", "ingest", "a.csv"])
        );
        assert_eq!(rewrite_args(args(&["sales", "--help"])), args(&["sales", "--help"]));
    }
}
