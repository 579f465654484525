use std::path::PathBuf;

use thiserror::Error;

/// Application errors, each mapped to a process exit code at the binary
/// boundary (2 = bad input, 3 = snapshot load, 4 = runtime/terminal).
#[derive(Debug, Error)]
pub enum AppError {
    /// A raw source file is missing, unreadable, or not valid tabular data.
    #[error("ingestion failed for '{path}': {reason}")]
    Ingestion { path: PathBuf, reason: String },

    /// A single cell failed validation during ingestion.
    ///
    /// Carries the offending source, line, and field. Malformed values abort
    /// the whole run rather than being coerced to zero or dropped.
    #[error("malformed `{field}` value '{value}' in '{path}' line {line}: {reason}")]
    MalformedField {
        path: PathBuf,
        line: usize,
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The snapshot could not be loaded into the query engine.
    #[error("failed to load snapshot '{path}': {reason}")]
    Load { path: PathBuf, reason: String },

    /// A snapshot, export, or generated source file could not be written.
    #[error("failed to write '{path}': {reason}")]
    Persist { path: PathBuf, reason: String },

    /// Runtime failures outside the data path (terminal init/draw, RNG setup).
    #[error("{0}")]
    Runtime(String),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Ingestion { .. }
            | AppError::MalformedField { .. }
            | AppError::Persist { .. } => 2,
            AppError::Load { .. } => 3,
            AppError::Runtime(_) => 4,
        }
    }
}
