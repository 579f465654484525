//! Domain model: records, aggregated series, filters, and run configs.

pub mod types;

pub use types::*;
