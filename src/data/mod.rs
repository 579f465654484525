//! Synthetic raw source generation.

pub mod sample;

pub use sample::*;
