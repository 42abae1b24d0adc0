//! deamprep — consolidation tooling for the DEAM music-emotion dataset.
//!
//! Merges the dataset's per-file CSVs (per-song features, per-dimension
//! annotations) into single tagged tables, and converts the MP3 audio to
//! WAV. One consolidation engine serves both CSV layouts; the call sites
//! differ only in configuration (directory, delimiter, identifier rule,
//! output path).

pub mod audio;
pub mod consolidate;
pub mod discover;
pub mod error;
pub mod persist;
pub mod report;

pub use error::{Error, Result};
