#![forbid(unsafe_code)]

//! Ingestion errors.

use std::io;

use thiserror::Error;

/// Failure while reading folded stack records.
///
/// Every parse variant carries the 1-based line number and the raw line so
/// the caller can report exactly what was rejected before interactive mode
/// starts.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("line {line}: missing space before the sample count: {text:?}")]
    MissingSeparator { line: usize, text: String },

    #[error("line {line}: sample count {count:?} is not a non-negative integer: {text:?}")]
    InvalidCount {
        line: usize,
        count: String,
        text: String,
    },

    #[error("line {line}: total sample count exceeds {max}: {text:?}", max = u64::MAX)]
    CountOverflow { line: usize, text: String },

    #[error("failed to read folded stacks: {0}")]
    Io(#[from] io::Error),
}
