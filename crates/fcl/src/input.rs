#![forbid(unsafe_code)]

//! Loading folded stacks from a file or stdin.

use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::path::Path;

use fcl_core::StackRecord;
use fcl_core::record::parse_folded;

use crate::error::{AppError, Result};

/// Read records from `path`, or from stdin when `path` is `None`.
///
/// Stdin must be redirected; an interactive stdin is [`AppError::NoInput`].
pub fn load(path: Option<&Path>) -> Result<Vec<StackRecord>> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|error| AppError::Open {
                path: path.to_path_buf(),
                error,
            })?;
            load_from(BufReader::new(file), &path.display().to_string())
        }
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                return Err(AppError::NoInput);
            }
            load_from(stdin.lock(), "<stdin>")
        }
    }
}

/// Read records from any buffered reader; `origin` names it in errors.
pub fn load_from<R: BufRead>(reader: R, origin: &str) -> Result<Vec<StackRecord>> {
    let records = parse_folded(reader).map_err(|error| AppError::ingest(origin, error))?;
    tracing::info!(origin, records = records.len(), "loaded folded stacks");
    Ok(records)
}
