#![forbid(unsafe_code)]

//! Tracing subscriber setup.
//!
//! The viewer owns the terminal, so events go to a file or nowhere. The
//! filter comes from `FCL_LOG` (`EnvFilter` syntax) and defaults to `warn`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{AppError, Result};

pub const ENV_LOG: &str = "FCL_LOG";
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Build the filter from an `FCL_LOG` value, falling back to `warn` when it
/// is missing or unparsable.
#[must_use]
pub fn filter_from(directive: Option<&str>) -> EnvFilter {
    directive
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber.
///
/// With `log_file` the file is opened for append; without it events are
/// discarded. A subscriber that is already installed is left in place.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let filter = filter_from(std::env::var(ENV_LOG).ok().as_deref());

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|error| AppError::LogFile {
                    path: path.to_path_buf(),
                    error,
                })?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::io::sink)
            .try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_is_warn() {
        assert_eq!(filter_from(None).to_string(), "warn");
        assert_eq!(filter_from(Some("  ")).to_string(), "warn");
    }

    #[test]
    fn explicit_directive_wins() {
        assert_eq!(filter_from(Some("fcl_core=debug")).to_string(), "fcl_core=debug");
    }

    #[test]
    fn unopenable_log_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = init(Some(dir.path())).unwrap_err();
        assert!(matches!(err, AppError::LogFile { .. }));
    }
}
