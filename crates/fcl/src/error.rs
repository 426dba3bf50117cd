use std::io;
use std::path::PathBuf;

use fcl_core::IngestError;
use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot open {path}: {error}")]
    Open {
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error("{origin}: {error}")]
    Ingest {
        origin: String,
        #[source]
        error: IngestError,
    },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot open log file {path}: {error}")]
    LogFile {
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error("no input: pass a folded stack file or pipe one on stdin")]
    NoInput,
}

impl AppError {
    /// Process exit status: 2 for bad invocation, 1 for everything else.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::NoInput => 2,
            _ => 1,
        }
    }

    #[must_use]
    pub fn ingest(origin: impl Into<String>, error: IngestError) -> Self {
        Self::Ingest {
            origin: origin.into(),
            error,
        }
    }
}
