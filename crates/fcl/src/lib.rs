#![forbid(unsafe_code)]

//! `fcl`: browse folded stack profiles as an interactive flame graph.
//!
//! ```text
//! perf script | stackcollapse-perf.pl | fcl
//! fcl --min-width 4 --colors 256 profile.folded
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;

pub use cli::run_from_env;
pub use config::{ColorChoice, ConfigError, ViewerConfig};
pub use error::{AppError, Result};
