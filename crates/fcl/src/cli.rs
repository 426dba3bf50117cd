use std::path::PathBuf;

use clap::Parser;

use crate::app;
use crate::config::{ColorChoice, ConfigError, ViewerConfig};
use crate::error::Result;
use crate::input;
use crate::logging;

#[derive(Debug, Parser)]
#[command(
    name = "fcl",
    about = "Interactive terminal flame graph viewer for folded stacks",
    version
)]
pub struct Cli {
    /// Folded stack file (`frame1;frame2 count` per line). Reads stdin when omitted.
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Narrowest drawable band: 1 or 4.
    #[arg(long, value_name = "N")]
    pub min_width: Option<u16>,

    /// Palette depth: auto, mono, 16, or 256.
    #[arg(long, value_name = "DEPTH")]
    pub colors: Option<ColorChoice>,

    /// Start with stacks inverted (callees at the top).
    #[arg(long)]
    pub invert: bool,

    /// Do not capture the mouse.
    #[arg(long)]
    pub no_mouse: bool,

    /// Append tracing output to this file (filter with `FCL_LOG`).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Layer file, environment, and flags over the defaults.
    pub fn load_config(&self) -> std::result::Result<ViewerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::from_toml_file(path)?,
            None => ViewerConfig::default(),
        };
        config.apply_env()?;
        self.apply_flags(&mut config)?;
        Ok(config)
    }

    /// Apply only the flags that were given.
    pub fn apply_flags(&self, config: &mut ViewerConfig) -> std::result::Result<(), ConfigError> {
        if let Some(min_width) = self.min_width {
            config.min_width = min_width;
        }
        if let Some(colors) = self.colors {
            config.colors = colors;
        }
        if self.invert {
            config.invert = true;
        }
        if self.no_mouse {
            config.mouse = false;
        }
        if let Some(path) = &self.log_file {
            config.log_file = Some(path.clone());
        }
        config.validate()
    }
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let config = cli.load_config()?;
    logging::init(config.log_file.as_deref())?;
    let records = input::load(cli.input.as_deref())?;
    app::run(&config, records)
}
