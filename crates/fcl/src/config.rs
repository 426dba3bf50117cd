#![forbid(unsafe_code)]

//! Viewer configuration.
//!
//! Sources are layered, later ones winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config PATH`)
//! 3. environment (`FCL_MIN_WIDTH`, `FCL_COLORS`, `FCL_DOUBLE_CLICK_MS`)
//! 4. command-line flags
//!
//! ```toml
//! min_width = 4
//! colors = "16"
//! double_click_ms = 250
//! invert = false
//! mouse = true
//! log_file = "/tmp/fcl.log"
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use fcl_core::gesture::ClickConfig;
use fcl_core::{LayoutEngine, MinWidthPolicy};
use fcl_tty::ColorDepth;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub const ENV_MIN_WIDTH: &str = "FCL_MIN_WIDTH";
pub const ENV_COLORS: &str = "FCL_COLORS";
pub const ENV_DOUBLE_CLICK_MS: &str = "FCL_DOUBLE_CLICK_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("min_width must be 1 or 4, got {0}")]
    MinWidth(u16),

    #[error("colors must be one of auto, mono, 16, 256; got {0:?}")]
    Colors(String),

    #[error("{var}={value:?}: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Requested palette depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect from `NO_COLOR`, `COLORTERM`, and `TERM`.
    #[default]
    Auto,
    Fixed(ColorDepth),
}

impl ColorChoice {
    /// Concrete depth, running `detect` only for [`ColorChoice::Auto`].
    pub fn resolve(self, detect: impl FnOnce() -> ColorDepth) -> ColorDepth {
        match self {
            Self::Auto => detect(),
            Self::Fixed(depth) => depth,
        }
    }
}

impl FromStr for ColorChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        ColorDepth::parse(s)
            .map(Self::Fixed)
            .ok_or_else(|| ConfigError::Colors(s.to_owned()))
    }
}

impl fmt::Display for ColorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Fixed(depth) => f.write_str(depth.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for ColorChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accept both `colors = "256"` and `colors = 256`.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }
        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Number(n) => n.to_string(),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Everything the viewer can be configured with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Narrowest drawable band: 1 or 4.
    pub min_width: u16,
    pub colors: ColorChoice,
    /// Double-click window in milliseconds.
    pub double_click_ms: u64,
    /// Start with stacks inverted.
    pub invert: bool,
    /// Capture mouse clicks.
    pub mouse: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_width: 1,
            colors: ColorChoice::Auto,
            double_click_ms: 300,
            invert: false,
            mouse: true,
            log_file: None,
        }
    }
}

impl ViewerConfig {
    /// Load from a TOML string. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay values from a custom environment lookup (for tests).
    ///
    /// Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, get_env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |var: &'static str| get_env(var).filter(|v| !v.trim().is_empty());

        if let Some(value) = lookup(ENV_MIN_WIDTH) {
            self.min_width = value.trim().parse().map_err(|_| ConfigError::Env {
                var: ENV_MIN_WIDTH,
                reason: "expected 1 or 4".into(),
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_COLORS) {
            self.colors = value.parse().map_err(|err: ConfigError| ConfigError::Env {
                var: ENV_COLORS,
                reason: err.to_string(),
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_DOUBLE_CLICK_MS) {
            self.double_click_ms = value.trim().parse().map_err(|_| ConfigError::Env {
                var: ENV_DOUBLE_CLICK_MS,
                reason: "expected milliseconds".into(),
                value: value.clone(),
            })?;
        }
        self.validate()
    }

    /// Reject values no policy exists for.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.width_policy().map(|_| ())
    }

    pub fn width_policy(&self) -> Result<MinWidthPolicy, ConfigError> {
        MinWidthPolicy::from_width(self.min_width).ok_or(ConfigError::MinWidth(self.min_width))
    }

    pub fn layout_engine(&self) -> Result<LayoutEngine, ConfigError> {
        self.width_policy().map(LayoutEngine::new)
    }

    #[must_use]
    pub fn click_config(&self) -> ClickConfig {
        ClickConfig {
            multi_click_timeout: Duration::from_millis(self.double_click_ms),
            ..ClickConfig::default()
        }
    }
}
