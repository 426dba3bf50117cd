#![forbid(unsafe_code)]

//! Color depth and palette.
//!
//! A [`Theme`] is built once from configuration and handed to the painter;
//! there is no process-wide color state.

use crossterm::style::Color;
use fcl_core::label::ColorClass;

/// Palette used on 256-color terminals (warm flame tones).
pub const PALETTE_256: [u8; 7] = [214, 202, 208, 196, 166, 172, 178];

/// Palette used on 16-color terminals.
pub const PALETTE_16: [Color; 3] = [Color::Red, Color::Yellow, Color::Green];

/// How many colors the terminal can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorDepth {
    /// No color; emphasis is still drawn with attributes.
    Mono,
    Ansi16,
    #[default]
    Ansi256,
}

impl ColorDepth {
    /// Parse a configured depth. `auto` is handled by the caller.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mono" | "none" | "0" => Some(Self::Mono),
            "16" | "ansi16" => Some(Self::Ansi16),
            "256" | "ansi256" => Some(Self::Ansi256),
            _ => None,
        }
    }

    /// Detect from the process environment.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Detect using a custom environment lookup (for tests).
    ///
    /// `NO_COLOR` (any non-empty value) wins; then `COLORTERM` of
    /// `truecolor`/`24bit` or a `TERM` mentioning `256color` give 256 colors;
    /// a `dumb` or missing `TERM` gives monochrome; anything else 16.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if get_env("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            return Self::Mono;
        }
        let colorterm = get_env("COLORTERM").unwrap_or_default().to_ascii_lowercase();
        if colorterm == "truecolor" || colorterm == "24bit" {
            return Self::Ansi256;
        }
        let term = get_env("TERM").unwrap_or_default().to_ascii_lowercase();
        if term.contains("256color") {
            Self::Ansi256
        } else if term.is_empty() || term == "dumb" {
            Self::Mono
        } else {
            Self::Ansi16
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mono => "mono",
            Self::Ansi16 => "16",
            Self::Ansi256 => "256",
        }
    }
}

/// Concrete colors for band classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    depth: ColorDepth,
    palette: Vec<Color>,
}

impl Theme {
    #[must_use]
    pub fn new(depth: ColorDepth) -> Self {
        let palette = match depth {
            ColorDepth::Mono => Vec::new(),
            ColorDepth::Ansi16 => PALETTE_16.to_vec(),
            ColorDepth::Ansi256 => PALETTE_256
                .iter()
                .map(|&ansi| Color::AnsiValue(ansi))
                .collect(),
        };
        Self { depth, palette }
    }

    #[must_use]
    pub const fn depth(&self) -> ColorDepth {
        self.depth
    }

    /// Number of color classes to hash titles into.
    #[must_use]
    pub fn class_count(&self) -> u8 {
        u8::try_from(self.palette.len()).unwrap_or(u8::MAX)
    }

    /// Background for a class; `None` in monochrome.
    #[must_use]
    pub fn background(&self, class: ColorClass) -> Option<Color> {
        self.palette.get(usize::from(class.0)).copied()
    }

    /// Text color drawn over a palette background.
    #[must_use]
    pub fn foreground(&self) -> Option<Color> {
        (!self.palette.is_empty()).then_some(Color::Black)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ColorDepth::default())
    }
}
