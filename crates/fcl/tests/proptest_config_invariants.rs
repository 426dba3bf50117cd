//! Property-based tests for configuration layering.
//!
//! 1. Only widths 1 and 4 are accepted, from any source.
//! 2. A TOML file round-trips every valid field.
//! 3. Environment values override the file; empty values do not.

use std::io::Write;

use fcl::config::{ENV_COLORS, ENV_DOUBLE_CLICK_MS, ENV_MIN_WIDTH};
use fcl::{ColorChoice, ConfigError, ViewerConfig};
use fcl_tty::ColorDepth;
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn color_choice() -> impl Strategy<Value = (ColorChoice, &'static str)> {
    prop_oneof![
        Just((ColorChoice::Auto, "auto")),
        Just((ColorChoice::Fixed(ColorDepth::Mono), "mono")),
        Just((ColorChoice::Fixed(ColorDepth::Ansi16), "16")),
        Just((ColorChoice::Fixed(ColorDepth::Ansi256), "256")),
    ]
}

fn env_of(pairs: Vec<(&'static str, String)>) -> impl Fn(&str) -> Option<String> {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Width policy
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn only_one_and_four_are_valid(width in 0u16..64) {
        let from_toml = ViewerConfig::from_toml_str(&format!("min_width = {width}"));
        let mut from_env = ViewerConfig::default();
        let env_result = from_env.apply_env_with(env_of(vec![(ENV_MIN_WIDTH, width.to_string())]));

        if width == 1 || width == 4 {
            prop_assert!(from_toml.is_ok());
            prop_assert!(env_result.is_ok());
            prop_assert_eq!(from_env.min_width, width);
        } else {
            prop_assert!(matches!(from_toml, Err(ConfigError::MinWidth(w)) if w == width));
            prop_assert!(matches!(env_result, Err(ConfigError::MinWidth(w)) if w == width));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. File loading
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn toml_file_round_trips(
        labelled in any::<bool>(),
        colors in color_choice(),
        double_click_ms in 1u64..2000,
        invert in any::<bool>(),
        mouse in any::<bool>(),
    ) {
        let min_width = if labelled { 4 } else { 1 };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "min_width = {min_width}\ncolors = \"{}\"\ndouble_click_ms = {double_click_ms}\n\
             invert = {invert}\nmouse = {mouse}\n",
            colors.1,
        )
        .unwrap();

        let config = ViewerConfig::from_toml_file(file.path()).unwrap();
        prop_assert_eq!(config, ViewerConfig {
            min_width,
            colors: colors.0,
            double_click_ms,
            invert,
            mouse,
            log_file: None,
        });
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Environment precedence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn env_beats_file(
        file_colors in color_choice(),
        env_colors in color_choice(),
        env_ms in 1u64..5000,
        blank in any::<bool>(),
    ) {
        let mut config =
            ViewerConfig::from_toml_str(&format!("colors = \"{}\"", file_colors.1)).unwrap();
        let (colors_value, ms_value) = if blank {
            (String::new(), " ".to_owned())
        } else {
            (env_colors.1.to_owned(), env_ms.to_string())
        };
        config
            .apply_env_with(env_of(vec![
                (ENV_COLORS, colors_value),
                (ENV_DOUBLE_CLICK_MS, ms_value),
            ]))
            .unwrap();

        if blank {
            prop_assert_eq!(config.colors, file_colors.0);
            prop_assert_eq!(config.double_click_ms, 300);
        } else {
            prop_assert_eq!(config.colors, env_colors.0);
            prop_assert_eq!(config.double_click_ms, env_ms);
        }
    }
}
