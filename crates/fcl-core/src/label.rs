#![forbid(unsafe_code)]

//! Band labels, color classes, and emphasis.
//!
//! These are the renderer-facing facts about a band. The renderer maps a
//! [`ColorClass`] and an [`Emphasis`] to a concrete style; nothing here knows
//! about terminal colors.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::frame::FrameSet;
use crate::layout::Band;

/// Glyph for a one-column single-frame band.
pub const SINGLE_GLYPH: char = '-';
/// Glyph for a one-column aggregate band, and the aggregate fill.
pub const AGGREGATE_GLYPH: char = '+';

/// How a band should stand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Emphasis {
    #[default]
    Normal,
    /// The band under the cursor.
    Selected,
    /// Another band sharing the selected symbol.
    Highlighted,
}

/// Stable palette slot for a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorClass(pub u8);

/// Deterministic color class from the band's titles.
///
/// The same title always maps to the same class for a given palette size,
/// so repeated renders and separate runs agree. A palette of zero classes
/// (monochrome) maps everything to class 0.
#[must_use]
pub fn color_class(set: &FrameSet, band: &Band, classes: u8) -> ColorClass {
    if classes == 0 {
        return ColorClass(0);
    }
    let mut hasher = FxHasher::default();
    for &id in band.frames() {
        set.frame(id).title().hash(&mut hasher);
    }
    ColorClass((hasher.finish() % u64::from(classes)) as u8)
}

/// Text drawn inside a band, exactly `band.width` columns wide.
///
/// Single frames show `[title---]` with the title clipped to fit; aggregates
/// show `[+++]`. A one-column band is a single glyph.
#[must_use]
pub fn band_label(set: &FrameSet, band: &Band) -> String {
    let width = usize::from(band.width);
    match (width, band.single_frame()) {
        (0, _) => String::new(),
        (1, Some(_)) => SINGLE_GLYPH.to_string(),
        (1, None) => AGGREGATE_GLYPH.to_string(),
        (_, Some(id)) => bracketed(&fit_to_width(set.frame(id).title(), width - 2, '-')),
        (_, None) => bracketed(&AGGREGATE_GLYPH.to_string().repeat(width - 2)),
    }
}

fn bracketed(inner: &str) -> String {
    format!("[{inner}]")
}

/// Clip `text` to `width` display columns on grapheme boundaries, then pad
/// with `fill`.
#[must_use]
pub fn fit_to_width(text: &str, width: usize, fill: char) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let w = grapheme.width();
        if used + w > width {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    out.extend(std::iter::repeat_n(fill, width - used));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutEngine;
    use crate::record::StackRecord;

    fn set(lines: &[(&str, u64)]) -> FrameSet {
        let records: Vec<StackRecord> = lines
            .iter()
            .map(|(path, count)| StackRecord::new(path.split(';'), *count))
            .collect();
        FrameSet::build(&records)
    }

    #[test]
    fn labels_fill_band_width() {
        let s = set(&[("main", 1)]);
        let id = s.roots()[0];
        let wide = Band::single(0, 0, 10, id, 1);
        assert_eq!(band_label(&s, &wide), "[main----]");
        let tight = Band::single(0, 0, 5, id, 1);
        assert_eq!(band_label(&s, &tight), "[mai]");
        let two = Band::single(0, 0, 2, id, 1);
        assert_eq!(band_label(&s, &two), "[]");
        let one = Band::single(0, 0, 1, id, 1);
        assert_eq!(band_label(&s, &one), "-");
    }

    #[test]
    fn aggregate_labels() {
        let s = set(&[("a", 100), ("b", 1), ("c", 1)]);
        let bands = LayoutEngine::default().frame_views(&s, 10, None, None);
        let pooled = bands.iter().find(|b| b.is_aggregate()).unwrap();
        assert_eq!(band_label(&s, pooled), "+");
        let wide = Band::aggregate(0, 0, 5, &s, pooled.frames());
        assert_eq!(band_label(&s, &wide), "[+++]");
    }

    #[test]
    fn wide_characters_are_not_split() {
        assert_eq!(fit_to_width("日本語", 5, '-'), "日本-");
        assert_eq!(fit_to_width("ab", 4, ' '), "ab  ");
        assert_eq!(fit_to_width("abc", 0, '-'), "");
    }

    #[test]
    fn color_class_is_stable_per_title() {
        let s = set(&[("x;foo", 1), ("y;foo", 1), ("z", 1)]);
        let bands = LayoutEngine::default().frame_views(&s, 30, None, None);
        let foos: Vec<_> = bands
            .iter()
            .filter(|b| s.frame(b.frames()[0]).title() == "foo")
            .map(|b| color_class(&s, b, 7))
            .collect();
        assert_eq!(foos.len(), 2);
        assert_eq!(foos[0], foos[1]);
        assert!(foos[0].0 < 7);
        assert_eq!(color_class(&s, &bands[0], 0), ColorClass(0));
    }
}
