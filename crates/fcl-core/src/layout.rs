#![forbid(unsafe_code)]

//! Proportional layout of the call tree onto a character grid.
//!
//! Each sibling set is spread over the width of its parent band in
//! proportion to sample counts, using floor division. Siblings narrower than
//! the minimum renderable width are pooled into one trailing band so that no
//! sample disappears through rounding.
//!
//! # Invariants
//!
//! 1. Per sibling set, the emitted widths sum to at most the available width.
//! 2. Every sibling lands in exactly one band; hidden descendants are covered
//!    by the band of their nearest rendered ancestor.
//! 3. No band has width 0.
//! 4. Output is sorted by `(y, x)` and depends only on the tree, width,
//!    focus, and pin.

use smallvec::{SmallVec, smallvec};

use crate::frame::{FrameId, FrameSet};

/// Narrowest band a single frame may occupy before it is pooled.
///
/// The baseline is one character. The four-character policy keeps room for
/// a bracketed label with at least one visible title character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MinWidthPolicy {
    /// One character.
    #[default]
    Single,
    /// Four characters.
    Labelled,
}

impl MinWidthPolicy {
    /// Width in characters.
    #[inline]
    #[must_use]
    pub const fn min_width(self) -> u16 {
        match self {
            Self::Single => 1,
            Self::Labelled => 4,
        }
    }

    /// Map a configured width to a policy. Only 1 and 4 are valid.
    #[must_use]
    pub const fn from_width(width: u16) -> Option<Self> {
        match width {
            1 => Some(Self::Single),
            4 => Some(Self::Labelled),
            _ => None,
        }
    }
}

/// Screen projection of one or more frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    /// Left column.
    pub x: u16,
    /// Row.
    pub y: u16,
    /// Width in columns, never zero.
    pub width: u16,
    /// Sum of the constituent frames' samples.
    pub samples: u64,
    /// Descendants below this band are not individually rendered.
    pub truncated: bool,
    frames: SmallVec<[FrameId; 1]>,
}

impl Band {
    /// A band for exactly one frame.
    #[must_use]
    pub fn single(x: u16, y: u16, width: u16, frame: FrameId, samples: u64) -> Self {
        Self {
            x,
            y,
            width,
            samples,
            truncated: false,
            frames: smallvec![frame],
        }
    }

    /// A band standing in for several under-width siblings, heaviest first.
    #[must_use]
    pub fn aggregate(x: u16, y: u16, width: u16, set: &FrameSet, frames: &[FrameId]) -> Self {
        let mut frames: SmallVec<[FrameId; 1]> = frames.iter().copied().collect();
        frames.sort_by_key(|&id| std::cmp::Reverse(set.frame(id).samples()));
        Self {
            x,
            y,
            width,
            samples: set.samples_of(&frames),
            truncated: true,
            frames,
        }
    }

    /// Constituent frames.
    #[inline]
    #[must_use]
    pub fn frames(&self) -> &[FrameId] {
        &self.frames
    }

    /// Number of constituent frames (always at least one).
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// More than one frame shares this band.
    #[inline]
    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        self.frames.len() > 1
    }

    /// The frame, when this band shows exactly one.
    #[inline]
    #[must_use]
    pub fn single_frame(&self) -> Option<FrameId> {
        match self.frames.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Does the band cover `(x, y)`?
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        self.y == y && x >= self.x && x < self.right()
    }

    /// Is `frame` one of this band's frames?
    #[inline]
    #[must_use]
    pub fn contains_frame(&self, frame: FrameId) -> bool {
        self.frames.contains(&frame)
    }
}

/// Projects a [`FrameSet`] onto a bounded width.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutEngine {
    policy: MinWidthPolicy,
}

impl LayoutEngine {
    #[must_use]
    pub const fn new(policy: MinWidthPolicy) -> Self {
        Self { policy }
    }

    /// Bands for the current view, sorted row-major.
    ///
    /// The root level is `pin` when set, otherwise the top-level frames. When
    /// `focus` lies below the root level, its ancestors up to (and including)
    /// the first one inside the root level are drawn as full-width
    /// breadcrumb rows above the main layout.
    #[must_use]
    pub fn frame_views(
        &self,
        set: &FrameSet,
        width: u16,
        focus: Option<&[FrameId]>,
        pin: Option<&[FrameId]>,
    ) -> Vec<Band> {
        if width == 0 {
            return Vec::new();
        }

        let root_level = pin.unwrap_or(set.roots());
        let mut breadcrumbs = Vec::new();
        if let Some(&first) = focus.and_then(<[FrameId]>::first)
            && !root_level.contains(&first)
        {
            for ancestor in set.ancestors(first) {
                breadcrumbs.push(ancestor);
                if root_level.contains(&ancestor) {
                    break;
                }
            }
            breadcrumbs.reverse();
        }

        let mut bands: Vec<Band> = breadcrumbs
            .iter()
            .enumerate()
            .map(|(row, &id)| Band::single(0, row_of(row), width, id, set.frame(id).samples()))
            .collect();

        let level = focus.unwrap_or(root_level);
        let denominator = set.samples_of(level);
        self.layout_level(
            set,
            level,
            width,
            denominator,
            0,
            row_of(breadcrumbs.len()),
            &mut bands,
        );

        bands.sort_by_key(|band| (band.y, band.x));
        tracing::trace!(bands = bands.len(), width, "layout computed");
        bands
    }

    /// Lay out one sibling set over `width` columns starting at `(x, y)`,
    /// where `denominator` samples fill the full width.
    #[allow(clippy::too_many_arguments)]
    fn layout_level(
        &self,
        set: &FrameSet,
        siblings: &[FrameId],
        width: u16,
        denominator: u64,
        x: u16,
        y: u16,
        out: &mut Vec<Band>,
    ) {
        if width == 0 || denominator == 0 || siblings.is_empty() {
            return;
        }

        let min_width = self.policy.min_width();
        let mut leftovers: SmallVec<[FrameId; 8]> = SmallVec::new();
        let mut used = 0u16;

        for &id in siblings {
            let frame = set.frame(id);
            let w = scale(width, frame.samples(), denominator);
            if w < min_width {
                leftovers.push(id);
                continue;
            }
            let column = x + used;
            out.push(Band::single(column, y, w, id, frame.samples()));
            self.layout_level(
                set,
                frame.children(),
                w,
                frame.samples(),
                column,
                y.saturating_add(1),
                out,
            );
            used += w;
        }

        let remaining = width - used;
        let column = x + used;
        match leftovers.as_slice() {
            [] => {}
            [only] => {
                let w = min_width.min(remaining);
                if w > 0 {
                    let mut band = Band::single(column, y, w, *only, set.frame(*only).samples());
                    band.truncated = true;
                    out.push(band);
                }
            }
            pooled => {
                let samples = set.samples_of(pooled);
                let w = scale(width, samples, denominator)
                    .max(min_width)
                    .min(remaining);
                if w > 0 {
                    out.push(Band::aggregate(column, y, w, set, pooled));
                }
            }
        }
    }
}

/// `floor(width * samples / denominator)`, computed without overflow.
#[inline]
fn scale(width: u16, samples: u64, denominator: u64) -> u16 {
    let scaled = u128::from(width) * u128::from(samples) / u128::from(denominator);
    u16::try_from(scaled).unwrap_or(u16::MAX).min(width)
}

#[inline]
fn row_of(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}
