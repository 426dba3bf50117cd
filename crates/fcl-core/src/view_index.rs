#![forbid(unsafe_code)]

//! Screen-space index over rendered bands.
//!
//! Maps `(x, y)` to the band drawn there and derives row adjacency. The
//! parent/child relation here follows *rendered rows*, not the call tree: an
//! aggregate or truncated band has no one-to-one tree counterpart, so
//! vertical navigation simply asks "what is drawn directly above/below my
//! left edge".

use crate::layout::Band;

/// One band's horizontal extent on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: u16,
    end: u16,
    band: usize,
}

/// Per-row interval lists plus precomputed row adjacency.
#[derive(Debug, Clone, Default)]
pub struct ViewIndex {
    rows: Vec<Vec<Span>>,
    parents: Vec<Option<usize>>,
    first_children: Vec<Option<usize>>,
}

impl ViewIndex {
    /// Index a band list. Band positions in the list become the ids returned
    /// by every lookup.
    #[must_use]
    pub fn build(bands: &[Band]) -> Self {
        let row_count = bands.iter().map(|b| usize::from(b.y) + 1).max().unwrap_or(0);
        let mut rows: Vec<Vec<Span>> = vec![Vec::new(); row_count];
        for (band, view) in bands.iter().enumerate() {
            debug_assert!(view.width > 0, "zero-width band at ({}, {})", view.x, view.y);
            rows[usize::from(view.y)].push(Span {
                start: view.x,
                end: view.right(),
                band,
            });
        }

        let mut index = Self {
            rows,
            parents: Vec::with_capacity(bands.len()),
            first_children: Vec::with_capacity(bands.len()),
        };
        for view in bands {
            let parent = view
                .y
                .checked_sub(1)
                .and_then(|above| index.lookup(view.x, above));
            let child = view
                .y
                .checked_add(1)
                .and_then(|below| index.lookup(view.x, below));
            index.parents.push(parent);
            index.first_children.push(child);
        }
        index
    }

    /// Band covering `(x, y)`, if any.
    #[must_use]
    pub fn lookup(&self, x: u16, y: u16) -> Option<usize> {
        self.rows
            .get(usize::from(y))?
            .iter()
            .find(|span| x >= span.start && x < span.end)
            .map(|span| span.band)
    }

    /// Band drawn on the row above `band`, at its left edge.
    #[must_use]
    pub fn parent_index(&self, band: usize) -> Option<usize> {
        self.parents.get(band).copied().flatten()
    }

    /// Band drawn on the row below `band`, at its left edge.
    #[must_use]
    pub fn first_child_index(&self, band: usize) -> Option<usize> {
        self.first_children.get(band).copied().flatten()
    }
}
