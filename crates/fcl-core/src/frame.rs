#![forbid(unsafe_code)]

//! Call-tree arena.
//!
//! Frames live in a flat `Vec` and refer to each other through [`FrameId`]
//! indices. Parent links are non-owning back-references: a detached frame
//! keeps its parent link so that callers can walk upward from something that
//! was just excluded.
//!
//! # Invariants
//!
//! 1. A frame is live iff it is reachable from [`FrameSet::roots`]; live
//!    frames always hold a positive sample count.
//! 2. For every live frame, `samples >= sum(children.samples)`, with equality
//!    whenever no record ends exactly at that frame.
//! 3. `total_samples + total_excluded` never changes after construction.

use tracing::debug;

use crate::record::StackRecord;

/// Index of a frame inside its [`FrameSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u32);

impl FrameId {
    /// Raw arena slot.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One named stack location with an aggregate sample count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub(crate) title: String,
    pub(crate) samples: u64,
    pub(crate) children: Vec<FrameId>,
    pub(crate) parent: Option<FrameId>,
}

impl Frame {
    /// Symbol string.
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Samples attributed to this frame and everything it called.
    #[inline]
    #[must_use]
    pub const fn samples(&self) -> u64 {
        self.samples
    }

    /// Callees, in stable (title) order.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[FrameId] {
        &self.children
    }

    /// Caller, if any.
    #[inline]
    #[must_use]
    pub const fn parent(&self) -> Option<FrameId> {
        self.parent
    }

    /// Live frames always carry samples; excluded ones are zeroed.
    #[inline]
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.samples > 0
    }
}

/// Owns every frame plus the session-wide sample accounting.
#[derive(Debug, Clone, Default)]
pub struct FrameSet {
    pub(crate) arena: Vec<Frame>,
    pub(crate) roots: Vec<FrameId>,
    pub(crate) total_samples: u64,
    pub(crate) total_excluded: u64,
}

impl FrameSet {
    /// Build the forest from raw records.
    ///
    /// Siblings are ordered by title. Records with a zero count carry no
    /// samples and are skipped. Sums saturate at `u64::MAX`; use
    /// [`crate::record::parse_folded`] to reject such input up front.
    #[must_use]
    pub fn build(records: &[StackRecord]) -> Self {
        let mut paths: Vec<(&[String], u64)> = records
            .iter()
            .filter(|record| {
                if record.count == 0 || record.frames.is_empty() {
                    debug!(path = ?record.frames, "skipping record without samples");
                    return false;
                }
                true
            })
            .map(|record| (record.frames.as_slice(), record.count))
            .collect();
        paths.sort_unstable();

        let mut set = Self::default();
        set.total_samples = paths
            .iter()
            .fold(0u64, |acc, (_, count)| acc.saturating_add(*count));
        set.roots = set.build_level(&paths, 0, None);
        debug!(
            frames = set.arena.len(),
            roots = set.roots.len(),
            samples = set.total_samples,
            "frame set built"
        );
        set
    }

    /// `paths` is sorted and every path is longer than `depth`, sharing
    /// `[..depth]` with its neighbours.
    fn build_level(
        &mut self,
        paths: &[(&[String], u64)],
        depth: usize,
        parent: Option<FrameId>,
    ) -> Vec<FrameId> {
        let mut level = Vec::new();
        let mut start = 0;
        while start < paths.len() {
            let title = &paths[start].0[depth];
            let end = start
                + paths[start..]
                    .iter()
                    .take_while(|(path, _)| &path[depth] == title)
                    .count();
            let group = &paths[start..end];

            let samples = group
                .iter()
                .fold(0u64, |acc, (_, count)| acc.saturating_add(*count));
            let id = self.push(title.clone(), samples, parent);

            // Paths ending here sort before their extensions.
            let deeper = group
                .iter()
                .position(|(path, _)| path.len() > depth + 1)
                .unwrap_or(group.len());
            let children = self.build_level(&group[deeper..], depth + 1, Some(id));
            self.arena[id.index()].children = children;

            level.push(id);
            start = end;
        }
        level
    }

    pub(crate) fn push(&mut self, title: String, samples: u64, parent: Option<FrameId>) -> FrameId {
        let id = FrameId(u32::try_from(self.arena.len()).unwrap_or(u32::MAX));
        self.arena.push(Frame {
            title,
            samples,
            children: Vec::new(),
            parent,
        });
        id
    }

    /// Look up a frame.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this set.
    #[inline]
    #[must_use]
    pub fn frame(&self, id: FrameId) -> &Frame {
        &self.arena[id.index()]
    }

    /// Top-level frames.
    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[FrameId] {
        &self.roots
    }

    /// Samples still present in the tree.
    #[inline]
    #[must_use]
    pub const fn total_samples(&self) -> u64 {
        self.total_samples
    }

    /// Samples removed by exclusion or merging.
    #[inline]
    #[must_use]
    pub const fn total_excluded(&self) -> u64 {
        self.total_excluded
    }

    /// Total ingested samples; constant for the life of the set.
    #[inline]
    #[must_use]
    pub const fn original_total(&self) -> u64 {
        self.total_samples + self.total_excluded
    }

    /// `true` when nothing is left to show.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Sum of samples over a sibling set.
    #[must_use]
    pub fn samples_of(&self, ids: &[FrameId]) -> u64 {
        ids.iter()
            .fold(0u64, |acc, &id| acc.saturating_add(self.frame(id).samples))
    }

    /// Iterate from `id`'s parent up to its root.
    pub fn ancestors(&self, id: FrameId) -> impl Iterator<Item = FrameId> + '_ {
        std::iter::successors(self.frame(id).parent, move |&cur| self.frame(cur).parent)
    }

    /// Is `id` still part of the tree?
    ///
    /// Descendants of an excluded frame keep their counts but are no longer
    /// linked from a root, so a positive count alone is not enough.
    #[must_use]
    pub fn is_reachable(&self, id: FrameId) -> bool {
        let mut cur = id;
        loop {
            let frame = self.frame(cur);
            if !frame.is_live() {
                return false;
            }
            match frame.parent {
                None => return self.roots.contains(&cur),
                Some(parent) => {
                    if !self.frame(parent).children.contains(&cur) {
                        return false;
                    }
                    cur = parent;
                }
            }
        }
    }

    /// Live frames in depth-first pre-order.
    #[must_use]
    pub fn live_frames(&self) -> Vec<FrameId> {
        let mut out = Vec::new();
        let mut stack: Vec<FrameId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.frame(id).children.iter().rev().copied());
        }
        out
    }

    /// Every live frame titled `title`, without descending into a match.
    ///
    /// A recursive symbol therefore contributes only its outermost
    /// occurrences.
    #[must_use]
    pub fn find_outermost(&self, title: &str) -> Vec<FrameId> {
        let mut found = Vec::new();
        let mut stack: Vec<FrameId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let frame = self.frame(id);
            if frame.title == title {
                found.push(id);
            } else {
                stack.extend(frame.children.iter().rev().copied());
            }
        }
        found
    }

    /// Cross-tree sample total for a title, counting nested repeats once.
    #[must_use]
    pub fn title_total(&self, title: &str) -> u64 {
        self.samples_of(&self.find_outermost(title))
    }

    /// Does `id` or anything below it have a title containing `needle`?
    #[must_use]
    pub fn subtree_contains(&self, id: FrameId, needle: &str) -> bool {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let frame = self.frame(cur);
            if frame.title.contains(needle) {
                return true;
            }
            stack.extend_from_slice(&frame.children);
        }
        false
    }
}
