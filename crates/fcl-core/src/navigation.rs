#![forbid(unsafe_code)]

//! Selection, highlight, focus, pin, and inversion state.
//!
//! [`Navigator`] owns the records, the frame tree, and every derived view
//! (bands, index, vertical split). Any structural change runs the same
//! rebuild path, which tries to keep the previously selected frame selected.
//!
//! # Invariants
//!
//! 1. `selection` is `Some` iff at least one band exists, and it is always a
//!    valid band index.
//! 2. The highlight set is non-empty iff a band is selected, and it always
//!    contains the selected band when first computed.
//! 3. Focus and pin only ever hold frames still reachable in the tree.

use tracing::{debug, info};

use crate::frame::{FrameId, FrameSet};
use crate::keymap::Action;
use crate::label::Emphasis;
use crate::layout::{Band, LayoutEngine};
use crate::record::{self, StackRecord};
use crate::status;
use crate::view_index::ViewIndex;
use crate::vspace::{self, VerticalSplit};

/// Bands sharing the selected title, with a cursor for `n`/`N`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlight {
    members: Vec<usize>,
    cursor: usize,
    title_total: Option<u64>,
}

impl Highlight {
    /// Highlighted band indices, row-major.
    #[must_use]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Cross-tree sample total for the selected title; `None` for aggregates.
    #[must_use]
    pub const fn title_total(&self) -> Option<u64> {
        self.title_total
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Outcome of [`Navigator::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// State changed; repaint.
    Redraw,
    /// Nothing to do for this action in the current state.
    Ignored,
    /// The caller should open the search prompt.
    PromptSearch,
    Quit,
}

impl From<bool> for Dispatch {
    fn from(changed: bool) -> Self {
        if changed { Self::Redraw } else { Self::Ignored }
    }
}

/// What a rebuild should try to reselect.
#[derive(Debug, Clone)]
enum Keep {
    /// First band containing any of these frames.
    Frames(Vec<FrameId>),
    /// First single-frame band with this title; used when the tree was
    /// rebuilt and old ids mean nothing.
    Title(String),
    Nothing,
}

/// Interactive view state over one profile.
#[derive(Debug, Clone)]
pub struct Navigator {
    records: Vec<StackRecord>,
    frames: FrameSet,
    layout: LayoutEngine,
    width: u16,
    height: u16,
    bands: Vec<Band>,
    index: ViewIndex,
    split: VerticalSplit,
    selection: Option<usize>,
    highlight: Highlight,
    focus: Option<Vec<FrameId>>,
    pin: Option<Vec<FrameId>>,
    inverted: bool,
}

impl Navigator {
    /// Build the tree and lay it out for a `width` x `height` terminal.
    #[must_use]
    pub fn new(records: Vec<StackRecord>, layout: LayoutEngine, width: u16, height: u16) -> Self {
        let frames = FrameSet::build(&records);
        let mut nav = Self {
            records,
            frames,
            layout,
            width,
            height,
            bands: Vec::new(),
            index: ViewIndex::default(),
            split: VerticalSplit::default(),
            selection: None,
            highlight: Highlight::default(),
            focus: None,
            pin: None,
            inverted: false,
        };
        nav.relayout(Keep::Nothing);
        nav
    }

    /// Start with every stack reversed.
    #[must_use]
    pub fn with_inversion(mut self, inverted: bool) -> Self {
        if inverted != self.inverted {
            self.inverted = inverted;
            self.rebuild_keeping(Keep::Nothing);
        }
        self
    }

    // --- accessors ---

    #[must_use]
    pub fn frames(&self) -> &FrameSet {
        &self.frames
    }

    /// Bands that fit the chart area, row-major.
    #[must_use]
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    #[must_use]
    pub fn index(&self) -> &ViewIndex {
        &self.index
    }

    #[must_use]
    pub const fn split(&self) -> VerticalSplit {
        self.split
    }

    #[must_use]
    pub const fn selection(&self) -> Option<usize> {
        self.selection
    }

    #[must_use]
    pub fn selected_band(&self) -> Option<&Band> {
        self.selection.and_then(|i| self.bands.get(i))
    }

    #[must_use]
    pub fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    #[must_use]
    pub fn focus(&self) -> Option<&[FrameId]> {
        self.focus.as_deref()
    }

    #[must_use]
    pub fn pin(&self) -> Option<&[FrameId]> {
        self.pin.as_deref()
    }

    #[must_use]
    pub const fn is_inverted(&self) -> bool {
        self.inverted
    }

    #[must_use]
    pub const fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// How band `i` should be drawn.
    #[must_use]
    pub fn emphasis(&self, band: usize) -> Emphasis {
        if self.selection == Some(band) {
            Emphasis::Selected
        } else if self.highlight.members.contains(&band) {
            Emphasis::Highlighted
        } else {
            Emphasis::Normal
        }
    }

    /// Status panel text for the selection, fitted to the status rows.
    #[must_use]
    pub fn status_lines(&self) -> Vec<String> {
        self.selected_band().map_or_else(Vec::new, |band| {
            status::band_status(
                &self.frames,
                band,
                self.frames.original_total(),
                self.split.status_rows,
                self.highlight.title_total,
            )
        })
    }

    #[must_use]
    pub fn excluded_warning(&self) -> Option<String> {
        status::excluded_warning(&self.frames)
    }

    // --- input ---

    /// Apply one action.
    pub fn dispatch(&mut self, action: Action) -> Dispatch {
        debug!(action = action.name(), "dispatch");
        match action {
            Action::MoveLeft => self.move_horizontal(-1).into(),
            Action::MoveRight => self.move_horizontal(1).into(),
            Action::MoveUp => self.select_parent().into(),
            Action::MoveDown => self.select_first_child().into(),
            Action::ClearFocus => self.clear_focus().into(),
            Action::Rebuild => {
                self.rebuild();
                Dispatch::Redraw
            }
            Action::Focus => self.set_focus().into(),
            Action::HardFocus => self.hard_focus_selection().into(),
            Action::Pin => self.set_pin().into(),
            Action::Exclude => self.exclude_selection().into(),
            Action::ToggleInversion => {
                self.toggle_inversion();
                Dispatch::Redraw
            }
            Action::Search => {
                if self.bands.is_empty() {
                    Dispatch::Ignored
                } else {
                    Dispatch::PromptSearch
                }
            }
            Action::NextHighlight => self.next_highlight().into(),
            Action::PrevHighlight => self.prev_highlight().into(),
            Action::Quit => Dispatch::Quit,
        }
    }

    // --- selection ---

    /// Move through all bands, wrapping at both ends.
    pub fn move_horizontal(&mut self, delta: isize) -> bool {
        let Some(current) = self.selection else {
            return false;
        };
        let count = self.bands.len() as isize;
        let next = (current as isize + delta).rem_euclid(count) as usize;
        self.select(next);
        true
    }

    /// Jump to the band drawn above the selection.
    pub fn select_parent(&mut self) -> bool {
        self.select_related(ViewIndex::parent_index)
    }

    /// Jump to the band drawn below the selection's left edge.
    pub fn select_first_child(&mut self) -> bool {
        self.select_related(ViewIndex::first_child_index)
    }

    fn select_related(&mut self, related: fn(&ViewIndex, usize) -> Option<usize>) -> bool {
        match self.selection.and_then(|i| related(&self.index, i)) {
            Some(target) => {
                self.select(target);
                true
            }
            None => false,
        }
    }

    /// Select whatever is drawn at `(x, y)`.
    pub fn select_at(&mut self, x: u16, y: u16) -> bool {
        match self.index.lookup(x, y) {
            Some(band) => {
                self.select(band);
                true
            }
            None => false,
        }
    }

    /// Select at `(x, y)` and focus on it.
    pub fn focus_at(&mut self, x: u16, y: u16) -> bool {
        self.select_at(x, y) && self.set_focus()
    }

    /// Move the highlight cursor forward and select that band.
    pub fn next_highlight(&mut self) -> bool {
        self.step_highlight(1)
    }

    /// Move the highlight cursor backward and select that band.
    pub fn prev_highlight(&mut self) -> bool {
        self.step_highlight(-1)
    }

    fn step_highlight(&mut self, delta: isize) -> bool {
        let len = self.highlight.members.len();
        if len == 0 {
            return false;
        }
        let cursor = (self.highlight.cursor as isize + delta).rem_euclid(len as isize) as usize;
        self.highlight.cursor = cursor;
        self.selection = Some(self.highlight.members[cursor]);
        true
    }

    /// Select the next band (row-major, wrapping, current band last) whose
    /// title contains `query`. Aggregate and truncated bands also match on
    /// anything hidden below them.
    pub fn search(&mut self, query: &str) -> bool {
        let Some(current) = self.selection else {
            return false;
        };
        if query.is_empty() {
            return false;
        }
        let count = self.bands.len();
        let found = (1..=count)
            .map(|step| (current + step) % count)
            .find(|&i| self.band_matches(&self.bands[i], query));
        match found {
            Some(i) => {
                self.select(i);
                true
            }
            None => {
                debug!(query, "search found nothing");
                false
            }
        }
    }

    fn band_matches(&self, band: &Band, query: &str) -> bool {
        if band.truncated || band.is_aggregate() {
            band.frames()
                .iter()
                .any(|&id| self.frames.subtree_contains(id, query))
        } else {
            band.frames()
                .iter()
                .any(|&id| self.frames.frame(id).title().contains(query))
        }
    }

    fn select(&mut self, band: usize) {
        self.selection = Some(band);
        self.highlight = self.compute_highlight(band);
    }

    fn compute_highlight(&self, selected: usize) -> Highlight {
        let Some(id) = self.bands[selected].single_frame() else {
            return Highlight {
                members: vec![selected],
                cursor: 0,
                title_total: None,
            };
        };
        let title = self.frames.frame(id).title();
        let members: Vec<usize> = self
            .bands
            .iter()
            .enumerate()
            .filter(|(_, band)| {
                band.frames()
                    .iter()
                    .any(|&f| self.frames.frame(f).title() == title)
            })
            .map(|(i, _)| i)
            .collect();
        let cursor = members.iter().position(|&i| i == selected).unwrap_or(0);
        Highlight {
            members,
            cursor,
            title_total: Some(self.frames.title_total(title)),
        }
    }

    fn selected_frames(&self) -> Vec<FrameId> {
        self.selected_band()
            .map(|band| band.frames().to_vec())
            .unwrap_or_default()
    }

    /// Selected frames in sibling order, for use as a focus or pin set.
    fn selected_sibling_set(&self) -> Option<Vec<FrameId>> {
        let mut set = self.selected_frames();
        if set.is_empty() {
            return None;
        }
        set.sort_unstable();
        Some(set)
    }

    // --- view state ---

    /// Make the selection the layout base.
    pub fn set_focus(&mut self) -> bool {
        let Some(set) = self.selected_sibling_set() else {
            return false;
        };
        self.focus = Some(set);
        self.relayout(Keep::Frames(self.selected_frames()));
        true
    }

    /// Focus on the selection and stop breadcrumbs at it.
    pub fn set_pin(&mut self) -> bool {
        let Some(set) = self.selected_sibling_set() else {
            return false;
        };
        self.focus = Some(set.clone());
        self.pin = Some(set);
        self.relayout(Keep::Frames(self.selected_frames()));
        true
    }

    /// Drop focus and pin.
    pub fn clear_focus(&mut self) -> bool {
        if self.focus.is_none() && self.pin.is_none() {
            return false;
        }
        self.focus = None;
        self.pin = None;
        self.relayout(Keep::Frames(self.selected_frames()));
        true
    }

    /// Adapt to a new terminal size.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.relayout(Keep::Frames(self.selected_frames()));
    }

    // --- tree changes ---

    /// Rebuild the tree from the original records, discarding exclusions,
    /// merges, focus, and pin. Inversion is kept.
    pub fn rebuild(&mut self) {
        let keep = self.selected_title();
        self.rebuild_keeping(keep);
    }

    fn rebuild_keeping(&mut self, keep: Keep) {
        self.frames = if self.inverted {
            FrameSet::build(&record::invert(&self.records))
        } else {
            FrameSet::build(&self.records)
        };
        self.focus = None;
        self.pin = None;
        info!(inverted = self.inverted, "tree rebuilt from records");
        self.relayout(keep);
    }

    /// Flip caller/callee order and rebuild.
    pub fn toggle_inversion(&mut self) {
        self.inverted = !self.inverted;
        self.rebuild();
    }

    /// Exclude the selected band's frames.
    ///
    /// Focus and pin fall back to their nearest surviving ancestors; the
    /// selection moves to the nearest surviving ancestor of what was removed.
    pub fn exclude_selection(&mut self) -> bool {
        let targets = self.selected_frames();
        let Some(&first) = targets.first() else {
            return false;
        };
        self.frames.exclude(&targets);

        if self.frames.total_samples() == 0 {
            self.focus = None;
            self.pin = None;
            self.relayout(Keep::Nothing);
            return true;
        }

        self.focus = self.focus.take().and_then(|set| self.nearest_reachable(&set));
        self.pin = self.pin.take().and_then(|set| self.nearest_reachable(&set));
        let keep = self
            .frames
            .frame(first)
            .parent()
            .and_then(|parent| self.nearest_reachable(&[parent]))
            .map_or(Keep::Nothing, Keep::Frames);
        self.relayout(keep);
        true
    }

    /// Merge every occurrence of the selected title into a single root.
    /// Aggregate bands have no single title and are ignored.
    pub fn hard_focus_selection(&mut self) -> bool {
        let Some(id) = self.selected_band().and_then(Band::single_frame) else {
            return false;
        };
        let title = self.frames.frame(id).title().to_owned();
        let Some(root) = self.frames.merge_by_title(&title) else {
            return false;
        };
        self.focus = None;
        self.pin = None;
        self.relayout(Keep::Frames(vec![root]));
        true
    }

    /// The reachable members of `set`, or else the closest reachable
    /// ancestor of its first member.
    fn nearest_reachable(&self, set: &[FrameId]) -> Option<Vec<FrameId>> {
        let live: Vec<FrameId> = set
            .iter()
            .copied()
            .filter(|&id| self.frames.is_reachable(id))
            .collect();
        if !live.is_empty() {
            return Some(live);
        }
        let first = *set.first()?;
        self.frames
            .ancestors(first)
            .find(|&id| self.frames.is_reachable(id))
            .map(|id| vec![id])
    }

    fn selected_title(&self) -> Keep {
        self.selected_band()
            .and_then(Band::single_frame)
            .map_or(Keep::Nothing, |id| {
                Keep::Title(self.frames.frame(id).title().to_owned())
            })
    }

    /// Recompute bands, split, and index, then reselect.
    fn relayout(&mut self, keep: Keep) {
        let mut bands = self.layout.frame_views(
            &self.frames,
            self.width,
            self.focus.as_deref(),
            self.pin.as_deref(),
        );
        self.split = vspace::allocate(&bands, self.height);
        vspace::fit_bands(&self.frames, &mut bands, self.split.chart_rows);
        self.index = ViewIndex::build(&bands);
        self.bands = bands;

        if self.bands.is_empty() {
            self.selection = None;
            self.highlight = Highlight::default();
            debug!("no bands to show");
            return;
        }

        let kept = match &keep {
            Keep::Frames(frames) => self
                .bands
                .iter()
                .position(|band| frames.iter().any(|&f| band.contains_frame(f))),
            Keep::Title(title) => self.bands.iter().position(|band| {
                band.single_frame()
                    .is_some_and(|id| self.frames.frame(id).title() == title)
            }),
            Keep::Nothing => None,
        };
        self.select(kept.unwrap_or(0));
        debug!(
            bands = self.bands.len(),
            chart_rows = self.split.chart_rows,
            status_rows = self.split.status_rows,
            selection = self.selection,
            "views rebuilt"
        );
    }
}
