#![forbid(unsafe_code)]

//! Declarative key-to-action table.
//!
//! Input decoding produces [`KeyEvent`]s; this table turns them into
//! [`Action`]s, so action handlers are testable without a terminal.

use rustc_hash::FxHashMap;

use crate::event::{KeyCode, KeyEvent, Modifiers};

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// High-level viewer commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Previous band, cyclic over all rendered bands.
    MoveLeft,
    /// Next band, cyclic over all rendered bands.
    MoveRight,
    /// Band on the row above.
    MoveUp,
    /// Band on the row below.
    MoveDown,
    /// Clear focus and pin.
    ClearFocus,
    /// Rebuild the tree from the original records.
    Rebuild,
    /// Focus on the selection.
    Focus,
    /// Merge every occurrence of the selected title into one root.
    HardFocus,
    /// Pin the selection as the breadcrumb boundary.
    Pin,
    /// Remove the selection from the tree.
    Exclude,
    /// Reverse every stack and rebuild.
    ToggleInversion,
    /// Open the search prompt.
    Search,
    /// Next band in the highlight set.
    NextHighlight,
    /// Previous band in the highlight set.
    PrevHighlight,
    Quit,
}

impl Action {
    /// Stable name, used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MoveLeft => "move_left",
            Self::MoveRight => "move_right",
            Self::MoveUp => "move_up",
            Self::MoveDown => "move_down",
            Self::ClearFocus => "clear_focus",
            Self::Rebuild => "rebuild",
            Self::Focus => "focus",
            Self::HardFocus => "hard_focus",
            Self::Pin => "pin",
            Self::Exclude => "exclude",
            Self::ToggleInversion => "toggle_inversion",
            Self::Search => "search",
            Self::NextHighlight => "next_highlight",
            Self::PrevHighlight => "prev_highlight",
            Self::Quit => "quit",
        }
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

const STANDARD_BINDINGS: &[(KeyCode, Modifiers, Action)] = &[
    (KeyCode::Left, Modifiers::NONE, Action::MoveLeft),
    (KeyCode::Char('h'), Modifiers::NONE, Action::MoveLeft),
    (KeyCode::Right, Modifiers::NONE, Action::MoveRight),
    (KeyCode::Char('l'), Modifiers::NONE, Action::MoveRight),
    (KeyCode::Up, Modifiers::NONE, Action::MoveUp),
    (KeyCode::Char('k'), Modifiers::NONE, Action::MoveUp),
    (KeyCode::Down, Modifiers::NONE, Action::MoveDown),
    (KeyCode::Char('j'), Modifiers::NONE, Action::MoveDown),
    (KeyCode::Char('r'), Modifiers::NONE, Action::ClearFocus),
    (KeyCode::Char('R'), Modifiers::NONE, Action::Rebuild),
    (KeyCode::Char('f'), Modifiers::NONE, Action::Focus),
    (KeyCode::Char('F'), Modifiers::NONE, Action::HardFocus),
    (KeyCode::Char('p'), Modifiers::NONE, Action::Pin),
    (KeyCode::Char('x'), Modifiers::NONE, Action::Exclude),
    (KeyCode::Char('I'), Modifiers::NONE, Action::ToggleInversion),
    (KeyCode::Char('/'), Modifiers::NONE, Action::Search),
    (KeyCode::Char('n'), Modifiers::NONE, Action::NextHighlight),
    (KeyCode::Char('N'), Modifiers::NONE, Action::PrevHighlight),
    (KeyCode::Char('q'), Modifiers::NONE, Action::Quit),
    (KeyCode::Char('c'), Modifiers::CTRL, Action::Quit),
];

/// Maps key presses to actions.
///
/// Shift is ignored for character keys since the character already carries
/// its case; `R` and `Shift+R` resolve the same.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    bindings: FxHashMap<(KeyCode, Modifiers), Action>,
}

impl KeyMap {
    /// The default viewer bindings.
    #[must_use]
    pub fn standard() -> Self {
        let mut map = Self::default();
        for &(code, modifiers, action) in STANDARD_BINDINGS {
            map.bind(code, modifiers, action);
        }
        map
    }

    /// Add or replace a binding.
    pub fn bind(&mut self, code: KeyCode, modifiers: Modifiers, action: Action) {
        self.bindings.insert(normalize(code, modifiers), action);
    }

    /// Resolve a key event. Releases never resolve.
    #[must_use]
    pub fn resolve(&self, event: &KeyEvent) -> Option<Action> {
        if !event.is_press() {
            return None;
        }
        self.bindings
            .get(&normalize(event.code, event.modifiers))
            .copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn normalize(code: KeyCode, modifiers: Modifiers) -> (KeyCode, Modifiers) {
    match code {
        KeyCode::Char(_) => (code, modifiers - Modifiers::SHIFT),
        _ => (code, modifiers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyEventKind;

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c))
    }

    #[test]
    fn standard_table_covers_the_keymap() {
        let map = KeyMap::standard();
        let cases = [
            ('h', Action::MoveLeft),
            ('l', Action::MoveRight),
            ('k', Action::MoveUp),
            ('j', Action::MoveDown),
            ('r', Action::ClearFocus),
            ('R', Action::Rebuild),
            ('f', Action::Focus),
            ('F', Action::HardFocus),
            ('p', Action::Pin),
            ('x', Action::Exclude),
            ('I', Action::ToggleInversion),
            ('/', Action::Search),
            ('n', Action::NextHighlight),
            ('N', Action::PrevHighlight),
            ('q', Action::Quit),
        ];
        for (c, action) in cases {
            assert_eq!(map.resolve(&press(c)), Some(action), "key {c:?}");
        }
        assert_eq!(map.resolve(&KeyEvent::new(KeyCode::Left)), Some(Action::MoveLeft));
        assert_eq!(map.resolve(&KeyEvent::new(KeyCode::Down)), Some(Action::MoveDown));
    }

    #[test]
    fn shift_is_ignored_for_characters() {
        let map = KeyMap::standard();
        let shifted = press('R').with_modifiers(Modifiers::SHIFT);
        assert_eq!(map.resolve(&shifted), Some(Action::Rebuild));
    }

    #[test]
    fn ctrl_c_quits_but_plain_c_does_nothing() {
        let map = KeyMap::standard();
        let ctrl_c = press('c').with_modifiers(Modifiers::CTRL);
        assert_eq!(map.resolve(&ctrl_c), Some(Action::Quit));
        assert_eq!(map.resolve(&press('c')), None);
    }

    #[test]
    fn releases_do_not_resolve() {
        let map = KeyMap::standard();
        let release = press('q').with_kind(KeyEventKind::Release);
        assert_eq!(map.resolve(&release), None);
        let repeat = press('l').with_kind(KeyEventKind::Repeat);
        assert_eq!(map.resolve(&repeat), Some(Action::MoveRight));
    }

    #[test]
    fn bindings_can_be_replaced() {
        let mut map = KeyMap::standard();
        let before = map.len();
        map.bind(KeyCode::Char('q'), Modifiers::NONE, Action::Search);
        assert_eq!(map.len(), before);
        assert_eq!(map.resolve(&press('q')), Some(Action::Search));
        assert!(KeyMap::default().is_empty());
    }

    #[test]
    fn action_names() {
        assert_eq!(Action::Exclude.name(), "exclude");
        assert_eq!(Action::HardFocus.name(), "hard_focus");
    }
}
