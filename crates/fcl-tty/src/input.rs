#![forbid(unsafe_code)]

//! Crossterm event mapping.
//!
//! Everything the viewer cannot act on maps to `None`.

use crossterm::event as cte;
use fcl_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};

/// Convert a crossterm event into a canonical event.
#[must_use]
pub fn from_crossterm(event: cte::Event) -> Option<Event> {
    match event {
        cte::Event::Key(key) => Some(Event::Key(map_key(key))),
        cte::Event::Mouse(mouse) => map_mouse(mouse).map(Event::Mouse),
        cte::Event::Resize(width, height) => Some(Event::Resize { width, height }),
        cte::Event::FocusGained => Some(Event::Focus(true)),
        cte::Event::FocusLost => Some(Event::Focus(false)),
        _ => None,
    }
}

fn map_key(key: cte::KeyEvent) -> KeyEvent {
    let code = match key.code {
        cte::KeyCode::Char(c) => KeyCode::Char(c),
        cte::KeyCode::Enter => KeyCode::Enter,
        cte::KeyCode::Esc => KeyCode::Escape,
        cte::KeyCode::Backspace => KeyCode::Backspace,
        cte::KeyCode::Tab => KeyCode::Tab,
        cte::KeyCode::Delete => KeyCode::Delete,
        cte::KeyCode::Home => KeyCode::Home,
        cte::KeyCode::End => KeyCode::End,
        cte::KeyCode::PageUp => KeyCode::PageUp,
        cte::KeyCode::PageDown => KeyCode::PageDown,
        cte::KeyCode::Up => KeyCode::Up,
        cte::KeyCode::Down => KeyCode::Down,
        cte::KeyCode::Left => KeyCode::Left,
        cte::KeyCode::Right => KeyCode::Right,
        cte::KeyCode::F(n) => KeyCode::F(n),
        _ => KeyCode::Other,
    };
    let kind = match key.kind {
        cte::KeyEventKind::Press => KeyEventKind::Press,
        cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
        cte::KeyEventKind::Release => KeyEventKind::Release,
    };
    KeyEvent::new(code)
        .with_modifiers(map_modifiers(key.modifiers))
        .with_kind(kind)
}

fn map_mouse(mouse: cte::MouseEvent) -> Option<MouseEvent> {
    let kind = match mouse.kind {
        cte::MouseEventKind::Down(button) => MouseEventKind::Down(map_button(button)),
        cte::MouseEventKind::Up(button) => MouseEventKind::Up(map_button(button)),
        cte::MouseEventKind::Drag(button) => MouseEventKind::Drag(map_button(button)),
        cte::MouseEventKind::Moved => MouseEventKind::Moved,
        cte::MouseEventKind::ScrollUp => MouseEventKind::ScrollUp,
        cte::MouseEventKind::ScrollDown => MouseEventKind::ScrollDown,
        _ => return None,
    };
    Some(
        MouseEvent::new(kind, mouse.column, mouse.row)
            .with_modifiers(map_modifiers(mouse.modifiers)),
    )
}

fn map_button(button: cte::MouseButton) -> MouseButton {
    match button {
        cte::MouseButton::Left => MouseButton::Left,
        cte::MouseButton::Right => MouseButton::Right,
        cte::MouseButton::Middle => MouseButton::Middle,
    }
}

fn map_modifiers(modifiers: cte::KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if modifiers.contains(cte::KeyModifiers::SHIFT) {
        out |= Modifiers::SHIFT;
    }
    if modifiers.contains(cte::KeyModifiers::ALT) {
        out |= Modifiers::ALT;
    }
    if modifiers.contains(cte::KeyModifiers::CONTROL) {
        out |= Modifiers::CTRL;
    }
    if modifiers.contains(cte::KeyModifiers::SUPER) {
        out |= Modifiers::SUPER;
    }
    out
}
