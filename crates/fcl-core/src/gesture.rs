#![forbid(unsafe_code)]

//! Click recognition: turns left-button down/up pairs into clicks and
//! double-clicks.
//!
//! Terminals report presses and releases only, so multiplicity is derived
//! from timing and position here.
//!
//! # Invariants
//!
//! 1. A gesture is emitted on release, never on press.
//! 2. A release without a preceding press on the same button emits nothing.
//! 3. A double-click resets the count: a third quick click is a single click.

use std::time::{Duration, Instant};

use crate::event::{Event, MouseButton, MouseEventKind};

/// Thresholds for click recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickConfig {
    /// Window between two releases for a double-click (default: 300ms).
    pub multi_click_timeout: Duration,
    /// Position tolerance for multi-click detection (manhattan distance, default: 1).
    pub click_tolerance: u16,
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            multi_click_timeout: Duration::from_millis(300),
            click_tolerance: 1,
        }
    }
}

/// Recognized mouse gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Click { x: u16, y: u16 },
    DoubleClick { x: u16, y: u16 },
}

#[derive(Debug, Clone, Copy)]
struct LastClick {
    x: u16,
    y: u16,
    time: Instant,
}

/// Stateful click recognizer. Feed it every event.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    config: ClickConfig,
    pressed: bool,
    last_click: Option<LastClick>,
}

impl ClickTracker {
    #[must_use]
    pub fn new(config: ClickConfig) -> Self {
        Self {
            config,
            pressed: false,
            last_click: None,
        }
    }

    /// Process one event; returns a gesture when a left click completes.
    pub fn process(&mut self, event: &Event, now: Instant) -> Option<Gesture> {
        let Event::Mouse(mouse) = event else {
            if matches!(event, Event::Focus(false)) {
                self.reset();
            }
            return None;
        };
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pressed = true;
                None
            }
            MouseEventKind::Up(MouseButton::Left) if self.pressed => {
                self.pressed = false;
                Some(self.on_release(mouse.x, mouse.y, now))
            }
            _ => None,
        }
    }

    /// Forget any pending press and click history.
    pub fn reset(&mut self) {
        self.pressed = false;
        self.last_click = None;
    }

    fn on_release(&mut self, x: u16, y: u16, now: Instant) -> Gesture {
        let repeat = self.last_click.is_some_and(|last| {
            manhattan(last.x, last.y, x, y) <= u32::from(self.config.click_tolerance)
                && now.duration_since(last.time) <= self.config.multi_click_timeout
        });
        if repeat {
            self.last_click = None;
            Gesture::DoubleClick { x, y }
        } else {
            self.last_click = Some(LastClick { x, y, time: now });
            Gesture::Click { x, y }
        }
    }
}

fn manhattan(ax: u16, ay: u16, bx: u16, by: u16) -> u32 {
    u32::from(ax.abs_diff(bx)) + u32::from(ay.abs_diff(by))
}
