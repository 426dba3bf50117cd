#![forbid(unsafe_code)]

//! Terminal side of fcl.
//!
//! - [`session::TerminalSession`]: raw mode, alternate screen, and mouse
//!   reporting, restored on drop, panic, or termination signal.
//! - [`input::from_crossterm`]: crossterm events to `fcl_core` events.
//! - [`painter::Painter`]: draws bands and the status panel.
//! - [`theme::Theme`]: color depth detection and palettes.

pub mod input;
pub mod painter;
pub mod session;
pub mod theme;

pub use painter::Painter;
pub use session::{SessionOptions, TerminalSession};
pub use theme::{ColorDepth, Theme};
