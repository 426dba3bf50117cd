#![forbid(unsafe_code)]

//! Core: call-tree model, proportional layout, and navigation state.
//!
//! # Role in fcl
//! `fcl-core` owns everything that does not touch the terminal. It turns
//! folded stack records into a weighted call tree, projects that tree onto a
//! bounded character grid, and tracks what the user is looking at.
//!
//! # Primary responsibilities
//! - **StackRecord**: parsing of `frame1;frame2;... count` lines.
//! - **FrameSet**: arena of [`Frame`]s with exact sample accounting, plus the
//!   destructive exclude and merge-by-title mutations.
//! - **LayoutEngine**: recursive proportional layout into [`Band`]s, with
//!   aggregation of siblings that are too narrow to draw.
//! - **ViewIndex**: row-major spatial index over bands and row adjacency.
//! - **Navigator**: selection, highlight set, focus, pin, inversion, search.
//! - **KeyMap** / **ClickTracker**: declarative input-to-action mapping.
//!
//! # How it fits in the system
//! `fcl-tty` paints the bands and status lines this crate produces and feeds
//! canonical [`event::Event`]s back in. The `fcl` binary wires the two
//! together in a single-threaded loop.

pub mod error;
pub mod event;
pub mod frame;
pub mod gesture;
pub mod keymap;
pub mod label;
pub mod layout;
pub mod mutate;
pub mod navigation;
pub mod record;
pub mod status;
pub mod view_index;
pub mod vspace;

pub use error::IngestError;
pub use frame::{Frame, FrameId, FrameSet};
pub use keymap::{Action, KeyMap};
pub use layout::{Band, LayoutEngine, MinWidthPolicy};
pub use navigation::{Dispatch, Navigator};
pub use record::StackRecord;
pub use view_index::ViewIndex;
pub use vspace::VerticalSplit;
