#![forbid(unsafe_code)]

//! The interactive loop.
//!
//! [`App`] is pure state: it turns canonical events into navigator calls and
//! tells the loop whether to repaint. [`run`] owns the terminal.

use std::io;
use std::time::Instant;

use fcl_core::event::{Event, KeyCode, KeyEvent};
use fcl_core::gesture::{ClickConfig, ClickTracker, Gesture};
use fcl_core::{Action, Dispatch, KeyMap, Navigator, StackRecord};
use fcl_tty::{ColorDepth, Painter, SessionOptions, TerminalSession, Theme};
use tracing::{debug, info};

use crate::config::ViewerConfig;
use crate::error::Result;

/// Input mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    /// Typing a search query.
    Search(String),
}

/// What the loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Redraw,
    Quit,
}

#[derive(Debug)]
pub struct App {
    nav: Navigator,
    keymap: KeyMap,
    clicks: ClickTracker,
    mode: Mode,
    message: Option<String>,
}

impl App {
    #[must_use]
    pub fn new(nav: Navigator, clicks: ClickConfig) -> Self {
        Self {
            nav,
            keymap: KeyMap::standard(),
            clicks: ClickTracker::new(clicks),
            mode: Mode::Browse,
            message: None,
        }
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    #[must_use]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Text for the bottom status row: the search prompt, or the last
    /// message.
    #[must_use]
    pub fn bottom_line(&self) -> Option<String> {
        match &self.mode {
            Mode::Search(query) => Some(format!("/{query}")),
            Mode::Browse => self.message.clone(),
        }
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) -> Control {
        let gesture = self.clicks.process(event, now);
        match event {
            Event::Resize { width, height } => {
                self.nav.resize(*width, *height);
                Control::Redraw
            }
            Event::Key(key) if key.is_press() => {
                if matches!(self.mode, Mode::Search(_)) {
                    self.search_key(key)
                } else {
                    self.browse_key(key)
                }
            }
            Event::Mouse(_) if self.mode == Mode::Browse => match gesture {
                Some(Gesture::Click { x, y }) => redraw_if(self.nav.select_at(x, y)),
                Some(Gesture::DoubleClick { x, y }) => redraw_if(self.nav.focus_at(x, y)),
                None => Control::Continue,
            },
            _ => Control::Continue,
        }
    }

    fn browse_key(&mut self, key: &KeyEvent) -> Control {
        let had_message = self.message.take().is_some();
        let Some(action) = self.keymap.resolve(key) else {
            return redraw_if(had_message);
        };
        match self.nav.dispatch(action) {
            Dispatch::Redraw => Control::Redraw,
            Dispatch::Ignored => redraw_if(had_message),
            Dispatch::PromptSearch => {
                self.mode = Mode::Search(String::new());
                Control::Redraw
            }
            Dispatch::Quit => Control::Quit,
        }
    }

    fn search_key(&mut self, key: &KeyEvent) -> Control {
        if key.ctrl() && self.keymap.resolve(key) == Some(Action::Quit) {
            return Control::Quit;
        }
        let Mode::Search(query) = &mut self.mode else {
            return Control::Continue;
        };
        match key.code {
            KeyCode::Escape => {
                self.mode = Mode::Browse;
            }
            KeyCode::Enter => {
                let query = std::mem::take(query);
                self.mode = Mode::Browse;
                if !query.is_empty() && !self.nav.search(&query) {
                    debug!(%query, "search found nothing");
                    self.message = Some(format!("not found: {query}"));
                }
            }
            KeyCode::Backspace => {
                query.pop();
            }
            KeyCode::Char(c) if !key.ctrl() && !key.alt() => query.push(c),
            _ => return Control::Continue,
        }
        Control::Redraw
    }
}

fn redraw_if(changed: bool) -> Control {
    if changed {
        Control::Redraw
    } else {
        Control::Continue
    }
}

/// Take over the terminal and browse `records` until the user quits.
pub fn run(config: &ViewerConfig, records: Vec<StackRecord>) -> Result<()> {
    let layout = config.layout_engine()?;
    let depth = config.colors.resolve(ColorDepth::detect);
    info!(
        depth = depth.as_str(),
        min_width = config.min_width,
        invert = config.invert,
        "starting viewer"
    );

    let session = TerminalSession::new(SessionOptions {
        alternate_screen: true,
        mouse_capture: config.mouse,
    })?;
    let (width, height) = session.size()?;
    let nav = Navigator::new(records, layout, width, height).with_inversion(config.invert);
    let mut app = App::new(nav, config.click_config());
    let mut painter = Painter::new(io::stdout(), Theme::new(depth));

    painter.paint(app.navigator(), app.bottom_line().as_deref())?;
    loop {
        let Some(event) = session.read_event()? else {
            continue;
        };
        match app.handle_event(&event, Instant::now()) {
            Control::Continue => {}
            Control::Redraw => painter.paint(app.navigator(), app.bottom_line().as_deref())?,
            Control::Quit => break,
        }
    }
    info!("viewer closed");
    Ok(())
}
