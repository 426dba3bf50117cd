#![forbid(unsafe_code)]

//! RAII terminal session.
//!
//! Creating a [`TerminalSession`] enters raw mode and the requested modes;
//! dropping it restores the terminal in reverse order. A panic hook and a
//! termination-signal guard run the same restoration on paths that skip
//! `Drop`.
//!
//! Only one session may exist at a time.

use std::io::{self, Write};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use fcl_core::event::Event;

use crate::input;

const MOUSE_ENABLE_SEQ: &[u8] = b"\x1b[?1000h\x1b[?1002h\x1b[?1006h";
const MOUSE_DISABLE_SEQ: &[u8] = b"\x1b[?1000l\x1b[?1002l\x1b[?1006l";

static TERMINAL_SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
struct SessionLock;

impl SessionLock {
    fn acquire() -> io::Result<Self> {
        if TERMINAL_SESSION_ACTIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(io::Error::other("TerminalSession already active"));
        }
        Ok(Self)
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        TERMINAL_SESSION_ACTIVE.store(false, Ordering::SeqCst);
    }
}

#[cfg(unix)]
use signal_hook::consts::signal::{SIGHUP, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Which terminal modes to enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Draw on the alternate screen, leaving scrollback untouched.
    pub alternate_screen: bool,
    /// Report mouse presses and releases (SGR encoding).
    pub mouse_capture: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            mouse_capture: true,
        }
    }
}

/// Owns raw mode and the enabled terminal modes.
#[derive(Debug)]
pub struct TerminalSession {
    session_lock: Option<SessionLock>,
    alternate_screen_enabled: bool,
    mouse_enabled: bool,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode and enable the requested modes.
    ///
    /// # Errors
    ///
    /// Returns an error if another session is active or the terminal cannot
    /// be configured.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();

        let session_lock = SessionLock::acquire()?;

        // The signal guard comes first so that a failure here does not
        // leave the terminal in raw mode.
        #[cfg(unix)]
        let signal_guard = Some(SignalGuard::new()?);

        crossterm::terminal::enable_raw_mode()?;
        tracing::info!("terminal raw mode enabled");

        let mut session = Self {
            session_lock: Some(session_lock),
            alternate_screen_enabled: false,
            mouse_enabled: false,
            #[cfg(unix)]
            signal_guard,
        };

        let mut stdout = io::stdout();

        if options.alternate_screen {
            crossterm::execute!(
                stdout,
                crossterm::terminal::EnterAlternateScreen,
                crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
                crossterm::cursor::MoveTo(0, 0)
            )?;
            session.alternate_screen_enabled = true;
            tracing::info!("alternate screen enabled");
        }

        crossterm::execute!(stdout, crossterm::cursor::Hide)?;

        if options.mouse_capture {
            stdout.write_all(MOUSE_ENABLE_SEQ)?;
            stdout.flush()?;
            session.mouse_enabled = true;
            tracing::info!("mouse capture enabled");
        }

        Ok(session)
    }

    /// Current terminal size (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    /// Block until the next event the viewer understands.
    ///
    /// Returns `Ok(None)` for events with no canonical form.
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        let event = crossterm::event::read()?;
        Ok(input::from_crossterm(event))
    }

    fn cleanup(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        let mut stdout = io::stdout();

        if self.mouse_enabled {
            let _ = stdout.write_all(MOUSE_DISABLE_SEQ);
            self.mouse_enabled = false;
            tracing::info!("mouse capture disabled");
        }

        let _ = crossterm::execute!(stdout, crossterm::cursor::Show);

        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
            tracing::info!("alternate screen disabled");
        }

        // Raw mode goes last.
        let _ = crossterm::terminal::disable_raw_mode();
        tracing::info!("terminal raw mode disabled");

        let _ = stdout.flush();

        let _ = self.session_lock.take();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(MOUSE_DISABLE_SEQ);
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

/// Restores the terminal and exits when the process is told to terminate.
///
/// Ctrl+C arrives as a key event in raw mode, so SIGINT is not watched.
#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGTERM, SIGHUP]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::warn!(signal, "termination signal received, cleaning up");
                best_effort_cleanup();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_full_screen() {
        let opts = SessionOptions::default();
        assert!(opts.alternate_screen);
        assert!(opts.mouse_capture);
    }

    #[test]
    fn mouse_sequences_are_paired() {
        assert_eq!(MOUSE_ENABLE_SEQ.len(), MOUSE_DISABLE_SEQ.len());
        let enable = String::from_utf8_lossy(MOUSE_ENABLE_SEQ).replace('h', "l");
        assert_eq!(enable.as_bytes(), MOUSE_DISABLE_SEQ);
    }

    #[test]
    fn session_lock_is_exclusive() {
        let first = SessionLock::acquire().expect("first lock");
        assert!(SessionLock::acquire().is_err());
        drop(first);
        let again = SessionLock::acquire().expect("lock after release");
        drop(again);
    }
}
