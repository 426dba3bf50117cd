#![forbid(unsafe_code)]

//! Draws the chart and status panel.
//!
//! The painter is generic over its writer so that tests can render into a
//! `Vec<u8>` and inspect the escape stream.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{
    Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate};
use crossterm::queue;
use fcl_core::label::{self, Emphasis, fit_to_width};
use fcl_core::{Band, Navigator};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Renders [`Navigator`] state to a terminal writer.
#[derive(Debug)]
pub struct Painter<W: Write> {
    out: W,
    theme: Theme,
}

impl<W: Write> Painter<W> {
    #[must_use]
    pub fn new(out: W, theme: Theme) -> Self {
        Self { out, theme }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Repaint everything.
    ///
    /// `bottom_line` (a search prompt or a message) replaces the last status
    /// line and hides the excluded-samples warning.
    pub fn paint(&mut self, nav: &Navigator, bottom_line: Option<&str>) -> io::Result<()> {
        let (width, height) = nav.size();
        queue!(self.out, BeginSynchronizedUpdate, Clear(ClearType::All))?;

        if width > 0 && height > 0 {
            for (i, band) in nav.bands().iter().enumerate() {
                self.draw_band(nav, band, nav.emphasis(i))?;
            }
            self.draw_status(nav, width, height, bottom_line)?;
        }

        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()
    }

    fn draw_band(&mut self, nav: &Navigator, band: &Band, emphasis: Emphasis) -> io::Result<()> {
        let class = label::color_class(nav.frames(), band, self.theme.class_count());
        queue!(self.out, MoveTo(band.x, band.y))?;
        if let Some(bg) = self.theme.background(class) {
            queue!(self.out, SetBackgroundColor(bg))?;
        }
        if let Some(fg) = self.theme.foreground() {
            queue!(self.out, SetForegroundColor(fg))?;
        }
        match emphasis {
            Emphasis::Normal => {}
            Emphasis::Selected => queue!(self.out, SetAttribute(Attribute::Reverse))?,
            Emphasis::Highlighted => queue!(
                self.out,
                SetAttribute(Attribute::Bold),
                SetAttribute(Attribute::Underlined)
            )?,
        }
        queue!(
            self.out,
            Print(label::band_label(nav.frames(), band)),
            SetAttribute(Attribute::Reset),
            ResetColor
        )
    }

    fn draw_status(
        &mut self,
        nav: &Navigator,
        width: u16,
        height: u16,
        bottom_line: Option<&str>,
    ) -> io::Result<()> {
        // The last column is left alone so writing a full line never scrolls.
        let usable = usize::from(width.saturating_sub(1));
        let lines = nav.status_lines();
        let first_row = height.saturating_sub(u16::try_from(lines.len()).unwrap_or(height));
        for (row, line) in (first_row..height).zip(&lines) {
            queue!(self.out, MoveTo(0, row), Print(fit_to_width(line, usable, ' ')))?;
        }

        let last_row = height - 1;
        if let Some(text) = bottom_line {
            return queue!(
                self.out,
                MoveTo(0, last_row),
                Print(fit_to_width(text, usable, ' '))
            );
        }

        if let Some(warning) = nav.excluded_warning() {
            let shown = tail_to_width(&warning, usable);
            let column = usable - shown.width();
            queue!(
                self.out,
                MoveTo(u16::try_from(column).unwrap_or(0), last_row),
                SetAttribute(Attribute::Bold),
                Print(shown),
                SetAttribute(Attribute::Reset)
            )?;
        }
        Ok(())
    }
}

/// The longest suffix of `text` that fits in `width` columns.
fn tail_to_width(text: &str, width: usize) -> &str {
    let mut start = text.len();
    let mut used = 0;
    for (idx, ch) in text.char_indices().rev() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    &text[start..]
}
