#![forbid(unsafe_code)]

//! Vertical space allocation between the chart and the status panel.

use crate::frame::FrameSet;
use crate::layout::Band;

/// Rows given to the chart (top) and the status panel (bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerticalSplit {
    pub chart_rows: u16,
    pub status_rows: u16,
}

impl VerticalSplit {
    #[inline]
    #[must_use]
    pub const fn new(chart_rows: u16, status_rows: u16) -> Self {
        Self {
            chart_rows,
            status_rows,
        }
    }
}

/// Split `total_height` rows.
///
/// The chart wants one row per band row; the status panel wants room for the
/// largest aggregate breakdown plus a header. When both do not fit, the
/// chart wins as long as one status row remains.
#[must_use]
pub fn allocate(bands: &[Band], total_height: u16) -> VerticalSplit {
    match total_height {
        0 => return VerticalSplit::new(0, 0),
        1 => return VerticalSplit::new(1, 0),
        _ => {}
    }
    if bands.is_empty() {
        return VerticalSplit::new(total_height - 1, 1);
    }

    let chart_need = bands
        .iter()
        .map(|b| u32::from(b.y) + 1)
        .max()
        .unwrap_or(1);
    let status_need = bands
        .iter()
        .map(|b| b.frame_count())
        .max()
        .map_or(1, |n| u32::try_from(n).unwrap_or(u32::MAX).saturating_add(1));
    let height = u32::from(total_height);

    if chart_need.saturating_add(status_need) <= height {
        // Both fit, so both are below u16::MAX.
        VerticalSplit::new(chart_need as u16, status_need as u16)
    } else if chart_need + 1 <= height {
        VerticalSplit::new(chart_need as u16, (height - chart_need) as u16)
    } else {
        VerticalSplit::new(total_height - 1, 1)
    }
}

/// Drop bands that fall below the chart area.
///
/// Bands left on the last visible row whose frames still have children are
/// marked truncated. The tree is untouched.
pub fn fit_bands(set: &FrameSet, bands: &mut Vec<Band>, chart_rows: u16) {
    let before = bands.len();
    bands.retain(|band| band.y < chart_rows);
    if bands.len() == before {
        return;
    }
    let last_row = chart_rows.saturating_sub(1);
    for band in bands.iter_mut().filter(|b| b.y == last_row) {
        if band
            .frames()
            .iter()
            .any(|&id| !set.frame(id).children().is_empty())
        {
            band.truncated = true;
        }
    }
    tracing::debug!(dropped = before - bands.len(), chart_rows, "bands clipped to chart area");
}
