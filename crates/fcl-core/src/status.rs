#![forbid(unsafe_code)]

//! Status panel text.

use crate::frame::FrameSet;
use crate::layout::Band;

/// Percentage of `part` in `total`, 0 when `total` is 0.
#[must_use]
pub fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

/// Describe a band in at most `height` lines.
///
/// `total` should be the original ingested total (remaining plus excluded)
/// so percentages stay comparable across exclusions. `selection_total` is
/// the cross-tree sample count for the selected title; it is appended when
/// it differs from the band's own count.
#[must_use]
pub fn band_status(
    set: &FrameSet,
    band: &Band,
    total: u64,
    height: u16,
    selection_total: Option<u64>,
) -> Vec<String> {
    if height == 0 {
        return Vec::new();
    }

    if let Some(id) = band.single_frame() {
        let frame = set.frame(id);
        let mut line = format!(
            "{} ({} samples, {:.2}%)",
            frame.title(),
            frame.samples(),
            percent(frame.samples(), total)
        );
        if let Some(across) = selection_total
            && across != frame.samples()
        {
            line.push_str(&format!(
                " | {across} samples, {:.2}% in selection",
                percent(across, total)
            ));
        }
        return vec![line];
    }

    let mut lines = vec![format!(
        "Aggregated {} frames (total {} samples, {:.2}%)",
        band.frame_count(),
        band.samples,
        percent(band.samples, total)
    )];
    if height == 1 {
        return lines;
    }

    let details: Vec<String> = band
        .frames()
        .iter()
        .map(|&id| {
            let frame = set.frame(id);
            format!(
                "  {} ({} samples, {:.2}%)",
                frame.title(),
                frame.samples(),
                percent(frame.samples(), total)
            )
        })
        .collect();

    let height = usize::from(height);
    if details.len() + 1 <= height {
        lines.extend(details);
    } else {
        let fits = height - 2;
        let hidden = details.len() - fits;
        lines.extend(details.into_iter().take(fits));
        lines.push(format!("and {hidden} more"));
    }
    lines
}

/// Warning shown while any samples are excluded.
#[must_use]
pub fn excluded_warning(set: &FrameSet) -> Option<String> {
    let excluded = set.total_excluded();
    (excluded > 0).then(|| {
        format!(
            "{:.2}% samples excluded",
            percent(excluded, set.original_total())
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutEngine;
    use crate::record::StackRecord;

    fn set(lines: &[(&str, u64)]) -> FrameSet {
        let records: Vec<StackRecord> = lines
            .iter()
            .map(|(path, count)| StackRecord::new(path.split(';'), *count))
            .collect();
        FrameSet::build(&records)
    }

    #[test]
    fn single_frame_line() {
        let s = set(&[("main", 3), ("other", 1)]);
        let band = Band::single(0, 0, 10, s.roots()[0], 3);
        assert_eq!(
            band_status(&s, &band, 4, 5, None),
            vec!["main (3 samples, 75.00%)"]
        );
        assert_eq!(
            band_status(&s, &band, 4, 5, Some(3)),
            vec!["main (3 samples, 75.00%)"]
        );
        assert!(band_status(&s, &band, 4, 0, None).is_empty());
    }

    #[test]
    fn selection_total_is_appended_when_different() {
        let s = set(&[("a;f", 1), ("b;f", 3)]);
        let a = s.roots()[0];
        let f = s.frame(a).children()[0];
        let band = Band::single(0, 1, 5, f, 1);
        assert_eq!(
            band_status(&s, &band, 4, 1, Some(4)),
            vec!["f (1 samples, 25.00%) | 4 samples, 100.00% in selection"]
        );
    }

    #[test]
    fn aggregate_breakdown_truncates() {
        let s = set(&[("a", 1000), ("b", 3), ("c", 2), ("d", 1)]);
        let bands = LayoutEngine::default().frame_views(&s, 10, None, None);
        let pooled = bands.iter().find(|b| b.is_aggregate()).unwrap();

        let full = band_status(&s, pooled, 1006, 10, None);
        assert_eq!(full.len(), 4);
        assert!(full[0].starts_with("Aggregated 3 frames (total 6 samples"));
        assert!(full[1].starts_with("  b (3 samples"));

        let short = band_status(&s, pooled, 1006, 3, None);
        assert_eq!(short.len(), 3);
        assert!(short[1].starts_with("  b "));
        assert_eq!(short[2], "and 2 more");

        assert_eq!(band_status(&s, pooled, 1006, 1, None).len(), 1);
    }

    #[test]
    fn warning_only_after_exclusion() {
        let mut s = set(&[("a", 3), ("b", 1)]);
        assert_eq!(excluded_warning(&s), None);
        let b = s.roots()[1];
        s.exclude(&[b]);
        assert_eq!(excluded_warning(&s).as_deref(), Some("25.00% samples excluded"));
    }

    #[test]
    fn zero_total_is_safe() {
        assert_eq!(percent(5, 0), 0.0);
    }
}
