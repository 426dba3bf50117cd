#![forbid(unsafe_code)]

//! Folded stack records.
//!
//! One record per input line: `frame1;frame2;...;frameN count`. The line is
//! split on the *last* space because frame titles may contain spaces. Frames
//! are ordered outermost caller first.

use std::io::BufRead;

use crate::error::IngestError;

/// A full call path and the number of samples observed for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackRecord {
    /// Frame titles, outermost caller first.
    pub frames: Vec<String>,
    /// Sample count.
    pub count: u64,
}

impl StackRecord {
    /// Create a record from any iterator of titles.
    pub fn new<I, S>(frames: I, count: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            frames: frames.into_iter().map(Into::into).collect(),
            count,
        }
    }

    /// Parse a single line. Blank lines yield `Ok(None)`.
    ///
    /// `line_no` is 1-based and only used for error reporting.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Self>, IngestError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let Some((path, count)) = trimmed.rsplit_once(' ') else {
            return Err(IngestError::MissingSeparator {
                line: line_no,
                text: trimmed.to_owned(),
            });
        };

        let count = count
            .parse::<u64>()
            .map_err(|_| IngestError::InvalidCount {
                line: line_no,
                count: count.to_owned(),
                text: trimmed.to_owned(),
            })?;

        Ok(Some(Self::new(path.split(';'), count)))
    }

    /// The same record with caller/callee order reversed.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            frames: self.frames.iter().rev().cloned().collect(),
            count: self.count,
        }
    }
}

/// Read every record from a buffered reader.
///
/// Fails on the first malformed line, or on the line that pushes the total
/// sample count past `u64::MAX`.
pub fn parse_folded<R: BufRead>(reader: R) -> Result<Vec<StackRecord>, IngestError> {
    let mut records = Vec::new();
    let mut total: u64 = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(record) = StackRecord::parse_line(&line, idx + 1)? {
            total = total
                .checked_add(record.count)
                .ok_or_else(|| IngestError::CountOverflow {
                    line: idx + 1,
                    text: line.trim().to_owned(),
                })?;
            records.push(record);
        }
    }
    tracing::debug!(records = records.len(), total, "folded stacks parsed");
    Ok(records)
}

/// Parse folded stacks from an in-memory string.
pub fn parse_folded_str(input: &str) -> Result<Vec<StackRecord>, IngestError> {
    parse_folded(input.as_bytes())
}

/// Reverse every record so leaf functions become roots.
#[must_use]
pub fn invert(records: &[StackRecord]) -> Vec<StackRecord> {
    records.iter().map(StackRecord::reversed).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_last_space() {
        let rec = StackRecord::parse_line("main;operator new (long);foo 42", 1)
            .unwrap()
            .unwrap();
        assert_eq!(rec.frames, vec!["main", "operator new (long)", "foo"]);
        assert_eq!(rec.count, 42);
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(StackRecord::parse_line("   ", 3).unwrap(), None);
        let recs = parse_folded_str("a;b 1\n\n\na 2\n").unwrap();
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn missing_separator_reports_line() {
        let err = parse_folded_str("a;b 1\nnocount\n").unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingSeparator { line: 2, ref text } if text == "nocount"
        ));
    }

    #[test]
    fn non_numeric_count_is_rejected() {
        let err = parse_folded_str("a;b x1").unwrap_err();
        assert!(matches!(err, IngestError::InvalidCount { line: 1, ref count, .. } if count == "x1"));

        let err = parse_folded_str("a;b -3").unwrap_err();
        assert!(matches!(err, IngestError::InvalidCount { .. }));
    }

    #[test]
    fn total_overflow_is_rejected_at_the_offending_line() {
        let err = parse_folded_str("a 18446744073709551615\n\nb 1\n").unwrap_err();
        assert!(matches!(
            err,
            IngestError::CountOverflow { line: 3, ref text } if text == "b 1"
        ));

        let max = parse_folded_str("a 18446744073709551614\nb 1\n").unwrap();
        assert_eq!(max.iter().map(|r| r.count).sum::<u64>(), u64::MAX);
    }

    #[test]
    fn titles_keep_inner_spacing() {
        let rec = StackRecord::parse_line("  ; 4", 9).unwrap().unwrap();
        assert_eq!(rec.frames, vec!["", ""]);

        let rec = StackRecord::parse_line("a  4", 1).unwrap().unwrap();
        assert_eq!(rec.frames, vec!["a "]);
    }

    #[test]
    fn trailing_carriage_return_is_ignored() {
        let rec = StackRecord::parse_line("a;b 7\r", 1).unwrap().unwrap();
        assert_eq!(rec.count, 7);
    }

    #[test]
    fn reversed_flips_order() {
        let rec = StackRecord::new(["main", "foo", "bar"], 5);
        let rev = rec.reversed();
        assert_eq!(rev.frames, vec!["bar", "foo", "main"]);
        assert_eq!(rev.count, 5);
        assert_eq!(invert(&[rec.clone()]), vec![rev]);
    }
}
