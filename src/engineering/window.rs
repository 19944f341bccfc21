//! Modelling window.

use std::ops::Range;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::error::FeatureError;

/// Resolved modelling window over a sorted date axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowInfo {
    /// Effective bounds after clamping to the data range.
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Inclusive row indices of the first and last row inside the window.
    pub start_index: usize,
    pub end_index: usize,
    pub length: usize,
}

impl WindowInfo {
    pub fn rows(&self) -> Range<usize> {
        self.start_index..self.end_index + 1
    }
}

/// Resolve `[start, end]` against ascending `dates`.
///
/// Absent bounds default to the data range. Bounds outside the range are
/// clamped with a warning; a window that selects no rows is an error.
pub fn resolve_window(
    dates: &[NaiveDate],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<WindowInfo, FeatureError> {
    let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
        return Err(FeatureError::data("Cannot window an empty dataset."));
    };

    let mut lo = start.unwrap_or(first);
    let mut hi = end.unwrap_or(last);
    if lo > hi {
        return Err(FeatureError::spec(format!(
            "Window start {lo} is after window end {hi}."
        )));
    }
    if hi < first || lo > last {
        return Err(FeatureError::spec(format!(
            "Window [{lo}, {hi}] lies outside the data range [{first}, {last}]."
        )));
    }
    if lo < first {
        warn!(requested = %lo, clamped = %first, "window start precedes data; clamping");
        lo = first;
    }
    if hi > last {
        warn!(requested = %hi, clamped = %last, "window end follows data; clamping");
        hi = last;
    }

    let start_index = dates.partition_point(|d| *d < lo);
    let end_exclusive = dates.partition_point(|d| *d <= hi);
    if start_index >= end_exclusive {
        return Err(FeatureError::spec(format!(
            "Window [{lo}, {hi}] contains no observations."
        )));
    }

    Ok(WindowInfo {
        start: lo,
        end: hi,
        start_index,
        end_index: end_exclusive - 1,
        length: end_exclusive - start_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn weekly(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 6).unwrap();
        (0..n).map(|i| start + Duration::weeks(i as i64)).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn defaults_to_full_range() {
        let dates = weekly(10);
        let w = resolve_window(&dates, None, None).unwrap();
        assert_eq!((w.start_index, w.end_index, w.length), (0, 9, 10));
        assert_eq!(w.rows(), 0..10);
    }

    #[test]
    fn bounds_between_rows_select_inner_rows() {
        let dates = weekly(10);
        // 2020-01-08 falls between the first and second rows.
        let w = resolve_window(&dates, Some(date(2020, 1, 8)), Some(date(2020, 2, 3))).unwrap();
        assert_eq!(w.start_index, 1);
        assert_eq!(dates[w.end_index], date(2020, 2, 3));
        assert_eq!(w.length, 4);
    }

    #[test]
    fn clamps_and_rejects() {
        let dates = weekly(10);
        let w = resolve_window(&dates, Some(date(2019, 1, 1)), Some(date(2030, 1, 1))).unwrap();
        assert_eq!(w.start, dates[0]);
        assert_eq!(w.end, dates[9]);
        assert_eq!(w.length, 10);

        assert!(resolve_window(&dates, Some(date(2025, 1, 1)), None).is_err());
        assert!(resolve_window(&dates, Some(date(2020, 1, 7)), Some(date(2020, 1, 8))).is_err());
        assert!(resolve_window(&dates, Some(date(2020, 3, 1)), Some(date(2020, 2, 1))).is_err());
    }
}
