//! Busy/free interval arithmetic over a bounded business window.
//!
//! Sorts intervals by start minute, merges overlapping **and touching** busy periods,
//! computes the free gaps inside a window, and maps intervals onto fractional ring
//! segments for occupancy rendering.
//!
//! Merging is deliberately looser than [`crate::overlap`]: two back-to-back bookings
//! are not a conflict, but they are one continuous busy block on screen.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::MINUTES_PER_DAY;

/// A busy or free interval in minutes since midnight, `[start_min, end_min)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinuteInterval {
    pub start_min: i32,
    pub end_min: i32,
}

impl MinuteInterval {
    pub fn new(start_min: i32, end_min: i32) -> Self {
        Self { start_min, end_min }
    }

    /// Build an interval from two `"HH:MM"` strings.
    ///
    /// Returns `None` if either string does not parse, so callers can drop the input.
    pub fn from_clock(start: &str, end: &str) -> Option<Self> {
        Some(Self::new(to_minutes(start)?, to_minutes(end)?))
    }

    fn is_empty(&self) -> bool {
        self.end_min <= self.start_min
    }
}

/// A fraction `[p0, p1]` of a business window, both ends within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingSegment {
    pub p0: f64,
    pub p1: f64,
}

/// The bounded part of the day that occupancy rings are drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessWindow {
    pub start_min: i32,
    pub end_min: i32,
}

impl Default for BusinessWindow {
    /// 07:00 to 18:00.
    fn default() -> Self {
        Self {
            start_min: 7 * 60,
            end_min: 18 * 60,
        }
    }
}

impl BusinessWindow {
    /// Parse a window from two `"HH:MM"` strings.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidClockTime` if either bound does not parse and
    /// `EngineError::InvalidWindow` if the window is empty or inverted.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start_min = parse_clock_time(start)?;
        let end_min = parse_clock_time(end)?;
        if end_min <= start_min {
            return Err(EngineError::InvalidWindow {
                start: start_min,
                end: end_min,
            });
        }
        Ok(Self { start_min, end_min })
    }
}

/// Busy blocks, free gaps and ring segments for one window, computed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occupancy {
    pub busy: Vec<MinuteInterval>,
    pub free: Vec<MinuteInterval>,
    pub segments: Vec<RingSegment>,
}

/// Parse an `"HH:MM"` (or `"H:MM"`) clock time into minutes since midnight.
///
/// `"24:00"` is accepted as the end of the day.
///
/// # Errors
/// Returns `EngineError::InvalidClockTime` for anything else.
pub fn parse_clock_time(value: &str) -> Result<i32> {
    to_minutes(value).ok_or_else(|| EngineError::InvalidClockTime(value.to_string()))
}

/// Lenient variant of [`parse_clock_time`]: `None` for invalid input.
pub fn to_minutes(value: &str) -> Option<i32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    let total = hours * 60 + minutes;
    (total <= MINUTES_PER_DAY).then_some(total)
}

/// Format minutes since midnight as `"HH:MM"`, clamped to `[00:00, 24:00]`.
pub fn minutes_to_clock(minutes: i32) -> String {
    let m = minutes.clamp(0, MINUTES_PER_DAY);
    format!("{:02}:{:02}", m / 60, m % 60)
}

/// Merge overlapping or touching intervals.
///
/// Empty and inverted intervals are dropped. Returns a list sorted by start with
/// every pair separated by a gap of at least one minute, so merging the result
/// again changes nothing.
pub fn merge_intervals(intervals: &[MinuteInterval]) -> Vec<MinuteInterval> {
    let mut sorted: Vec<MinuteInterval> = intervals
        .iter()
        .copied()
        .filter(|iv| !iv.is_empty())
        .collect();

    // Sort by start (then by end for stability).
    sorted.sort_by_key(|iv| (iv.start_min, iv.end_min));

    let mut merged: Vec<MinuteInterval> = Vec::with_capacity(sorted.len());
    for iv in sorted {
        if let Some(last) = merged.last_mut() {
            if iv.start_min <= last.end_min {
                last.end_min = last.end_min.max(iv.end_min);
                continue;
            }
        }
        merged.push(iv);
    }

    merged
}

/// Compute the free gaps of `[window_start, window_end]` around merged busy intervals.
///
/// `merged` must be the output of [`merge_intervals`]. Busy intervals are clipped to
/// the window; anything entirely outside is ignored.
pub fn invert_intervals(
    window_start: i32,
    window_end: i32,
    merged: &[MinuteInterval],
) -> Vec<MinuteInterval> {
    if window_end <= window_start {
        return Vec::new();
    }

    let mut free = Vec::new();
    let mut cursor = window_start;

    for iv in merged {
        let busy_start = iv.start_min.max(window_start);
        let busy_end = iv.end_min.min(window_end);
        if busy_end <= busy_start {
            continue;
        }
        if cursor < busy_start {
            free.push(MinuteInterval::new(cursor, busy_start));
        }
        cursor = cursor.max(busy_end);
    }

    // Trailing gap after the last busy period.
    if cursor < window_end {
        free.push(MinuteInterval::new(cursor, window_end));
    }

    free
}

/// Map intervals onto fractions of `[window_start, window_end]`.
///
/// Each fraction is clamped to `[0, 1]` and zero-width results are dropped. An empty
/// or inverted window yields no segments.
pub fn intervals_to_segments(
    window_start: i32,
    window_end: i32,
    merged: &[MinuteInterval],
) -> Vec<RingSegment> {
    if window_end <= window_start {
        return Vec::new();
    }
    let span = f64::from(window_end - window_start);
    let fraction = |minute: i32| (f64::from(minute - window_start) / span).clamp(0.0, 1.0);

    merged
        .iter()
        .filter_map(|iv| {
            let p0 = fraction(iv.start_min);
            let p1 = fraction(iv.end_min);
            (p1 > p0).then_some(RingSegment { p0, p1 })
        })
        .collect()
}

/// Merge `intervals`, clip them to `window`, and derive free gaps and ring segments.
pub fn occupancy(intervals: &[MinuteInterval], window: BusinessWindow) -> Occupancy {
    let busy: Vec<MinuteInterval> = merge_intervals(intervals)
        .into_iter()
        .map(|iv| {
            MinuteInterval::new(
                iv.start_min.max(window.start_min),
                iv.end_min.min(window.end_min),
            )
        })
        .filter(|iv| !iv.is_empty())
        .collect();
    let free = invert_intervals(window.start_min, window.end_min, &busy);
    let segments = intervals_to_segments(window.start_min, window.end_min, &busy);

    Occupancy {
        busy,
        free,
        segments,
    }
}
