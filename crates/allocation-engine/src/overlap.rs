//! Half-open minute windows and the overlap test every conflict check builds on.
//!
//! A window `[start, end)` includes its start minute and excludes its end minute.
//! Adjacent windows (where one ends exactly when another starts) are NOT conflicts,
//! which is what lets two people book the same desk back to back.

use serde::{Deserialize, Serialize};

use crate::planner::ResourceBooking;

/// A window of minutes since local midnight, half-open: `[start_minute, end_minute)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start_minute: i32,
    pub end_minute: i32,
}

impl TimeWindow {
    pub fn new(start_minute: i32, end_minute: i32) -> Self {
        Self {
            start_minute,
            end_minute,
        }
    }

    /// A window only means something when it has positive length.
    /// Empty and inverted windows are treated as absent.
    pub fn is_meaningful(&self) -> bool {
        self.end_minute > self.start_minute
    }

    /// Length in minutes, or 0 for empty/inverted windows.
    pub fn duration(&self) -> i32 {
        self.end_minute.saturating_sub(self.start_minute).max(0)
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        overlaps_half_open_intervals(
            self.start_minute,
            self.end_minute,
            other.start_minute,
            other.end_minute,
        )
    }
}

/// Decide whether two half-open intervals intersect.
///
/// Returns `false` if either interval is empty or inverted (`end <= start`).
/// Otherwise two intervals overlap iff `left_start < right_end && right_start < left_end`,
/// so touching intervals never overlap.
pub fn overlaps_half_open_intervals(
    left_start: i32,
    left_end: i32,
    right_start: i32,
    right_end: i32,
) -> bool {
    if left_end <= left_start || right_end <= right_start {
        return false;
    }
    left_start < right_end && right_start < left_end
}

/// Find the existing bookings on `resource_id` that overlap `window`.
///
/// Bookings on other resources and malformed bookings never block. The returned
/// references keep the caller's input order.
pub fn find_conflicting_bookings<'a>(
    window: &TimeWindow,
    resource_id: &str,
    bookings: &'a [ResourceBooking],
) -> Vec<&'a ResourceBooking> {
    bookings
        .iter()
        .filter(|b| b.resource_id == resource_id && window.overlaps(&b.window()))
        .collect()
}

/// True when no booking on `resource_id` overlaps `window`.
pub(crate) fn is_resource_free(
    window: &TimeWindow,
    resource_id: &str,
    bookings: &[ResourceBooking],
) -> bool {
    !bookings
        .iter()
        .any(|b| b.resource_id == resource_id && window.overlaps(&b.window()))
}
