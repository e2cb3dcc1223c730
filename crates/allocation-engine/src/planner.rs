//! Resource assignment planning -- pick a desk or parking spot for an attendance window.
//!
//! Given an attendance window, an optional charging requirement, the candidate
//! resources and the bookings already holding them, the planner proposes one of:
//!
//! - **Single** -- one resource for the whole window,
//! - **Split** -- 2 or 3 time-contiguous pieces, where only the charging piece uses a
//!   charger-equipped resource,
//! - **None** -- with a reason code the caller can turn into a precise message.
//!
//! The planner never fails and never mutates its inputs. Resources are always tried
//! in input order, so ties are broken by the caller's ordering.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::overlap::{is_resource_free, TimeWindow};
use crate::MINUTES_PER_DAY;

/// A bookable resource. Only parking spots carry chargers; desks never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub has_charger: bool,
}

impl Resource {
    pub fn new(id: impl Into<String>, has_charger: bool) -> Self {
        Self {
            id: id.into(),
            has_charger,
        }
    }
}

/// An existing commitment of a resource for part of the day.
///
/// On the wire the resource id is called `deskId`; `resourceId` is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBooking {
    #[serde(rename = "deskId", alias = "resourceId")]
    pub resource_id: String,
    pub start_minute: i32,
    pub end_minute: i32,
}

impl ResourceBooking {
    pub fn new(resource_id: impl Into<String>, start_minute: i32, end_minute: i32) -> Self {
        Self {
            resource_id: resource_id.into(),
            start_minute,
            end_minute,
        }
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_minute, self.end_minute)
    }
}

/// One proposed booking inside an [`AssignmentProposal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedBooking {
    pub resource_id: String,
    pub start_minute: i32,
    pub end_minute: i32,
    pub has_charger: bool,
}

impl AssignedBooking {
    fn new(resource: &Resource, window: TimeWindow) -> Self {
        Self {
            resource_id: resource.id.clone(),
            start_minute: window.start_minute,
            end_minute: window.end_minute,
            has_charger: resource.has_charger,
        }
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_minute, self.end_minute)
    }
}

/// Why no assignment could be proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoAssignmentReason {
    /// Invalid attendance window, or no resource is free for it.
    NoParking,
    /// No charger-equipped resource is free for any candidate charging window.
    NoChargerWindow,
    /// A charging window exists, but no regular resource could cover the rest and
    /// no charger is free for the whole attendance window.
    NoSplitAndNoFallback,
}

/// The planner's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum AssignmentProposal {
    None {
        reason: NoAssignmentReason,
    },
    Single {
        bookings: Vec<AssignedBooking>,
        used_fallback_charger_full_window: bool,
    },
    /// Time-contiguous pieces whose union is exactly the attendance window.
    Split {
        bookings: Vec<AssignedBooking>,
        used_fallback_charger_full_window: bool,
    },
}

impl AssignmentProposal {
    fn none(reason: NoAssignmentReason) -> Self {
        AssignmentProposal::None { reason }
    }

    fn single(resource: &Resource, window: TimeWindow, used_fallback: bool) -> Self {
        AssignmentProposal::Single {
            bookings: vec![AssignedBooking::new(resource, window)],
            used_fallback_charger_full_window: used_fallback,
        }
    }

    fn split(pieces: &[(&Resource, TimeWindow)]) -> Self {
        AssignmentProposal::Split {
            bookings: pieces
                .iter()
                .map(|(resource, window)| AssignedBooking::new(resource, *window))
                .collect(),
            used_fallback_charger_full_window: false,
        }
    }

    /// The proposed bookings, in time order. Empty for `None`.
    pub fn bookings(&self) -> &[AssignedBooking] {
        match self {
            AssignmentProposal::None { .. } => &[],
            AssignmentProposal::Single { bookings, .. }
            | AssignmentProposal::Split { bookings, .. } => bookings,
        }
    }

    pub fn is_assigned(&self) -> bool {
        !matches!(self, AssignmentProposal::None { .. })
    }

    pub fn used_fallback_charger_full_window(&self) -> bool {
        match self {
            AssignmentProposal::None { .. } => false,
            AssignmentProposal::Single {
                used_fallback_charger_full_window,
                ..
            }
            | AssignmentProposal::Split {
                used_fallback_charger_full_window,
                ..
            } => *used_fallback_charger_full_window,
        }
    }

    pub fn reason(&self) -> Option<NoAssignmentReason> {
        match self {
            AssignmentProposal::None { reason } => Some(*reason),
            _ => None,
        }
    }
}

/// A complete planning request, as a booking service would send it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub start_minute: i32,
    pub attendance_minutes: i32,
    #[serde(default)]
    pub charging_minutes: i32,
    pub spots: Vec<Resource>,
    #[serde(default)]
    pub bookings: Vec<ResourceBooking>,
}

/// Plan an [`AssignmentRequest`]. See [`assign`].
pub fn build_assignment_proposal(request: &AssignmentRequest) -> AssignmentProposal {
    assign(
        request.start_minute,
        request.attendance_minutes,
        request.charging_minutes,
        &request.spots,
        &request.bookings,
    )
}

/// Propose resources for `[start_minute, start_minute + attendance_minutes)`.
///
/// Without a charging requirement a single regular resource is preferred, then a
/// single charger resource. With one, the charger is used only for a charging
/// sub-window and regular resources cover the rest; if that is impossible a charger
/// free for the whole window is used as a fallback.
pub fn assign(
    start_minute: i32,
    attendance_minutes: i32,
    charging_minutes: i32,
    resources: &[Resource],
    bookings: &[ResourceBooking],
) -> AssignmentProposal {
    let end_minute = start_minute.saturating_add(attendance_minutes);
    if attendance_minutes <= 0 || start_minute < 0 || end_minute > MINUTES_PER_DAY {
        debug!(
            start_minute,
            attendance_minutes, "attendance window outside the day, nothing to assign"
        );
        return AssignmentProposal::none(NoAssignmentReason::NoParking);
    }
    let attendance = TimeWindow::new(start_minute, end_minute);

    if charging_minutes <= 0 {
        return assign_without_charging(attendance, resources, bookings);
    }

    let charge = attendance_minutes.min(charging_minutes.max(0));
    assign_with_charging(attendance, charge, resources, bookings)
}

/// First resource (in input order) with the given charger flag that is free for
/// the whole of `window`.
fn find_free_resource<'a>(
    resources: &'a [Resource],
    bookings: &[ResourceBooking],
    window: TimeWindow,
    with_charger: bool,
) -> Option<&'a Resource> {
    resources
        .iter()
        .filter(|r| r.has_charger == with_charger)
        .find(|r| is_resource_free(&window, &r.id, bookings))
}

fn assign_without_charging(
    attendance: TimeWindow,
    resources: &[Resource],
    bookings: &[ResourceBooking],
) -> AssignmentProposal {
    // Keep chargers for people who need them.
    let found = find_free_resource(resources, bookings, attendance, false)
        .or_else(|| find_free_resource(resources, bookings, attendance, true));

    match found {
        Some(resource) => {
            debug!(resource = %resource.id, "single resource covers attendance");
            AssignmentProposal::single(resource, attendance, false)
        }
        None => {
            debug!("no resource free for the attendance window");
            AssignmentProposal::none(NoAssignmentReason::NoParking)
        }
    }
}

/// Candidate charging windows in priority order: anchored at the start, anchored at
/// the end, then every whole-hour start that fits. Empty and duplicate windows are
/// skipped so the first occurrence keeps its priority.
pub fn charging_window_candidates(attendance: TimeWindow, charge: i32) -> Vec<TimeWindow> {
    let mut candidates: Vec<TimeWindow> = Vec::new();
    let mut push = |window: TimeWindow| {
        if window.is_meaningful() && !candidates.contains(&window) {
            candidates.push(window);
        }
    };

    let TimeWindow {
        start_minute: start,
        end_minute: end,
    } = attendance;

    push(TimeWindow::new(start, start + charge));
    push(TimeWindow::new(end - charge, end));

    // On-the-hour starts coincide with the start-anchored window; the dedup drops them.
    let latest_start = end - charge;
    let mut hour = start.div_euclid(60) * 60;
    if hour < start {
        hour += 60;
    }
    while hour <= latest_start {
        if hour >= start && hour + charge <= end {
            push(TimeWindow::new(hour, hour + charge));
        }
        hour += 60;
    }

    candidates
}

fn assign_with_charging(
    attendance: TimeWindow,
    charge: i32,
    resources: &[Resource],
    bookings: &[ResourceBooking],
) -> AssignmentProposal {
    let candidates = charging_window_candidates(attendance, charge);
    debug!(
        charge,
        candidates = candidates.len(),
        "planning attendance with charging window"
    );

    let mut charger_window_found = false;

    for candidate in candidates {
        let Some(charger) = find_free_resource(resources, bookings, candidate, true) else {
            trace!(?candidate, "no charger free for candidate");
            continue;
        };
        charger_window_found = true;

        if candidate == attendance {
            debug!(charger = %charger.id, "charger covers the whole attendance window");
            return AssignmentProposal::single(charger, attendance, false);
        }

        let before = TimeWindow::new(attendance.start_minute, candidate.start_minute);
        let after = TimeWindow::new(candidate.end_minute, attendance.end_minute);

        let proposal = match (before.is_meaningful(), after.is_meaningful()) {
            (false, true) => {
                find_free_resource(resources, bookings, after, false).map(|regular| {
                    AssignmentProposal::split(&[(charger, candidate), (regular, after)])
                })
            }
            (true, false) => {
                find_free_resource(resources, bookings, before, false).map(|regular| {
                    AssignmentProposal::split(&[(regular, before), (charger, candidate)])
                })
            }
            (true, true) => {
                let first = find_free_resource(resources, bookings, before, false);
                let last = find_free_resource(resources, bookings, after, false);
                match (first, last) {
                    (Some(first), Some(last)) => Some(AssignmentProposal::split(&[
                        (first, before),
                        (charger, candidate),
                        (last, after),
                    ])),
                    _ => None,
                }
            }
            // Only when candidate == attendance, handled above.
            (false, false) => None,
        };

        match proposal {
            Some(proposal) => {
                debug!(charger = %charger.id, ?candidate, "split proposal found");
                return proposal;
            }
            None => trace!(?candidate, "no regular resource for the remainder"),
        }
    }

    if let Some(charger) = find_free_resource(resources, bookings, attendance, true) {
        debug!(charger = %charger.id, "falling back to a charger for the whole window");
        return AssignmentProposal::single(charger, attendance, true);
    }

    let reason = if charger_window_found {
        NoAssignmentReason::NoSplitAndNoFallback
    } else {
        NoAssignmentReason::NoChargerWindow
    };
    debug!(?reason, "no assignment possible");
    AssignmentProposal::none(reason)
}
