//! # allocation-engine
//!
//! Deterministic temporal resource allocation for office bookings: desks, meeting
//! rooms and parking spots (with or without a charger).
//!
//! Every operation is a pure, synchronous function of its inputs. The engine never
//! reads a clock, never performs I/O and never mutates caller data, so the same
//! inputs always produce structurally equal outputs. Persistence, transport and
//! rendering belong to the caller.
//!
//! ## Modules
//!
//! - [`overlap`] — half-open minute windows and conflict tests
//! - [`intervals`] — merge / invert busy intervals, map them onto ring segments
//! - [`recurrence`] — expand a recurring-booking definition into ISO dates
//! - [`day_slot`] — collapse matching AM + PM bookings into a virtual FULL day
//! - [`planner`] — choose a resource (or a 2-3 piece split) for an attendance window
//! - [`config`] — business window and recurrence cap settings
//! - [`error`] — Error types for the parsing edges

pub mod config;
pub mod day_slot;
pub mod error;
pub mod intervals;
pub mod overlap;
pub mod planner;
pub mod recurrence;

pub use config::EngineConfig;
pub use day_slot::{
    normalize_day_slot_bookings, normalize_day_slot_bookings_per_entry, DaySlot,
    DaySlotBooking, NormalizedDaySlotBooking,
};
pub use error::EngineError;
pub use intervals::{
    intervals_to_segments, invert_intervals, merge_intervals, occupancy, to_minutes,
    BusinessWindow, MinuteInterval, Occupancy, RingSegment,
};
pub use overlap::{find_conflicting_bookings, overlaps_half_open_intervals, TimeWindow};
pub use planner::{
    assign, build_assignment_proposal, AssignedBooking, AssignmentProposal, AssignmentRequest,
    NoAssignmentReason, Resource, ResourceBooking,
};
pub use recurrence::{expand_recurrence, RecurrenceDefinition, RecurrencePattern};

/// Minutes in one calendar day; the upper bound of every minute window.
pub const MINUTES_PER_DAY: i32 = 1440;
