//! Property-based tests for the allocation engine using proptest.
//!
//! These tests verify invariants that should hold for *any* input, not just the
//! specific examples in the `*_tests.rs` files.

use allocation_engine::intervals::{invert_intervals, merge_intervals, MinuteInterval};
use allocation_engine::overlap::overlaps_half_open_intervals;
use allocation_engine::planner::{assign, AssignmentProposal, Resource, ResourceBooking};
use allocation_engine::recurrence::{expand_recurrence_dates, RecurrenceDefinition, RecurrencePattern};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_minute() -> impl Strategy<Value = i32> {
    -60i32..=1500
}

fn arb_interval() -> impl Strategy<Value = MinuteInterval> {
    (0i32..=1440, 0i32..=240).prop_map(|(start, len)| MinuteInterval::new(start, start + len))
}

fn arb_resources() -> impl Strategy<Value = Vec<Resource>> {
    prop::collection::vec(any::<bool>(), 0..5).prop_map(|flags| {
        flags
            .into_iter()
            .enumerate()
            .map(|(i, has_charger)| Resource::new(format!("spot-{i}"), has_charger))
            .collect()
    })
}

fn arb_bookings() -> impl Strategy<Value = Vec<ResourceBooking>> {
    prop::collection::vec((0usize..5, 0i32..1440, 1i32..600), 0..8).prop_map(|raw| {
        raw.into_iter()
            .map(|(spot, start, len)| {
                ResourceBooking::new(format!("spot-{spot}"), start, (start + len).min(1440))
            })
            .collect()
    })
}

fn arb_pattern() -> impl Strategy<Value = RecurrencePattern> {
    prop_oneof![
        Just(RecurrencePattern::Daily),
        Just(RecurrencePattern::Weekly),
        Just(RecurrencePattern::Monthly),
        Just(RecurrencePattern::Yearly),
    ]
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Overlap
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn overlap_is_symmetric(a0 in arb_minute(), a1 in arb_minute(), b0 in arb_minute(), b1 in arb_minute()) {
        prop_assert_eq!(
            overlaps_half_open_intervals(a0, a1, b0, b1),
            overlaps_half_open_intervals(b0, b1, a0, a1)
        );
    }

    #[test]
    fn window_overlaps_itself_iff_non_empty(a0 in arb_minute(), a1 in arb_minute()) {
        prop_assert_eq!(overlaps_half_open_intervals(a0, a1, a0, a1), a1 > a0);
    }

    #[test]
    fn touching_windows_never_overlap(start in 0i32..1000, len_a in 1i32..200, len_b in 1i32..200) {
        let mid = start + len_a;
        prop_assert!(!overlaps_half_open_intervals(start, mid, mid, mid + len_b));
        prop_assert!(overlaps_half_open_intervals(start, mid + 1, mid, mid + len_b));
    }
}

// ---------------------------------------------------------------------------
// Merge / invert
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn merge_is_idempotent(intervals in prop::collection::vec(arb_interval(), 0..20)) {
        let once = merge_intervals(&intervals);
        prop_assert_eq!(merge_intervals(&once), once);
    }

    #[test]
    fn merge_output_is_sorted_and_separated(intervals in prop::collection::vec(arb_interval(), 0..20)) {
        let merged = merge_intervals(&intervals);
        for iv in &merged {
            prop_assert!(iv.end_min > iv.start_min);
        }
        for pair in merged.windows(2) {
            prop_assert!(pair[0].end_min < pair[1].start_min);
        }
    }

    #[test]
    fn merge_and_invert_tile_the_window(intervals in prop::collection::vec(arb_interval(), 0..20)) {
        let (window_start, window_end) = (420, 1080);
        let clipped: Vec<MinuteInterval> = intervals
            .iter()
            .map(|iv| MinuteInterval::new(iv.start_min.max(window_start), iv.end_min.min(window_end)))
            .collect();
        let busy = merge_intervals(&clipped);
        let free = invert_intervals(window_start, window_end, &busy);

        let mut all: Vec<MinuteInterval> = busy.iter().chain(free.iter()).copied().collect();
        all.sort_by_key(|iv| iv.start_min);

        let mut cursor = window_start;
        for iv in &all {
            prop_assert_eq!(iv.start_min, cursor, "gap or overlap at {}", cursor);
            cursor = iv.end_min;
        }
        prop_assert_eq!(cursor, window_end);
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn proposals_cover_attendance_without_conflicts(
        start in 0i32..1440,
        attendance in 1i32..720,
        charging in -30i32..400,
        resources in arb_resources(),
        bookings in arb_bookings(),
    ) {
        prop_assume!(start + attendance <= 1440);
        let proposal = assign(start, attendance, charging, &resources, &bookings);
        let pieces = proposal.bookings();

        if matches!(proposal, AssignmentProposal::Split { .. }) {
            prop_assert!(pieces.len() == 2 || pieces.len() == 3);
            prop_assert_eq!(pieces.iter().filter(|p| p.has_charger).count(), 1);
            let charge = attendance.min(charging.max(0));
            let charged = pieces.iter().find(|p| p.has_charger).unwrap();
            prop_assert_eq!(charged.end_minute - charged.start_minute, charge);
        }

        if !pieces.is_empty() {
            // Contiguous and exactly the attendance window.
            prop_assert_eq!(pieces[0].start_minute, start);
            prop_assert_eq!(pieces[pieces.len() - 1].end_minute, start + attendance);
            for pair in pieces.windows(2) {
                prop_assert_eq!(pair[0].end_minute, pair[1].start_minute);
            }
            // No piece collides with an existing booking on its resource.
            for piece in pieces {
                for b in bookings.iter().filter(|b| b.resource_id == piece.resource_id) {
                    prop_assert!(!overlaps_half_open_intervals(
                        piece.start_minute, piece.end_minute, b.start_minute, b.end_minute
                    ));
                }
            }
        }
    }

    #[test]
    fn planner_is_deterministic(
        start in 0i32..720,
        attendance in 1i32..720,
        charging in 0i32..300,
        resources in arb_resources(),
        bookings in arb_bookings(),
    ) {
        let first = assign(start, attendance, charging, &resources, &bookings);
        let second = assign(start, attendance, charging, &resources, &bookings);
        prop_assert_eq!(first, second);
    }
}

// ---------------------------------------------------------------------------
// Recurrence
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn recurrence_is_sorted_bounded_and_in_range(
        pattern in arb_pattern(),
        interval in 1i32..=6,
        start_offset in 0i64..1000,
        span in 0i64..2000,
        cap in 1usize..300,
    ) {
        let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let start = base + chrono::Duration::days(start_offset);
        let end = start + chrono::Duration::days(span);
        let mut def = RecurrenceDefinition::new(
            start.format("%Y-%m-%d").to_string(),
            end.format("%Y-%m-%d").to_string(),
            pattern,
        );
        def.interval = interval;

        let dates = expand_recurrence_dates(&def, cap);

        prop_assert!(dates.len() <= cap);
        for pair in dates.windows(2) {
            prop_assert!(pair[0] < pair[1], "not strictly increasing: {} >= {}", pair[0], pair[1]);
        }
        for d in &dates {
            prop_assert!(*d >= start && *d <= end);
        }
        // The first occurrence of every pattern without anchors is the start date.
        if let Some(first) = dates.first() {
            prop_assert_eq!(*first, start);
        }
    }
}
