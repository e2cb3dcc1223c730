//! Tests for day-slot normalization (AM + PM → virtual FULL day).

use allocation_engine::day_slot::{
    normalize_day_slot_bookings, normalize_day_slot_bookings_per_entry, BookedFor, DaySlot,
    DaySlotBooking,
};
use serde_json::json;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn own(id: &str, user: &str, slot: Option<DaySlot>) -> DaySlotBooking {
    DaySlotBooking {
        id: Some(id.to_string()),
        resource_id: Some("desk-1".to_string()),
        day_slot: slot,
        user_id: Some(user.to_string()),
        ..Default::default()
    }
}

fn guest(id: &str, name: &str, slot: DaySlot) -> DaySlotBooking {
    DaySlotBooking {
        id: Some(id.to_string()),
        resource_id: Some("desk-1".to_string()),
        day_slot: Some(slot),
        booked_for: BookedFor::Guest,
        guest_name: Some(name.to_string()),
        ..Default::default()
    }
}

fn on(mut booking: DaySlotBooking, resource: &str) -> DaySlotBooking {
    booking.resource_id = Some(resource.to_string());
    booking
}

// ── Single booking / passthrough ────────────────────────────────────────────

#[test]
fn empty_input_is_empty() {
    assert!(normalize_day_slot_bookings(&[]).is_empty());
}

#[test]
fn lone_am_booking_stays_am() {
    let out = normalize_day_slot_bookings(&[own("b1", "u1", Some(DaySlot::Am))]);

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].day_slot(), DaySlot::Am);
    assert!(!out[0].is_virtual_merged);
    assert!(out[0].source_booking_ids.is_empty());
}

#[test]
fn booking_without_slot_resolves_to_full() {
    let out = normalize_day_slot_bookings(&[own("b1", "u1", None)]);
    assert_eq!(out[0].day_slot(), DaySlot::Full);
}

#[test]
fn full_day_flag_wins_over_slot() {
    let mut b = own("b1", "u1", Some(DaySlot::Pm));
    b.is_full_day = true;
    let out = normalize_day_slot_bookings(&[b]);
    assert_eq!(out[0].day_slot(), DaySlot::Full);
}

// ── Merging ─────────────────────────────────────────────────────────────────

#[test]
fn am_and_pm_of_same_user_merge_into_virtual_full() {
    let bookings = [
        own("b1", "u1", Some(DaySlot::Am)),
        own("b2", "u1", Some(DaySlot::Pm)),
    ];

    let out = normalize_day_slot_bookings(&bookings);

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].day_slot(), DaySlot::Full);
    assert!(out[0].is_virtual_merged);
    assert_eq!(out[0].source_booking_ids, vec!["b1", "b2"]);
}

#[test]
fn pm_listed_before_am_still_merges() {
    let bookings = [
        own("b2", "u1", Some(DaySlot::Pm)),
        own("b1", "u1", Some(DaySlot::Am)),
    ];

    let out = normalize_day_slot_bookings(&bookings);

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].source_booking_ids, vec!["b1", "b2"]);
}

#[test]
fn different_users_do_not_merge() {
    let bookings = [
        own("b1", "u1", Some(DaySlot::Am)),
        own("b2", "u2", Some(DaySlot::Pm)),
    ];

    let out = normalize_day_slot_bookings(&bookings);

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].day_slot(), DaySlot::Am);
    assert_eq!(out[1].day_slot(), DaySlot::Pm);
    assert!(out.iter().all(|b| !b.is_virtual_merged));
}

#[test]
fn two_am_bookings_do_not_merge() {
    let bookings = [
        own("b1", "u1", Some(DaySlot::Am)),
        own("b2", "u1", Some(DaySlot::Am)),
    ];

    let out = normalize_day_slot_bookings(&bookings);

    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|b| b.day_slot() == DaySlot::Am));
}

#[test]
fn guest_names_merge_case_insensitively() {
    let bookings = [
        guest("g1", "Grace Hopper", DaySlot::Am),
        guest("g2", "grace hopper", DaySlot::Pm),
    ];

    let out = normalize_day_slot_bookings(&bookings);

    assert_eq!(out.len(), 1);
    assert!(out[0].is_virtual_merged);
    assert_eq!(out[0].source_booking_ids, vec!["g1", "g2"]);
}

#[test]
fn guest_and_holder_with_same_name_do_not_merge() {
    let mut holder = own("b1", "grace hopper", Some(DaySlot::Am));
    holder.user_email = Some("grace@example.com".to_string());
    let bookings = [holder, guest("g1", "grace hopper", DaySlot::Pm)];

    let out = normalize_day_slot_bookings(&bookings);

    assert_eq!(out.len(), 2);
}

#[test]
fn holder_email_merges_when_ids_missing() {
    let am = DaySlotBooking {
        id: Some("b1".to_string()),
        day_slot: Some(DaySlot::Am),
        user_email: Some("Ada@Example.com".to_string()),
        ..Default::default()
    };
    let pm = DaySlotBooking {
        id: Some("b2".to_string()),
        day_slot: Some(DaySlot::Pm),
        user_email: Some("ada@example.com".to_string()),
        ..Default::default()
    };

    let out = normalize_day_slot_bookings(&[am, pm]);

    assert_eq!(out.len(), 1);
    assert!(out[0].is_virtual_merged);
}

#[test]
fn anonymous_bookings_never_merge() {
    let am = DaySlotBooking {
        id: Some("b1".to_string()),
        day_slot: Some(DaySlot::Am),
        ..Default::default()
    };
    let pm = DaySlotBooking {
        id: Some("b2".to_string()),
        day_slot: Some(DaySlot::Pm),
        ..Default::default()
    };

    let out = normalize_day_slot_bookings(&[am, pm]);

    assert_eq!(out.len(), 2);
}

#[test]
fn full_bookings_are_never_merged_with_half_days() {
    let mut full = own("f1", "u1", None);
    full.is_full_day = true;
    let bookings = [
        own("b1", "u1", Some(DaySlot::Am)),
        full,
        own("b3", "u1", None),
    ];

    let out = normalize_day_slot_bookings(&bookings);

    let ids: Vec<&str> = out.iter().filter_map(|b| b.booking.id.as_deref()).collect();
    assert_eq!(ids, vec!["f1", "b1", "b3"]);
    assert_eq!(out[0].day_slot(), DaySlot::Full);
    assert_eq!(out[1].day_slot(), DaySlot::Am);
    assert_eq!(out[2].day_slot(), DaySlot::Full);
    assert!(out.iter().all(|b| !b.is_virtual_merged));
}

#[test]
fn extra_half_day_passes_through_after_merge() {
    let bookings = [
        own("b1", "u1", Some(DaySlot::Am)),
        own("b2", "u1", Some(DaySlot::Pm)),
        own("b3", "u1", Some(DaySlot::Pm)),
    ];

    let out = normalize_day_slot_bookings(&bookings);

    assert_eq!(out.len(), 2);
    assert!(out[0].is_virtual_merged);
    assert_eq!(out[1].booking.id.as_deref(), Some("b3"));
    assert_eq!(out[1].day_slot(), DaySlot::Pm);
}

// ── Per entry ───────────────────────────────────────────────────────────────

#[test]
fn per_entry_does_not_merge_across_resources() {
    let bookings = [
        on(own("b1", "u1", Some(DaySlot::Am)), "desk-1"),
        on(own("b2", "u1", Some(DaySlot::Pm)), "desk-2"),
    ];

    let grouped = normalize_day_slot_bookings(&bookings);
    let per_entry = normalize_day_slot_bookings_per_entry(&bookings);

    assert_eq!(grouped.len(), 1);
    assert_eq!(per_entry.len(), 2);
    assert!(per_entry.iter().all(|b| !b.is_virtual_merged));
}

#[test]
fn per_entry_merges_within_each_resource() {
    let bookings = [
        on(own("b1", "u1", Some(DaySlot::Am)), "desk-1"),
        on(own("b2", "u2", Some(DaySlot::Am)), "desk-2"),
        on(own("b3", "u1", Some(DaySlot::Pm)), "desk-1"),
        on(own("b4", "u2", Some(DaySlot::Pm)), "desk-2"),
    ];

    let out = normalize_day_slot_bookings_per_entry(&bookings);

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].source_booking_ids, vec!["b1", "b3"]);
    assert_eq!(out[1].source_booking_ids, vec!["b2", "b4"]);
}

// ── Wire format ─────────────────────────────────────────────────────────────

#[test]
fn virtual_merge_serializes_flat() {
    let bookings: Vec<DaySlotBooking> = serde_json::from_value(json!([
        {"id": "b1", "resourceId": "desk-1", "daySlot": "AM", "userId": "u1"},
        {"id": "b2", "resourceId": "desk-1", "daySlot": "PM", "userId": "u1"}
    ]))
    .unwrap();

    let out = normalize_day_slot_bookings(&bookings);
    let value = serde_json::to_value(&out).unwrap();

    assert_eq!(value[0]["daySlot"], json!("FULL"));
    assert_eq!(value[0]["isVirtualMerged"], json!(true));
    assert_eq!(value[0]["sourceBookingIds"], json!(["b1", "b2"]));
    assert_eq!(value[0]["bookedFor"], json!("SELF"));
}

#[test]
fn plain_record_omits_merge_fields() {
    let out = normalize_day_slot_bookings(&[own("b1", "u1", Some(DaySlot::Pm))]);
    let value = serde_json::to_value(&out[0]).unwrap();

    assert_eq!(value["daySlot"], json!("PM"));
    assert!(value.get("isVirtualMerged").is_none());
    assert!(value.get("sourceBookingIds").is_none());
}
