//! WASM bindings for allocation-engine.
//!
//! Exposes assignment planning, recurrence expansion, day-slot normalization and
//! occupancy interval helpers to the booking UI via `wasm-bindgen`. All complex
//! types are passed as JSON strings using the engine's camelCase field names.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p allocation-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/allocation-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/allocation_engine_wasm.wasm
//! ```

use allocation_engine::day_slot::DaySlotBooking;
use allocation_engine::intervals::MinuteInterval;
use allocation_engine::planner::AssignmentRequest;
use allocation_engine::recurrence::{RecurrenceDefinition, DEFAULT_RECURRENCE_CAP};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

fn from_json<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// An interval record as the UI sends it. `JSON.stringify` turns `NaN` into
/// `null`, so both bounds are optional here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntervalRecord {
    #[serde(default)]
    start_min: Option<f64>,
    #[serde(default)]
    end_min: Option<f64>,
}

/// A whole minute value, or `None` for `NaN`, infinities, fractions and values
/// outside `i32`.
fn whole_minutes(value: f64) -> Option<i32> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return None;
    }
    Some(value as i32)
}

/// Keep only records whose bounds are both whole minutes.
fn usable_intervals(records: Vec<IntervalRecord>) -> Vec<MinuteInterval> {
    records
        .into_iter()
        .filter_map(|r| {
            let start = whole_minutes(r.start_min?)?;
            let end = whole_minutes(r.end_min?)?;
            Some(MinuteInterval::new(start, end))
        })
        .collect()
}

/// Parse a JSON array of `{startMin, endMin}` objects, dropping unusable records.
fn parse_intervals_json(json: &str) -> Result<Vec<MinuteInterval>, JsValue> {
    from_json(json, "intervals").map(usable_intervals)
}

/// Both window bounds as whole minutes, or `None` when either one is unusable.
fn window_bounds(window_start: f64, window_end: f64) -> Option<(i32, i32)> {
    Some((whole_minutes(window_start)?, whole_minutes(window_end)?))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Half-open overlap test: touching intervals do not overlap, and empty or
/// inverted intervals never overlap anything.
#[wasm_bindgen(js_name = "overlapsHalfOpenIntervals")]
pub fn overlaps_half_open_intervals(
    left_start: i32,
    left_end: i32,
    right_start: i32,
    right_end: i32,
) -> bool {
    allocation_engine::overlaps_half_open_intervals(left_start, left_end, right_start, right_end)
}

/// Plan a resource assignment.
///
/// `request_json` is `{startMinute, attendanceMinutes, chargingMinutes, spots, bookings}`
/// where each booking names its resource as `deskId`. Returns the proposal as JSON,
/// tagged by `kind` (`none` / `single` / `split`).
#[wasm_bindgen(js_name = "buildAssignmentProposal")]
pub fn build_assignment_proposal(request_json: &str) -> Result<String, JsValue> {
    let request: AssignmentRequest = from_json(request_json, "assignment request")?;
    to_json(&allocation_engine::build_assignment_proposal(&request))
}

/// Expand a recurrence definition into a JSON array of `YYYY-MM-DD` strings.
///
/// `cap` defaults to 200 dates.
#[wasm_bindgen(js_name = "expandRecurrence")]
pub fn expand_recurrence(definition_json: &str, cap: Option<u32>) -> Result<String, JsValue> {
    let definition: RecurrenceDefinition = from_json(definition_json, "recurrence definition")?;
    let cap = cap.map_or(DEFAULT_RECURRENCE_CAP, |c| c as usize);
    to_json(&allocation_engine::expand_recurrence(&definition, cap))
}

/// Collapse AM + PM bookings of the same person into virtual FULL-day records.
#[wasm_bindgen(js_name = "normalizeDaySlotBookings")]
pub fn normalize_day_slot_bookings(bookings_json: &str) -> Result<String, JsValue> {
    let bookings: Vec<DaySlotBooking> = from_json(bookings_json, "bookings")?;
    to_json(&allocation_engine::normalize_day_slot_bookings(&bookings))
}

/// Like [`normalize_day_slot_bookings`], but each resource entry separately.
#[wasm_bindgen(js_name = "normalizeDaySlotBookingsPerEntry")]
pub fn normalize_day_slot_bookings_per_entry(bookings_json: &str) -> Result<String, JsValue> {
    let bookings: Vec<DaySlotBooking> = from_json(bookings_json, "bookings")?;
    to_json(&allocation_engine::normalize_day_slot_bookings_per_entry(&bookings))
}

/// Merge overlapping or touching `{startMin, endMin}` intervals.
///
/// Records with a missing, `null` or fractional bound are dropped.
#[wasm_bindgen(js_name = "mergeIntervals")]
pub fn merge_intervals(intervals_json: &str) -> Result<String, JsValue> {
    let intervals = parse_intervals_json(intervals_json)?;
    to_json(&allocation_engine::merge_intervals(&intervals))
}

/// Free gaps of `[window_start, window_end]` around merged busy intervals.
///
/// The window bounds usually come from `toMinutes`; a `NaN` bound yields `[]`.
#[wasm_bindgen(js_name = "invertIntervals")]
pub fn invert_intervals(
    window_start: f64,
    window_end: f64,
    merged_json: &str,
) -> Result<String, JsValue> {
    let merged = parse_intervals_json(merged_json)?;
    let free = match window_bounds(window_start, window_end) {
        Some((start, end)) => allocation_engine::invert_intervals(start, end, &merged),
        None => Vec::new(),
    };
    to_json(&free)
}

/// Map intervals to `{p0, p1}` fractions of `[window_start, window_end]`.
///
/// A `NaN` window bound yields `[]`.
#[wasm_bindgen(js_name = "intervalsToSegments")]
pub fn intervals_to_segments(
    window_start: f64,
    window_end: f64,
    merged_json: &str,
) -> Result<String, JsValue> {
    let merged = parse_intervals_json(merged_json)?;
    let segments = match window_bounds(window_start, window_end) {
        Some((start, end)) => allocation_engine::intervals_to_segments(start, end, &merged),
        None => Vec::new(),
    };
    to_json(&segments)
}

/// Convert `"HH:MM"` to minutes since midnight; `NaN` when the string is invalid.
#[wasm_bindgen(js_name = "toMinutes")]
pub fn to_minutes(value: &str) -> f64 {
    allocation_engine::to_minutes(value).map_or(f64::NAN, f64::from)
}
