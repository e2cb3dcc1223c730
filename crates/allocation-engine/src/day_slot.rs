//! Day-slot normalization -- fold an AM and a PM booking of the same person into one
//! virtual FULL-day record.
//!
//! Half-day bookings are grouped by an identity key resolved through an ordered
//! chain of extractors (see [`IDENTITY_EXTRACTORS`]). A group holding both an AM and a
//! PM booking is shown as a single synthetic FULL entry carrying the ids of both
//! originals. FULL-day bookings are never merged: they already cover the day.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Part of a calendar day a booking covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DaySlot {
    Am,
    Pm,
    Full,
}

/// Who a booking was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BookedFor {
    /// The holder booked for themselves.
    #[default]
    #[serde(rename = "SELF")]
    Holder,
    /// Someone booked on behalf of a named guest.
    #[serde(rename = "GUEST")]
    Guest,
}

/// A booking as the occupancy layer sees it for one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySlotBooking {
    #[serde(default)]
    pub id: Option<String>,
    /// The desk / room / spot this booking belongs to.
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub day_slot: Option<DaySlot>,
    #[serde(default)]
    pub is_full_day: bool,
    #[serde(default)]
    pub booked_for: BookedFor,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub created_by_user_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

impl DaySlotBooking {
    /// `FULL` if flagged full-day or if no slot is given, else the explicit slot.
    pub fn resolved_slot(&self) -> DaySlot {
        if self.is_full_day {
            return DaySlot::Full;
        }
        self.day_slot.unwrap_or(DaySlot::Full)
    }

    fn is_guest(&self) -> bool {
        self.booked_for == BookedFor::Guest
    }
}

/// A booking tagged with its resolved day slot.
///
/// `booking.day_slot` is always `Some` here. Virtual merges list the ids of the
/// AM and PM originals in `source_booking_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedDaySlotBooking {
    #[serde(flatten)]
    pub booking: DaySlotBooking,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_booking_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_virtual_merged: bool,
}

impl NormalizedDaySlotBooking {
    fn tagged(booking: &DaySlotBooking) -> Self {
        let mut booking = booking.clone();
        booking.day_slot = Some(booking.resolved_slot());
        Self {
            booking,
            source_booking_ids: Vec::new(),
            is_virtual_merged: false,
        }
    }

    fn virtual_full_day(am: &DaySlotBooking, pm: &DaySlotBooking) -> Self {
        let mut booking = am.clone();
        booking.day_slot = Some(DaySlot::Full);
        Self {
            booking,
            source_booking_ids: [&am.id, &pm.id].into_iter().flatten().cloned().collect(),
            is_virtual_merged: true,
        }
    }

    pub fn day_slot(&self) -> DaySlot {
        self.booking.day_slot.unwrap_or(DaySlot::Full)
    }
}

/// An identity extractor: returns a key when it applies to the booking.
pub type IdentityExtractor = fn(&DaySlotBooking) -> Option<String>;

/// Identity resolution, highest priority first.
///
/// Keys are prefixed by their source so a guest name can never collide with a
/// user id of the same spelling.
pub const IDENTITY_EXTRACTORS: &[IdentityExtractor] = &[
    guest_creator_id,
    guest_name,
    holder_user_id,
    holder_email,
];

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn guest_creator_id(b: &DaySlotBooking) -> Option<String> {
    if !b.is_guest() {
        return None;
    }
    non_blank(&b.created_by_user_id).map(|id| format!("creator:{id}"))
}

fn guest_name(b: &DaySlotBooking) -> Option<String> {
    if !b.is_guest() {
        return None;
    }
    non_blank(&b.guest_name).map(|name| format!("guest:{}", name.to_lowercase()))
}

fn holder_user_id(b: &DaySlotBooking) -> Option<String> {
    if b.is_guest() {
        return None;
    }
    non_blank(&b.user_id).map(|id| format!("user:{id}"))
}

fn holder_email(b: &DaySlotBooking) -> Option<String> {
    if b.is_guest() {
        return None;
    }
    non_blank(&b.user_email).map(|email| format!("email:{}", email.to_lowercase()))
}

/// Resolve the identity key of a booking at position `index` in its input list.
///
/// Falls back to the booking's own id, then to its position, so bookings with no
/// identity information only ever group with themselves.
pub fn identity_key(booking: &DaySlotBooking, index: usize) -> String {
    IDENTITY_EXTRACTORS
        .iter()
        .find_map(|extract| extract(booking))
        .unwrap_or_else(|| match non_blank(&booking.id) {
            Some(id) => format!("entry:{id}"),
            None => format!("index:{index}"),
        })
}

/// Half-day bookings sharing one identity key, in input order.
struct IdentityGroup<'a> {
    key: String,
    am: Vec<&'a DaySlotBooking>,
    pm: Vec<&'a DaySlotBooking>,
}

/// Normalize the bookings of one day into slot-tagged records.
///
/// With at most one booking, each booking is simply tagged with its resolved slot.
/// Otherwise explicit FULL bookings come first, then each identity group of
/// half-day bookings (an AM + PM pair collapses into one virtual FULL record; any
/// extra half-day bookings pass through), then bookings without slot information,
/// tagged FULL.
pub fn normalize_day_slot_bookings(bookings: &[DaySlotBooking]) -> Vec<NormalizedDaySlotBooking> {
    if bookings.len() <= 1 {
        return bookings.iter().map(NormalizedDaySlotBooking::tagged).collect();
    }

    let mut full = Vec::new();
    let mut unresolved = Vec::new();
    let mut groups: Vec<IdentityGroup<'_>> = Vec::new();

    for (index, booking) in bookings.iter().enumerate() {
        let slot = match (booking.is_full_day, booking.day_slot) {
            (true, _) | (false, Some(DaySlot::Full)) => {
                full.push(NormalizedDaySlotBooking::tagged(booking));
                continue;
            }
            (false, None) => {
                unresolved.push(NormalizedDaySlotBooking::tagged(booking));
                continue;
            }
            (false, Some(slot)) => slot,
        };

        let key = identity_key(booking, index);
        let group = match groups.iter().position(|g| g.key == key) {
            Some(pos) => &mut groups[pos],
            None => {
                groups.push(IdentityGroup {
                    key,
                    am: Vec::new(),
                    pm: Vec::new(),
                });
                // Just pushed, so the list is non-empty.
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };
        match slot {
            DaySlot::Am => group.am.push(booking),
            _ => group.pm.push(booking),
        }
    }

    let mut normalized = full;
    for group in &groups {
        match (group.am.split_first(), group.pm.split_first()) {
            (Some((am, rest_am)), Some((pm, rest_pm))) => {
                debug!(identity = %group.key, "merging AM and PM bookings into a virtual FULL day");
                normalized.push(NormalizedDaySlotBooking::virtual_full_day(am, pm));
                normalized.extend(rest_am.iter().copied().map(NormalizedDaySlotBooking::tagged));
                normalized.extend(rest_pm.iter().copied().map(NormalizedDaySlotBooking::tagged));
            }
            _ => {
                normalized.extend(group.am.iter().copied().map(NormalizedDaySlotBooking::tagged));
                normalized.extend(group.pm.iter().copied().map(NormalizedDaySlotBooking::tagged));
            }
        }
    }
    normalized.extend(unresolved);

    normalized
}

/// Normalize per resource entry: bookings are grouped by `resource_id` (first-seen
/// order, bookings without a resource form one group) and each group is normalized
/// on its own, so the same person on two different desks is never merged.
pub fn normalize_day_slot_bookings_per_entry(
    bookings: &[DaySlotBooking],
) -> Vec<NormalizedDaySlotBooking> {
    let mut entries: Vec<(Option<&str>, Vec<DaySlotBooking>)> = Vec::new();
    for booking in bookings {
        let resource = booking.resource_id.as_deref();
        match entries.iter_mut().find(|(r, _)| *r == resource) {
            Some((_, group)) => group.push(booking.clone()),
            None => entries.push((resource, vec![booking.clone()])),
        }
    }

    entries
        .iter()
        .flat_map(|(_, group)| normalize_day_slot_bookings(group))
        .collect()
}
