//! Recurring-booking expansion -- converts a recurrence definition into concrete dates.
//!
//! All arithmetic happens on plain calendar dates (`chrono::NaiveDate`), so no
//! timezone or DST shift can move an occurrence to a neighbouring day. Every pattern
//! stops once `cap` dates have been produced, which bounds the output no matter how
//! wide the requested date range is.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{EngineError, Result};

/// Default upper bound on the number of dates one expansion may produce.
pub const DEFAULT_RECURRENCE_CAP: usize = 200;

/// Frequency of a recurring booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// One recurring-booking request, as received from a caller.
///
/// Dates are ISO `YYYY-MM-DD` strings; unparseable dates make the whole definition
/// expand to nothing rather than fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceDefinition {
    pub start_date: String,
    pub end_date: String,
    pub pattern_type: RecurrencePattern,
    #[serde(default = "default_interval")]
    pub interval: i32,
    /// ISO weekdays, Monday = 1 .. Sunday = 7. Only used by `WEEKLY`.
    #[serde(default)]
    pub by_weekday: Vec<u8>,
    /// Day of month, 1..=31. Used by `MONTHLY` and `YEARLY`.
    #[serde(default)]
    pub by_monthday: Option<u32>,
    /// Month, 1..=12. Only used by `YEARLY`.
    #[serde(default)]
    pub by_month: Option<u32>,
}

fn default_interval() -> i32 {
    1
}

impl RecurrenceDefinition {
    /// A definition with `interval = 1` and no anchor constraints.
    pub fn new(
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        pattern_type: RecurrencePattern,
    ) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            pattern_type,
            interval: default_interval(),
            by_weekday: Vec::new(),
            by_monthday: None,
            by_month: None,
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` date.
///
/// # Errors
/// Returns `EngineError::InvalidDate` if the string is not a valid calendar date.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidDate(value.to_string()))
}

/// Expand a recurrence definition into ISO `YYYY-MM-DD` strings.
///
/// Returns an empty list when the dates do not parse, `end_date < start_date`, or
/// `interval < 1`. At most `cap` dates are produced, in chronological order.
pub fn expand_recurrence(definition: &RecurrenceDefinition, cap: usize) -> Vec<String> {
    expand_recurrence_dates(definition, cap)
        .into_iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect()
}

/// Typed variant of [`expand_recurrence`].
pub fn expand_recurrence_dates(definition: &RecurrenceDefinition, cap: usize) -> Vec<NaiveDate> {
    let (start, end) = match (
        parse_iso_date(&definition.start_date),
        parse_iso_date(&definition.end_date),
    ) {
        (Ok(start), Ok(end)) => (start, end),
        _ => {
            debug!(
                start_date = %definition.start_date,
                end_date = %definition.end_date,
                "recurrence rejected: unparseable date"
            );
            return Vec::new();
        }
    };
    if end < start {
        debug!(%start, %end, "recurrence rejected: end before start");
        return Vec::new();
    }
    if definition.interval < 1 {
        debug!(interval = definition.interval, "recurrence rejected: interval < 1");
        return Vec::new();
    }
    if cap == 0 {
        return Vec::new();
    }

    // interval >= 1 was checked above.
    let interval = definition.interval as u32;
    let dates = match definition.pattern_type {
        RecurrencePattern::Daily => expand_daily(start, end, interval, cap),
        RecurrencePattern::Weekly => {
            expand_weekly(start, end, interval, &definition.by_weekday, cap)
        }
        RecurrencePattern::Monthly => {
            let day = definition.by_monthday.unwrap_or_else(|| start.day());
            expand_monthly(start, end, interval, day, cap)
        }
        RecurrencePattern::Yearly => {
            let month = definition.by_month.unwrap_or_else(|| start.month());
            let day = definition.by_monthday.unwrap_or_else(|| start.day());
            expand_yearly(start, end, interval, month, day, cap)
        }
    };

    if dates.len() == cap {
        debug!(cap, pattern = ?definition.pattern_type, "recurrence expansion hit cap");
    }
    dates
}

fn expand_daily(start: NaiveDate, end: NaiveDate, interval: u32, cap: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;
    while current <= end && dates.len() < cap {
        dates.push(current);
        match current.checked_add_days(Days::new(u64::from(interval))) {
            Some(next) => current = next,
            None => break,
        }
    }
    dates
}

/// Monday of the ISO week containing `date`, or `None` when that Monday lies
/// before the earliest representable date.
fn week_monday(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
}

fn expand_weekly(
    start: NaiveDate,
    end: NaiveDate,
    interval: u32,
    by_weekday: &[u8],
    cap: usize,
) -> Vec<NaiveDate> {
    // Without explicit weekdays the series repeats on the start date's weekday.
    let weekdays: Vec<u32> = if by_weekday.is_empty() {
        vec![start.weekday().number_from_monday()]
    } else {
        by_weekday
            .iter()
            .map(|&d| u32::from(d))
            .filter(|d| (1..=7).contains(d))
            .collect()
    };

    if weekdays.is_empty() {
        debug!(?by_weekday, "weekly recurrence rejected: no valid weekday");
        return Vec::new();
    }
    let Some(anchor) = week_monday(start) else {
        debug!(%start, "weekly recurrence rejected: start week has no Monday");
        return Vec::new();
    };

    let mut dates = Vec::new();
    let mut current = start;
    while current <= end && dates.len() < cap {
        // current >= start, so its Monday exists whenever the anchor does.
        let Some(monday) = week_monday(current) else {
            break;
        };
        let weeks_since_anchor = (monday - anchor).num_days() / 7;
        if weeks_since_anchor % i64::from(interval) == 0
            && weekdays.contains(&current.weekday().number_from_monday())
        {
            dates.push(current);
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    dates
}

fn expand_monthly(
    start: NaiveDate,
    end: NaiveDate,
    interval: u32,
    day: u32,
    cap: usize,
) -> Vec<NaiveDate> {
    if !(1..=31).contains(&day) {
        debug!(day, "monthly recurrence rejected: day of month out of range");
        return Vec::new();
    }
    let mut dates = Vec::new();
    // Months counted from year 0 so stepping never has to carry by hand.
    let mut month_index = i64::from(start.year()) * 12 + i64::from(start.month0());

    while dates.len() < cap {
        let year = month_index.div_euclid(12) as i32;
        let month = month_index.rem_euclid(12) as u32 + 1;
        let Some(first_of_month) = NaiveDate::from_ymd_opt(year, month, 1) else {
            break;
        };
        if first_of_month > end {
            break;
        }
        // Months shorter than `day` are skipped, never rolled over.
        match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) if date >= start && date <= end => dates.push(date),
            Some(_) => {}
            None => trace!(year, month, day, "monthly occurrence skipped: no such day"),
        }
        month_index += i64::from(interval);
    }
    dates
}

fn expand_yearly(
    start: NaiveDate,
    end: NaiveDate,
    interval: u32,
    month: u32,
    day: u32,
    cap: usize,
) -> Vec<NaiveDate> {
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        debug!(month, day, "yearly recurrence rejected: month or day out of range");
        return Vec::new();
    }
    let mut dates = Vec::new();
    let mut year = start.year();

    while year <= end.year() && dates.len() < cap {
        match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) if date >= start && date <= end => dates.push(date),
            Some(_) => {}
            None => trace!(year, month, day, "yearly occurrence skipped: no such date"),
        }
        match year.checked_add(interval as i32) {
            Some(next) => year = next,
            None => break,
        }
    }
    dates
}
