//! Wall-clock scheduling.

use chrono::{DateTime, Days, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};

use sniper_protocols::CaptureError;

/// Parse an "HH:MM:SS" (or "HH:MM") clock time.
pub fn parse_clock(text: &str) -> Result<NaiveTime, CaptureError> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|_| CaptureError::InvalidSchedule(text.to_string()))
}

/// The next instant strictly after `now` whose local clock in `now`'s zone reads `at`.
///
/// A clock time equal to or earlier than `now` rolls over to the next
/// calendar day. Each day's offset is resolved separately, so a daylight-saving
/// change in between does not shift the wall-clock time.
pub fn next_fire_time<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();
    (0..=2)
        .filter_map(|days| today.checked_add_days(Days::new(days)))
        .filter_map(|day| resolve_local(&tz, day.and_time(at)))
        .find(|fire| fire > now)
        .unwrap_or_else(|| now.clone() + TimeDelta::days(1))
}

/// Map a local wall-clock time to an instant. Ambiguous times take the earlier
/// instant; times skipped by a forward change fall forward to the first valid minute.
fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    (0..=180).find_map(|minutes| {
        tz.from_local_datetime(&(local + TimeDelta::minutes(minutes)))
            .earliest()
    })
}
