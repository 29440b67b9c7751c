//! String adapters for `TimeOfDay` and `Instant`, so callers can write
//! `Expr::at("09:00")` instead of constructing a `TimeOfDay` by hand.
//!
//! Modelled on the teacher's text-parsing module: a small table of accepted
//! formats tried in order, rather than one clever all-encompassing pattern.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use lazy_static::lazy_static;

use crate::error::BuildError;
use crate::time::{Instant, TimeOfDay};

lazy_static! {
    // `%H` alone deliberately isn't here: chrono's `Parsed::to_naive_time`
    // requires a minute field even when the format string doesn't ask for
    // one, so `NaiveTime::parse_from_str("12", "%H")` always fails. A bare
    // hour is handled separately by `parse_bare_hour` below.
    static ref TIME_OF_DAY_FORMATS: Vec<&'static str> = vec!["%H:%M:%S", "%H:%M"];
    static ref INSTANT_FORMATS: Vec<&'static str> =
        vec!["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    static ref DATE_ONLY_FORMATS: Vec<&'static str> = vec!["%Y-%m-%d"];
}

pub fn parse_time_of_day(input: &str) -> Result<TimeOfDay, BuildError> {
    let trimmed = input.trim();
    TIME_OF_DAY_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
        .map(|t| {
            TimeOfDay::new(t.hour() as u8, t.minute() as u8, t.second() as u8)
                .expect("a chrono-parsed NaiveTime is always in range")
        })
        .or_else(|| parse_bare_hour(trimmed))
        .ok_or_else(|| BuildError::Parse {
            kind: "time of day",
            input: input.to_string(),
        })
}

/// `"HH"` on its own, e.g. `"9"` or `"12"`: hour sharp, zero minutes and
/// seconds. Parsed by hand since chrono has no format specifier that means
/// "hour only".
fn parse_bare_hour(trimmed: &str) -> Option<TimeOfDay> {
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u8 = trimmed.parse().ok()?;
    TimeOfDay::new(hour, 0, 0).ok()
}

pub fn parse_instant(input: &str) -> Result<Instant, BuildError> {
    let trimmed = input.trim();
    INSTANT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            // A bare date has no time-of-day fields, so chrono can't parse it
            // directly into a `NaiveDateTime`; resolve it against midnight instead.
            DATE_ONLY_FORMATS.iter().find_map(|fmt| {
                NaiveDate::parse_from_str(trimmed, fmt)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
        })
        .map(Instant::from_naive)
        .ok_or_else(|| BuildError::Parse {
            kind: "instant",
            input: input.to_string(),
        })
}
