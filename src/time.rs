use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::BuildError;

/// A civil, timezone-free point in time: a plain date and time of day, no
/// leap seconds, no calendar beyond the proleptic Gregorian one `chrono`
/// already gives us. Wraps `NaiveDateTime` rather than exposing it, the way
/// the rest of this crate wraps `chrono` types behind its own vocabulary.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(NaiveDateTime);

impl Instant {
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self, BuildError> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(BuildError::InvalidDate {
            year,
            month,
            day,
        })?;
        let time =
            NaiveTime::from_hms_opt(hour, minute, second).ok_or(BuildError::InvalidTimeComponent {
                component: "time",
                value: hour * 10000 + minute * 100 + second,
            })?;
        Ok(Self(NaiveDateTime::new(date, time)))
    }

    pub(crate) fn from_naive(naive: NaiveDateTime) -> Self {
        Self(naive)
    }

    pub(crate) fn naive(&self) -> NaiveDateTime {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// ISO weekday, 1 = Monday .. 7 = Sunday, matching `Expr::weekday`'s domain.
    pub fn weekday_number(&self) -> u8 {
        self.0.weekday().number_from_monday() as u8
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay {
            hour: self.0.hour() as u8,
            minute: self.0.minute() as u8,
            second: self.0.second() as u8,
        }
    }

    pub(crate) fn with_time_of_day(&self, tod: TimeOfDay) -> Self {
        let time = NaiveTime::from_hms_opt(tod.hour as u32, tod.minute as u32, tod.second as u32)
            .expect("TimeOfDay invariants guarantee a valid wall-clock time");
        Self(NaiveDateTime::new(self.0.date(), time))
    }

    pub(crate) fn start_of_day(&self) -> Self {
        Self(self.0.date().and_hms_opt(0, 0, 0).expect("midnight always exists"))
    }

    pub(crate) fn add_span(&self, span: Span) -> Self {
        Self(self.0 + Duration::seconds(span.as_seconds() as i64))
    }

    pub(crate) fn add_seconds(&self, seconds: i64) -> Self {
        Self(self.0 + Duration::seconds(seconds))
    }

    pub(crate) fn seconds_since(&self, other: &Instant) -> i64 {
        (self.0 - other.0).num_seconds()
    }
}

impl fmt::Debug for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instant({})", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// A wall-clock time of day, independent of any particular date.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
    second: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Self, BuildError> {
        if hour > 23 {
            return Err(BuildError::InvalidTimeComponent {
                component: "hour",
                value: hour as u32,
            });
        }
        if minute > 59 {
            return Err(BuildError::InvalidTimeComponent {
                component: "minute",
                value: minute as u32,
            });
        }
        if second > 59 {
            return Err(BuildError::InvalidTimeComponent {
                component: "second",
                value: second as u32,
            });
        }
        Ok(Self { hour, minute, second })
    }

    pub fn midnight() -> Self {
        Self { hour: 0, minute: 0, second: 0 }
    }

    pub(crate) fn seconds_in_day(&self) -> u32 {
        self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }
}

/// An amount of elapsed time, stored as a non-negative number of seconds.
///
/// Named `Span` rather than `Duration` to keep `chrono::Duration` out of the
/// public API; this crate's arithmetic never needs a signed duration.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Span(u64);

impl Span {
    pub const fn seconds(n: u64) -> Self {
        Self(n)
    }

    pub const fn minutes(n: u64) -> Self {
        Self(n * 60)
    }

    pub const fn hours(n: u64) -> Self {
        Self(n * 3600)
    }

    pub const fn days(n: u64) -> Self {
        Self(n * 86_400)
    }

    pub(crate) fn as_seconds(&self) -> u64 {
        self.0
    }
}

/// Trait used to let `Expr::at`/`Expr::timerange` accept either a ready-made
/// `TimeOfDay` or a parseable string, without the blanket-`TryFrom` collision
/// that comes from trying to reuse `std`'s conversion traits for this.
pub trait IntoTimeOfDay {
    fn into_time_of_day(self) -> Result<TimeOfDay, BuildError>;
}

impl IntoTimeOfDay for TimeOfDay {
    fn into_time_of_day(self) -> Result<TimeOfDay, BuildError> {
        Ok(self)
    }
}

impl IntoTimeOfDay for &str {
    fn into_time_of_day(self) -> Result<TimeOfDay, BuildError> {
        crate::parse::parse_time_of_day(self)
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("month + 1 is always a valid calendar month for a valid (year, month)");
    let this_month_first =
        NaiveDate::from_ymd_opt(year, month, 1).expect("caller guarantees a valid month");
    (next_month_first - this_month_first).num_days() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_calendar_nonsense() {
        assert!(Instant::new(2024, 2, 30, 0, 0, 0).is_err());
        assert!(Instant::new(2024, 13, 1, 0, 0, 0).is_err());
    }

    #[test]
    fn accepts_leap_day() {
        assert!(Instant::new(2024, 2, 29, 12, 0, 0).is_ok());
        assert!(Instant::new(2023, 2, 29, 12, 0, 0).is_err());
    }

    #[test]
    fn time_of_day_rejects_out_of_range_components() {
        assert!(TimeOfDay::new(24, 0, 0).is_err());
        assert!(TimeOfDay::new(0, 60, 0).is_err());
        assert!(TimeOfDay::new(0, 0, 60).is_err());
        assert!(TimeOfDay::new(23, 59, 59).is_ok());
    }

    #[test]
    fn weekday_number_matches_iso() {
        // 2024-07-01 is a Monday.
        let monday = Instant::new(2024, 7, 1, 0, 0, 0).unwrap();
        assert_eq!(monday.weekday_number(), 1);
        let sunday = Instant::new(2024, 7, 7, 0, 0, 0).unwrap();
        assert_eq!(sunday.weekday_number(), 7);
    }

    #[test]
    fn days_in_month_accounts_for_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn add_span_crosses_month_boundaries() {
        let last_day = Instant::new(2024, 1, 31, 12, 0, 0).unwrap();
        let next = last_day.add_span(Span::hours(24));
        assert_eq!((next.year(), next.month(), next.day()), (2024, 2, 1));
    }
}
