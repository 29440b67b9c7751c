//! Leaf predicate semantics: the actual `contains`/`boundary_after` math for
//! `Weekday`, `DayOfMonth` and `Timerange`. Kept separate from `expr.rs` (the
//! tree and its typing rules) and `continuous.rs`/`discrete.rs` (the generic
//! composite walk), the way the teacher kept `bitmap.rs` separate from the
//! grid that consumes it.

use std::num::NonZeroUsize;

use crate::bitmap::Bitmap;
use crate::error::BuildError;
use crate::time::{days_in_month, Instant, TimeOfDay};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DayOfMonthSpec {
    Single(i32),
    Range(i32, i32),
}

impl DayOfMonthSpec {
    pub(crate) fn single(d: i32) -> Result<Self, BuildError> {
        validate_day_index(d)?;
        Ok(Self::Single(d))
    }

    pub(crate) fn range(from: i32, to: i32) -> Result<Self, BuildError> {
        validate_day_index(from)?;
        validate_day_index(to)?;
        if from > to {
            return Err(BuildError::InvalidDayOfMonthRange { from, to });
        }
        Ok(Self::Range(from, to))
    }
}

fn validate_day_index(d: i32) -> Result<(), BuildError> {
    if d == 0 || !(-31..=31).contains(&d) {
        return Err(BuildError::InvalidDayOfMonth { d });
    }
    Ok(())
}

/// Resolves a 1-based-from-start or -1-based-from-end day index against a
/// month of `days_in_month` days. Returns `None` when the nominal day simply
/// doesn't exist that month (e.g. day 31 in April).
fn resolve_day(d: i32, days_in_month: u32) -> Option<u32> {
    let resolved = resolve_day_unclamped(d, days_in_month);
    if resolved >= 1 && resolved as u32 <= days_in_month {
        Some(resolved as u32)
    } else {
        None
    }
}

fn resolve_day_unclamped(d: i32, days_in_month: u32) -> i32 {
    if d > 0 {
        d
    } else {
        days_in_month as i32 + 1 + d
    }
}

fn day_bitmap_for_month(spec: &DayOfMonthSpec, year: i32, month: u32) -> Bitmap {
    let dim = days_in_month(year, month);
    let size = NonZeroUsize::new(31).unwrap();
    match spec {
        DayOfMonthSpec::Single(d) => {
            Bitmap::explicitly_set(size, resolve_day(*d, dim).map(|day| (day - 1) as usize))
        }
        DayOfMonthSpec::Range(from, to) => {
            let rf = resolve_day_unclamped(*from, dim);
            let rt = resolve_day_unclamped(*to, dim);
            let bits = (1..=dim).filter(move |&day| (day as i32) >= rf && (day as i32) <= rt);
            Bitmap::explicitly_set(size, bits.map(|day| (day - 1) as usize))
        }
    }
}

pub(crate) fn weekday_contains(n: u8, t: &Instant) -> bool {
    t.weekday_number() == n
}

/// The next midnight at which membership in `Weekday(n)` flips, i.e. the
/// next day whose weekday either becomes or stops being `n`.
pub(crate) fn weekday_boundary_after(
    n: u8,
    t: &Instant,
    horizon: &Instant,
) -> Option<(Instant, bool)> {
    let current = weekday_contains(n, t);
    let mut day = t.start_of_day().add_span(crate::time::Span::hours(24));
    loop {
        if day > *horizon {
            return None;
        }
        let value = weekday_contains(n, &day);
        if value != current {
            return Some((day, value));
        }
        day = day.add_span(crate::time::Span::hours(24));
    }
}

pub(crate) fn day_of_month_contains(spec: &DayOfMonthSpec, t: &Instant) -> bool {
    let bitmap = day_bitmap_for_month(spec, t.year(), t.month());
    bitmap.get((t.day() - 1) as usize)
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// The resolved day set is always a single contiguous run within a given
/// month (one day, or one from/to range), so the first day after `t` whose
/// membership differs from `t`'s is also the *only* such day up to the next
/// flip. Looking for entry into the set (`current == false`) walks the
/// month's `Bitmap` with `next_set`/`first_set` instead of re-deriving and
/// re-testing the day set one day at a time.
pub(crate) fn day_of_month_boundary_after(
    spec: &DayOfMonthSpec,
    t: &Instant,
    horizon: &Instant,
) -> Option<(Instant, bool)> {
    let (mut year, mut month) = (t.year(), t.month());
    let mut bitmap = day_bitmap_for_month(spec, year, month);
    let current = bitmap.get((t.day() - 1) as usize);
    let mut from: Option<usize> = Some((t.day() - 1) as usize);

    loop {
        let dim = days_in_month(year, month) as usize;
        let found = if current {
            // Bitmap exposes no "next unset" query; the exit day is found by
            // a direct scan, bounded by the length of this month.
            let start = from.map_or(0, |idx| idx + 1);
            (start..dim).find(|&idx| !bitmap.get(idx))
        } else {
            match from {
                Some(idx) => bitmap.next_set(idx),
                None => bitmap.first_set(),
            }
        };
        if let Some(day) = found {
            let instant = Instant::new(year, month, (day + 1) as u32, 0, 0, 0).ok()?;
            return (instant <= *horizon).then_some((instant, !current));
        }
        let (next_year, next_month_num) = next_month(year, month);
        let first_of_next_month = Instant::new(next_year, next_month_num, 1, 0, 0, 0).ok()?;
        if first_of_next_month > *horizon {
            return None;
        }
        year = next_year;
        month = next_month_num;
        bitmap = day_bitmap_for_month(spec, year, month);
        from = None;
    }
}

pub(crate) fn timerange_contains(start: &TimeOfDay, end: &TimeOfDay, t: &Instant) -> bool {
    if start == end {
        return false;
    }
    let now = t.time_of_day().seconds_in_day();
    let s = start.seconds_in_day();
    let e = end.seconds_in_day();
    if s < e {
        now >= s && now < e
    } else {
        // Wraps past midnight, e.g. 22:00-06:00.
        now >= s || now < e
    }
}

pub(crate) fn timerange_boundary_after(
    start: &TimeOfDay,
    end: &TimeOfDay,
    t: &Instant,
    horizon: &Instant,
) -> Option<(Instant, bool)> {
    if start == end {
        return None;
    }
    let today = t.start_of_day();
    let tomorrow = today.add_span(crate::time::Span::hours(24));
    let mut candidates = vec![
        today.with_time_of_day(*start),
        today.with_time_of_day(*end),
        tomorrow.with_time_of_day(*start),
        tomorrow.with_time_of_day(*end),
    ];
    candidates.retain(|candidate| candidate > t);
    candidates.sort();
    let next = candidates.into_iter().next()?;
    if next > *horizon {
        return None;
    }
    Some((next, timerange_contains(start, end, &next)))
}
