//! A boolean algebra over time.
//!
//! Build up an [`Expr`] out of leaf predicates — [`Expr::weekday`],
//! [`Expr::day_of_month`], [`Expr::timerange`], [`Expr::at`], [`Expr::every`]
//! — compose them with `&`/`|`/`!` (or [`Expr::and`]/[`Expr::or`]/[`Expr::not`]),
//! and ask the result for its next firing instant with [`Expr::next`].
//!
//! Every leaf, and every `And`/`Or`/`Not` of them, is either *continuous*
//! (true over stretches of time, like "Monday" or "09:00-17:00") or
//! *discrete* (true at isolated instants, like "every 15 minutes"). The
//! typing rules enforced by [`Expr::and`]/[`Expr::or`]/[`Expr::not`] make
//! sure you can only ever build expressions with a well-defined `next`.

mod bitmap;
mod clock;
mod continuous;
mod discrete;
mod error;
mod expr;
mod parse;
mod predicate;
mod time;

pub use clock::{Clock, FixedClock, SystemClock};
pub use discrete::DEFAULT_HORIZON;
pub use error::{BuildError, EvalError};
pub use expr::{Expr, Kind};
pub use parse::{parse_instant, parse_time_of_day};
pub use time::{Instant, IntoTimeOfDay, Span, TimeOfDay};


#[cfg(test)]
mod scenario_tests {
    use super::*;

    fn i(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Instant {
        Instant::new(y, mo, d, h, mi, s).unwrap()
    }

    /// A plain weekly recurrence, "every Monday at 09:00".
    #[test]
    fn weekly_meeting() {
        let meeting = Expr::and(vec![Expr::monday(), Expr::at("09:00").unwrap()]).unwrap();
        let next = meeting.next(&i(2024, 7, 1, 9, 0, 1)).unwrap();
        assert_eq!(next, i(2024, 7, 8, 9, 0, 0));
    }

    /// Weekends, built from an Or of two continuous leaves.
    #[test]
    fn weekend_window() {
        let weekend = Expr::or(vec![Expr::saturday(), Expr::sunday()]).unwrap();
        assert!(weekend.is_continuous());
        assert!(weekend.contains(&i(2024, 7, 6, 12, 0, 0)));
        assert!(!weekend.contains(&i(2024, 7, 8, 12, 0, 0)));
    }

    /// Business hours on business days, i.e. weekday AND timerange AND NOT a holiday.
    #[test]
    fn business_hours_excluding_a_holiday() {
        let holiday = Expr::day_of_month(4).unwrap();
        let weekday = Expr::or(vec![
            Expr::monday(),
            Expr::tuesday(),
            Expr::wednesday(),
            Expr::thursday(),
            Expr::friday(),
        ])
        .unwrap();
        let business_hours = Expr::and(vec![
            weekday,
            Expr::timerange("09:00", "17:00").unwrap(),
            Expr::not(holiday).unwrap(),
        ])
        .unwrap();
        assert!(business_hours.contains(&i(2024, 7, 1, 10, 0, 0))); // Monday, not the 4th
        assert!(!business_hours.contains(&i(2024, 7, 4, 10, 0, 0))); // excluded holiday
        assert!(!business_hours.contains(&i(2024, 7, 1, 20, 0, 0))); // outside hours
    }

    /// A bounded discrete reminder gated by a continuous window, "every 20 minutes during business hours".
    #[test]
    fn periodic_reminder_during_business_hours() {
        let anchor = i(2024, 7, 1, 0, 0, 0);
        let every_20 = Expr::every_with_clock(Span::minutes(20), &FixedClock(anchor)).unwrap();
        let reminder =
            Expr::and(vec![Expr::timerange("09:00", "17:00").unwrap(), every_20]).unwrap();
        assert!(reminder.is_discrete());
        let next = reminder.next(&i(2024, 7, 1, 8, 50, 0)).unwrap();
        assert_eq!(next, i(2024, 7, 1, 9, 0, 0));
        let next_after = reminder.next(&i(2024, 7, 1, 16, 55, 0)).unwrap();
        assert_eq!(next_after, i(2024, 7, 2, 9, 0, 0));
    }

    /// Composing two discrete predicates with Or is allowed, with And it is not.
    #[test]
    fn two_discretes_combine_with_or_not_and() {
        let nine = Expr::at("09:00").unwrap();
        let five = Expr::at("17:00").unwrap();
        assert!(Expr::or(vec![nine.clone(), five.clone()]).unwrap().is_discrete());
        assert_eq!(Expr::and(vec![nine, five]), Err(BuildError::DiscreteAndDiscrete));
    }

    /// Negating a discrete expression is rejected outright, not silently coerced.
    #[test]
    fn negating_a_discrete_expression_is_rejected() {
        assert_eq!(Expr::not(Expr::at("09:00").unwrap()), Err(BuildError::NotOfDiscrete));
    }

    /// An expression that can never fire within the horizon reports that, instead of hanging.
    #[test]
    fn impossible_schedule_reports_no_match_within_horizon() {
        let noon = TimeOfDay::new(12, 0, 0).unwrap();
        let never = Expr::timerange(noon, noon).unwrap(); // empty interval, never open
        let reminder = Expr::and(vec![never, Expr::at("09:00").unwrap()]).unwrap();
        assert_eq!(
            reminder.next(&i(2024, 1, 1, 0, 0, 0)),
            Err(EvalError::NoMatchWithinHorizon)
        );
    }

    /// `every`'s phase is fixed when built, not recomputed relative to the query instant.
    #[test]
    fn every_keeps_its_anchor_regardless_of_query_time() {
        let anchor = i(2024, 1, 1, 0, 10, 0);
        let every_15 = Expr::every_with_clock(Span::minutes(15), &FixedClock(anchor)).unwrap();
        let a = every_15.next(&i(2024, 3, 1, 0, 0, 0)).unwrap();
        let b = every_15.next(&a.add_span(Span::seconds(1))).unwrap();
        assert_eq!(b.seconds_since(&a), 15 * 60);
    }
}
