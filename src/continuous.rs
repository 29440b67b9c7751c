//! The continuous evaluator: `contains`/`boundary_after` over the predicates
//! whose truth value traces out a set of intervals. Every function here is
//! only ever called on an `Expr` (or slice of `Expr`s) known to be
//! continuous — `discrete.rs` is responsible for routing discrete nodes
//! elsewhere and for folding a discrete `And`'s continuous operands into the
//! single gate these functions expect.

use crate::expr::{Expr, Node};
use crate::predicate::{
    day_of_month_boundary_after, day_of_month_contains, timerange_boundary_after,
    timerange_contains, weekday_boundary_after, weekday_contains,
};
use crate::time::Instant;

impl Expr {
    /// Whether this (continuous) expression holds at `t`.
    pub(crate) fn contains(&self, t: &Instant) -> bool {
        match &self.node {
            Node::Weekday(n) => weekday_contains(*n, t),
            Node::DayOfMonth(spec) => day_of_month_contains(spec, t),
            Node::Timerange(start, end) => timerange_contains(start, end, t),
            Node::And(children) => and_contains(children, t),
            Node::Or(children) => children.iter().any(|c| c.contains(t)),
            Node::Not(child) => !child.contains(t),
            Node::At(_) | Node::Every { .. } => {
                unreachable!("contains() is only called on continuous expressions")
            }
        }
    }

    /// The smallest instant strictly after `t`, and not after `horizon`, at
    /// which `contains` changes value. `None` if no such instant exists
    /// within the horizon.
    pub(crate) fn boundary_after(&self, t: &Instant, horizon: &Instant) -> Option<(Instant, bool)> {
        match &self.node {
            Node::Weekday(n) => weekday_boundary_after(*n, t, horizon),
            Node::DayOfMonth(spec) => day_of_month_boundary_after(spec, t, horizon),
            Node::Timerange(start, end) => timerange_boundary_after(start, end, t, horizon),
            Node::And(children) => and_boundary_after(children, t, horizon),
            Node::Or(children) => or_boundary_after(children, t, horizon),
            Node::Not(child) => child
                .boundary_after(t, horizon)
                .map(|(instant, value)| (instant, !value)),
            Node::At(_) | Node::Every { .. } => {
                unreachable!("boundary_after() is only called on continuous expressions")
            }
        }
    }

    /// The smallest instant `s >= t`, not after `horizon`, at which this
    /// (continuous) expression holds. Used by the discrete `And` gate to
    /// jump forward to the next open interval instead of ticking second by
    /// second.
    pub(crate) fn next_entry(&self, t: &Instant, horizon: &Instant) -> Option<Instant> {
        next_entry_over(|at| self.contains(at), |at| self.boundary_after(at, horizon), t, horizon)
    }
}

pub(crate) fn and_contains(children: &[Expr], t: &Instant) -> bool {
    children.iter().all(|c| c.contains(t))
}

pub(crate) fn and_boundary_after(
    children: &[Expr],
    t: &Instant,
    horizon: &Instant,
) -> Option<(Instant, bool)> {
    let starting_value = and_contains(children, t);
    let mut cursor = *t;
    loop {
        let candidate = children
            .iter()
            .filter_map(|c| c.boundary_after(&cursor, horizon))
            .map(|(instant, _)| instant)
            .min()?;
        if candidate > *horizon {
            return None;
        }
        let value = and_contains(children, &candidate);
        if value != starting_value {
            return Some((candidate, value));
        }
        cursor = candidate;
    }
}

/// Jumps forward to the next instant at which every child in `children`
/// holds simultaneously, without assuming anything in particular about how
/// they're connected beyond "all of them" (used by the discrete `And` gate,
/// where `children` are the continuous operands siblinging a discrete one).
pub(crate) fn and_next_entry(children: &[Expr], t: &Instant, horizon: &Instant) -> Option<Instant> {
    next_entry_over(
        |at| and_contains(children, at),
        |at| and_boundary_after(children, at, horizon),
        t,
        horizon,
    )
}

fn or_boundary_after(children: &[Expr], t: &Instant, horizon: &Instant) -> Option<(Instant, bool)> {
    let starting_value = children.iter().any(|c| c.contains(t));
    let mut cursor = *t;
    loop {
        let candidate = children
            .iter()
            .filter_map(|c| c.boundary_after(&cursor, horizon))
            .map(|(instant, _)| instant)
            .min()?;
        if candidate > *horizon {
            return None;
        }
        let value = children.iter().any(|c| c.contains(&candidate));
        if value != starting_value {
            return Some((candidate, value));
        }
        cursor = candidate;
    }
}

fn next_entry_over(
    contains: impl Fn(&Instant) -> bool,
    boundary_after: impl Fn(&Instant) -> Option<(Instant, bool)>,
    t: &Instant,
    horizon: &Instant,
) -> Option<Instant> {
    if t > horizon {
        return None;
    }
    if contains(t) {
        return Some(*t);
    }
    let mut cursor = *t;
    loop {
        let (candidate, value) = boundary_after(&cursor)?;
        if candidate > *horizon {
            return None;
        }
        if value {
            return Some(candidate);
        }
        cursor = candidate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Instant;

    fn i(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Instant {
        Instant::new(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn and_of_weekday_and_timerange_is_open_only_during_the_overlap() {
        let e = Expr::and(vec![Expr::monday(), Expr::timerange("09:00", "17:00").unwrap()]).unwrap();
        assert!(e.contains(&i(2024, 7, 1, 10, 0, 0))); // Monday, 10:00
        assert!(!e.contains(&i(2024, 7, 1, 20, 0, 0))); // Monday, 20:00
        assert!(!e.contains(&i(2024, 7, 2, 10, 0, 0))); // Tuesday, 10:00
    }

    #[test]
    fn next_entry_jumps_across_days_without_ticking_seconds() {
        let e = Expr::and(vec![Expr::monday(), Expr::timerange("09:00", "17:00").unwrap()]).unwrap();
        let horizon = i(2025, 1, 1, 0, 0, 0);
        let entry = e
            .next_entry(&i(2024, 7, 1, 20, 0, 0), &horizon)
            .expect("Monday 9-5 recurs weekly");
        assert_eq!((entry.year(), entry.month(), entry.day()), (2024, 7, 8));
    }

    #[test]
    fn not_inverts_the_underlying_predicate() {
        let e = Expr::not(Expr::monday()).unwrap();
        assert!(!e.contains(&i(2024, 7, 1, 0, 0, 0)));
        assert!(e.contains(&i(2024, 7, 2, 0, 0, 0)));
    }

    #[test]
    fn or_is_open_whenever_any_child_is() {
        let e = Expr::or(vec![Expr::saturday(), Expr::sunday()]).unwrap();
        assert!(e.contains(&i(2024, 7, 6, 0, 0, 0))); // Saturday
        assert!(e.contains(&i(2024, 7, 7, 0, 0, 0))); // Sunday
        assert!(!e.contains(&i(2024, 7, 8, 0, 0, 0))); // Monday
    }
}
