//! The discrete evaluator: `Expr::next`, the only externally useful endpoint
//! of this whole algebra. Only ever called on an expression whose root is
//! discrete; leaves (`At`, `Every`) compute their next firing directly,
//! `Or` takes the earliest firing among its children, and `And` gates a
//! single discrete child against the conjunction of its continuous siblings
//! by jumping from firing to firing rather than ticking second by second.

use crate::continuous::and_next_entry;
use crate::error::EvalError;
use crate::expr::{Expr, Kind, Node};
use crate::time::{Instant, Span};

/// How far into the future `next` will search before giving up. Ten years
/// bounds the search for any realistic schedule while still being far larger
/// than any legitimate gap between firings.
pub const DEFAULT_HORIZON: Span = Span::days(3650);

impl Expr {
    /// The next instant at or after `t` at which this expression fires.
    /// Errors if the root isn't discrete, or if no firing instant exists
    /// within `DEFAULT_HORIZON`.
    pub fn next(&self, t: &Instant) -> Result<Instant, EvalError> {
        self.next_with_horizon(t, DEFAULT_HORIZON)
    }

    /// Like `next`, but with an explicit search horizon instead of the
    /// default ten years.
    pub fn next_with_horizon(&self, t: &Instant, horizon: Span) -> Result<Instant, EvalError> {
        if self.kind != Kind::Discrete {
            return Err(EvalError::NotDiscreteRoot);
        }
        let horizon_instant = t.add_span(horizon);
        let result = self.next_discrete(t, &horizon_instant);
        if result.is_none() {
            tracing::warn!(
                from = %t,
                horizon = %horizon_instant,
                "no firing instant found within the search horizon"
            );
        }
        result.ok_or(EvalError::NoMatchWithinHorizon)
    }

    fn next_discrete(&self, t: &Instant, horizon: &Instant) -> Option<Instant> {
        if t > horizon {
            return None;
        }
        match &self.node {
            Node::At(tod) => {
                let candidate = at_next(tod, t);
                (candidate <= *horizon).then_some(candidate)
            }
            Node::Every { period_seconds, anchor } => {
                let candidate = every_next(*period_seconds, anchor, t);
                (candidate <= *horizon).then_some(candidate)
            }
            Node::Or(children) => children
                .iter()
                .filter_map(|c| c.next_discrete(t, horizon))
                .min(),
            Node::And(children) => and_next_discrete(children, t, horizon),
            Node::Weekday(_) | Node::DayOfMonth(_) | Node::Timerange(_, _) | Node::Not(_) => {
                unreachable!("next_discrete() is only called on discrete expressions")
            }
        }
    }
}

fn at_next(tod: &crate::time::TimeOfDay, t: &Instant) -> Instant {
    let today_at = t.start_of_day().with_time_of_day(*tod);
    if *t <= today_at {
        today_at
    } else {
        today_at.add_span(Span::hours(24))
    }
}

fn every_next(period_seconds: u64, anchor: &Instant, t: &Instant) -> Instant {
    let period = period_seconds as i64;
    let diff = t.seconds_since(anchor);
    let steps = ceil_div(diff, period);
    anchor.add_seconds(steps * period)
}

/// `ceil(numerator / denominator)` for a positive `denominator` and any-sign
/// `numerator`, using Euclidean division so the result is correct for `t`
/// instants both before and after `anchor`.
fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    let floor = numerator.div_euclid(denominator);
    let remainder = numerator.rem_euclid(denominator);
    if remainder > 0 {
        floor + 1
    } else {
        floor
    }
}

/// Finds the single discrete child among `children` (exactly one is
/// guaranteed by `Expr::and`'s typing rule) and the continuous siblings that
/// must also hold, then walks discrete firings forward until one lands
/// inside the continuous gate.
fn and_next_discrete(children: &[Expr], t: &Instant, horizon: &Instant) -> Option<Instant> {
    let discrete_index = children.iter().position(|c| c.is_discrete())?;
    let discrete_child = &children[discrete_index];
    let continuous: Vec<Expr> = children
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != discrete_index)
        .map(|(_, c)| c.clone())
        .collect();

    let mut cursor = *t;
    loop {
        if cursor > *horizon {
            return None;
        }
        let candidate = discrete_child.next_discrete(&cursor, horizon)?;
        if candidate > *horizon {
            return None;
        }
        if crate::continuous::and_contains(&continuous, &candidate) {
            return Some(candidate);
        }
        cursor = and_next_entry(&continuous, &candidate, horizon)?;
    }
}
