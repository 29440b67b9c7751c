use std::ops::{BitAnd, BitOr, Not as StdNot};

use crate::clock::{Clock, SystemClock};
use crate::error::BuildError;
use crate::predicate::DayOfMonthSpec;
use crate::time::{IntoTimeOfDay, Instant, Span, TimeOfDay};

/// Whether an expression's truth value traces out a set of *intervals*
/// (`Continuous`) or a set of *isolated instants* (`Discrete`). Computed
/// once, at construction time, by the typing rules in `and`/`or`/`not`, and
/// never recomputed afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Continuous,
    Discrete,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Node {
    Weekday(u8),
    DayOfMonth(DayOfMonthSpec),
    Timerange(TimeOfDay, TimeOfDay),
    At(TimeOfDay),
    Every { period_seconds: u64, anchor: Instant },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

/// A node in the boolean-algebra expression tree: a leaf predicate, or an
/// `And`/`Or`/`Not` composition of other expressions.
///
/// Expressions are immutable once built; every constructor validates the
/// typing rules below and returns `Err` rather than building something that
/// can't be evaluated.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub(crate) kind: Kind,
    pub(crate) node: Node,
}

impl Expr {
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_continuous(&self) -> bool {
        self.kind == Kind::Continuous
    }

    pub fn is_discrete(&self) -> bool {
        self.kind == Kind::Discrete
    }

    // ---- leaves: continuous ----

    pub fn weekday(n: i32) -> Result<Expr, BuildError> {
        if !(1..=7).contains(&n) {
            return Err(BuildError::InvalidWeekday { n });
        }
        Ok(Expr {
            kind: Kind::Continuous,
            node: Node::Weekday(n as u8),
        })
    }

    pub fn monday() -> Expr {
        Self::weekday(1).expect("1 is always a valid weekday")
    }
    pub fn tuesday() -> Expr {
        Self::weekday(2).expect("2 is always a valid weekday")
    }
    pub fn wednesday() -> Expr {
        Self::weekday(3).expect("3 is always a valid weekday")
    }
    pub fn thursday() -> Expr {
        Self::weekday(4).expect("4 is always a valid weekday")
    }
    pub fn friday() -> Expr {
        Self::weekday(5).expect("5 is always a valid weekday")
    }
    pub fn saturday() -> Expr {
        Self::weekday(6).expect("6 is always a valid weekday")
    }
    pub fn sunday() -> Expr {
        Self::weekday(7).expect("7 is always a valid weekday")
    }

    pub fn day_of_month(d: i32) -> Result<Expr, BuildError> {
        Ok(Expr {
            kind: Kind::Continuous,
            node: Node::DayOfMonth(DayOfMonthSpec::single(d)?),
        })
    }

    pub fn day_of_month_range(from: i32, to: i32) -> Result<Expr, BuildError> {
        Ok(Expr {
            kind: Kind::Continuous,
            node: Node::DayOfMonth(DayOfMonthSpec::range(from, to)?),
        })
    }

    pub fn timerange(
        start: impl IntoTimeOfDay,
        end: impl IntoTimeOfDay,
    ) -> Result<Expr, BuildError> {
        let start = start.into_time_of_day()?;
        let end = end.into_time_of_day()?;
        Ok(Expr {
            kind: Kind::Continuous,
            node: Node::Timerange(start, end),
        })
    }

    // ---- leaves: discrete ----

    pub fn at(moment: impl IntoTimeOfDay) -> Result<Expr, BuildError> {
        let tod = moment.into_time_of_day()?;
        Ok(Expr {
            kind: Kind::Discrete,
            node: Node::At(tod),
        })
    }

    /// A periodic discrete predicate firing every `period`, phase-anchored to
    /// now. See `every_with_clock` to fix the anchor explicitly (tests should
    /// use that rather than relying on wall-clock time).
    pub fn every(period: Span) -> Result<Expr, BuildError> {
        Self::every_with_clock(period, &SystemClock)
    }

    pub fn every_with_clock(period: Span, clock: &dyn Clock) -> Result<Expr, BuildError> {
        let seconds = period.as_seconds();
        if seconds == 0 {
            return Err(BuildError::NonPositivePeriod { seconds: 0 });
        }
        Ok(Expr {
            kind: Kind::Discrete,
            node: Node::Every {
                period_seconds: seconds,
                anchor: clock.now(),
            },
        })
    }

    pub fn every_seconds(n: u64) -> Result<Expr, BuildError> {
        Self::every(Span::seconds(n))
    }

    pub fn every_minutes(n: u64) -> Result<Expr, BuildError> {
        Self::every(Span::minutes(n))
    }

    pub fn every_hours(n: u64) -> Result<Expr, BuildError> {
        Self::every(Span::hours(n))
    }

    // ---- composition ----

    /// Conjoins `children`. At most one child may be discrete; the result is
    /// discrete if so, continuous otherwise. Nested `And`s are flattened
    /// first, and a single remaining child is returned unwrapped.
    pub fn and(children: Vec<Expr>) -> Result<Expr, BuildError> {
        if children.is_empty() {
            return Err(BuildError::EmptyAnd);
        }
        let flat = flatten_and(children);
        if flat.len() == 1 {
            return Ok(into_single("and", flat));
        }
        let discrete_count = flat.iter().filter(|e| e.is_discrete()).count();
        let kind = match discrete_count {
            0 => Kind::Continuous,
            1 => Kind::Discrete,
            _ => return Err(BuildError::DiscreteAndDiscrete),
        };
        Ok(Expr {
            kind,
            node: Node::And(flat),
        })
    }

    /// Disjoins `children`. All children must share the same kind. Nested
    /// `Or`s are flattened first, and a single remaining child is returned
    /// unwrapped.
    pub fn or(children: Vec<Expr>) -> Result<Expr, BuildError> {
        if children.is_empty() {
            return Err(BuildError::EmptyOr);
        }
        let flat = flatten_or(children);
        if flat.len() == 1 {
            return Ok(into_single("or", flat));
        }
        let discrete_count = flat.iter().filter(|e| e.is_discrete()).count();
        let kind = if discrete_count == 0 {
            Kind::Continuous
        } else if discrete_count == flat.len() {
            Kind::Discrete
        } else {
            return Err(BuildError::ContinuousOrDiscrete);
        };
        Ok(Expr {
            kind,
            node: Node::Or(flat),
        })
    }

    /// Negates `child`, which must be continuous (negating a discrete
    /// expression, a set of isolated instants, has no sensible continuous or
    /// discrete meaning).
    pub fn not(child: Expr) -> Result<Expr, BuildError> {
        if child.is_discrete() {
            return Err(BuildError::NotOfDiscrete);
        }
        Ok(Expr {
            kind: Kind::Continuous,
            node: Node::Not(Box::new(child)),
        })
    }
}

fn flatten(
    connective: &'static str,
    children: Vec<Expr>,
    same_connective: impl Fn(&Node) -> Option<&Vec<Expr>>,
) -> Vec<Expr> {
    let before = children.len();
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        match same_connective(&child.node) {
            Some(inner) => flat.extend(inner.iter().cloned()),
            None => flat.push(child),
        }
    }
    if flat.len() != before {
        tracing::debug!(connective, before, after = flat.len(), "flattened a nested connective");
    }
    flat
}

fn flatten_and(children: Vec<Expr>) -> Vec<Expr> {
    flatten("and", children, |node| match node {
        Node::And(inner) => Some(inner),
        _ => None,
    })
}

fn flatten_or(children: Vec<Expr>) -> Vec<Expr> {
    flatten("or", children, |node| match node {
        Node::Or(inner) => Some(inner),
        _ => None,
    })
}

fn into_single(connective: &'static str, mut flat: Vec<Expr>) -> Expr {
    tracing::debug!(connective, "unary connective collapsed to its single child");
    flat.pop().expect("caller checked len() == 1")
}

impl BitAnd for Expr {
    type Output = Result<Expr, BuildError>;
    fn bitand(self, rhs: Expr) -> Self::Output {
        Expr::and(vec![self, rhs])
    }
}

impl BitOr for Expr {
    type Output = Result<Expr, BuildError>;
    fn bitor(self, rhs: Expr) -> Self::Output {
        Expr::or(vec![self, rhs])
    }
}

impl StdNot for Expr {
    type Output = Result<Expr, BuildError>;
    fn not(self) -> Self::Output {
        Expr::not(self)
    }
}

#[cfg(test)]
mod tests {
    use ntest::test_case;

    use super::*;

    #[test_case(0)]
    #[test_case(8)]
    #[test_case(-1)]
    #[test_case(100)]
    fn weekday_rejects_out_of_range(n: i32) {
        assert!(Expr::weekday(n).is_err());
    }

    #[test_case(1)]
    #[test_case(4)]
    #[test_case(7)]
    fn weekday_accepts_one_through_seven(n: i32) {
        assert!(Expr::weekday(n).is_ok());
    }

    #[test]
    fn continuous_and_continuous_is_continuous() {
        let e = Expr::and(vec![Expr::monday(), Expr::timerange("09:00", "17:00").unwrap()]).unwrap();
        assert!(e.is_continuous());
    }

    #[test]
    fn continuous_and_discrete_is_discrete() {
        let e = Expr::and(vec![Expr::monday(), Expr::at("09:00").unwrap()]).unwrap();
        assert!(e.is_discrete());
    }

    #[test]
    fn discrete_and_discrete_is_rejected() {
        let e = Expr::and(vec![Expr::at("09:00").unwrap(), Expr::at("10:00").unwrap()]);
        assert_eq!(e, Err(BuildError::DiscreteAndDiscrete));
    }

    #[test]
    fn continuous_or_discrete_is_rejected() {
        let e = Expr::or(vec![Expr::monday(), Expr::at("09:00").unwrap()]);
        assert_eq!(e, Err(BuildError::ContinuousOrDiscrete));
    }

    #[test]
    fn or_of_discretes_is_discrete() {
        let e = Expr::or(vec![Expr::at("09:00").unwrap(), Expr::at("10:00").unwrap()]).unwrap();
        assert!(e.is_discrete());
    }

    #[test]
    fn not_of_discrete_is_rejected() {
        assert_eq!(Expr::not(Expr::at("09:00").unwrap()), Err(BuildError::NotOfDiscrete));
    }

    #[test]
    fn not_of_continuous_is_continuous() {
        assert!(Expr::not(Expr::monday()).unwrap().is_continuous());
    }

    #[test]
    fn nested_and_flattens() {
        let inner = Expr::and(vec![Expr::monday(), Expr::tuesday()]).unwrap();
        let outer = Expr::and(vec![inner, Expr::wednesday()]).unwrap();
        match &outer.node {
            Node::And(children) => assert_eq!(children.len(), 3),
            _ => panic!("expected a flattened And"),
        }
    }

    #[test]
    fn unary_and_reduces_to_its_child() {
        let e = Expr::and(vec![Expr::monday()]).unwrap();
        assert_eq!(e, Expr::monday());
    }

    #[test]
    fn operator_overloads_delegate_to_builders() {
        let via_op = (Expr::monday() & Expr::timerange("09:00", "17:00").unwrap()).unwrap();
        let via_fn = Expr::and(vec![Expr::monday(), Expr::timerange("09:00", "17:00").unwrap()]).unwrap();
        assert_eq!(via_op, via_fn);
    }

    #[test]
    fn empty_and_or_are_rejected() {
        assert_eq!(Expr::and(vec![]), Err(BuildError::EmptyAnd));
        assert_eq!(Expr::or(vec![]), Err(BuildError::EmptyOr));
    }
}
