use derive_more::{Display, Error};

/// Errors raised while building an `Expr` or a `TimeOfDay`/`Instant`: bad
/// parameters, or an attempt to compose predicates in a way the algebra
/// forbids (see the typing rules on `Expr::and`/`or`/`not`).
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[display(fmt = "And() needs at least one operand")]
    EmptyAnd,
    #[display(fmt = "Or() needs at least one operand")]
    EmptyOr,
    #[display(
        fmt = "cannot AND two discrete expressions together (at most one operand of And() may be discrete)"
    )]
    DiscreteAndDiscrete,
    #[display(
        fmt = "cannot OR a continuous expression with a discrete one (Or() operands must all be continuous or all be discrete)"
    )]
    ContinuousOrDiscrete,
    #[display(fmt = "cannot negate a discrete expression")]
    NotOfDiscrete,
    #[display(fmt = "weekday must be between 1 (Monday) and 7 (Sunday), got {n}")]
    InvalidWeekday { n: i32 },
    #[display(
        fmt = "day-of-month index {d} is out of range (expected 1..=31 counting from the start of the month, or -31..=-1 counting from the end)"
    )]
    InvalidDayOfMonth { d: i32 },
    #[display(fmt = "day-of-month range start {from} is greater than end {to}")]
    InvalidDayOfMonthRange { from: i32, to: i32 },
    #[display(fmt = "{component} is out of range: {value}")]
    InvalidTimeComponent { component: &'static str, value: u32 },
    #[display(fmt = "{year:04}-{month:02}-{day:02} is not a valid calendar date")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[display(fmt = "every() period must be a positive number of seconds, got {seconds}")]
    NonPositivePeriod { seconds: i64 },
    #[display(fmt = "could not parse {kind} from {input:?}")]
    Parse { kind: &'static str, input: String },
}

/// Errors raised while evaluating `Expr::next`.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    #[display(fmt = "next() was called on an expression whose root is not discrete")]
    NotDiscreteRoot,
    #[display(fmt = "no firing instant was found within the search horizon")]
    NoMatchWithinHorizon,
}
