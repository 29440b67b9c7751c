use chrono::Utc;

use crate::time::Instant;

/// Supplies the current instant. `Expr::every` reads the clock exactly once,
/// at construction time, to fix the phase of the period: the resulting
/// sequence is anchored at the instant the expression was built, not
/// recomputed relative to whatever `t` is later passed to `next`.
///
/// Modelled on the teacher's `TimeProvider`/`ChronoTimeProvider` split: the
/// trait is the seam, `SystemClock` is the real implementation, and tests
/// inject a fixed clock instead of depending on wall-clock time.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The default `Clock`, backed by the system's real-time clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::from_naive(Utc::now().naive_utc())
    }
}

/// A `Clock` fixed to a single instant, for deterministic tests of
/// `Expr::every`'s anchoring behaviour.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub Instant);

impl Clock for FixedClock {
    fn now(&self) -> Instant {
        self.0
    }
}
