//! Injectable clock for lifecycle evaluations
//!
//! Declarative planning must never read the wall clock implicitly: a plan
//! that consults `Utc::now()` mid-decision produces a different diff on
//! every run. All clock access goes through the [`Clock`] trait, and the
//! engine snapshots `now` exactly once per evaluation.

use chrono::{DateTime, Utc};

/// Source of the current instant, always normalized to UTC
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock returning a pinned instant
///
/// Used in tests and wherever a caller supplies an explicit base instead of
/// reading the system clock.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_returns_pinned_instant() {
        let pinned = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock(pinned);
        assert_eq!(clock.now(), pinned);
        assert_eq!(clock.now(), pinned);
    }

    #[test]
    fn system_clock_is_utc() {
        let now = SystemClock.now();
        assert_eq!(now.timezone(), Utc);
    }
}
