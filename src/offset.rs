//! Offset specification and calendar arithmetic
//!
//! An [`OffsetSpec`] is a sparse record of signed magnitudes, at most one of
//! which callers are expected to populate. Years/months/days are added with
//! calendar semantics (variable month lengths, leap years, day-of-month
//! pinned to the last valid day of a shorter target month); hours, minutes
//! and seconds are fixed durations.
//!
//! When more than one unit is populated, resolution follows a fixed order
//! and does **not** compose: every unit is applied to the original base and
//! the last populated unit in [`RESOLUTION_ORDER`] is the one retained. The
//! order is days, hours, minutes, months, seconds, years.

use chrono::{DateTime, Days, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{TemporalError, TemporalResult};

/// A single offset unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OffsetUnit {
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
}

/// Fixed resolution order for multi-unit specs: the last populated unit in
/// this order wins, applied to the original base.
pub const RESOLUTION_ORDER: [OffsetUnit; 6] = [
    OffsetUnit::Days,
    OffsetUnit::Hours,
    OffsetUnit::Minutes,
    OffsetUnit::Months,
    OffsetUnit::Seconds,
    OffsetUnit::Years,
];

/// Sparse record of signed offset magnitudes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetSpec {
    pub years: Option<i64>,
    pub months: Option<i64>,
    pub days: Option<i64>,
    pub hours: Option<i64>,
    pub minutes: Option<i64>,
    pub seconds: Option<i64>,
}

impl OffsetSpec {
    pub fn years(n: i64) -> Self {
        Self { years: Some(n), ..Self::default() }
    }

    pub fn months(n: i64) -> Self {
        Self { months: Some(n), ..Self::default() }
    }

    pub fn days(n: i64) -> Self {
        Self { days: Some(n), ..Self::default() }
    }

    pub fn hours(n: i64) -> Self {
        Self { hours: Some(n), ..Self::default() }
    }

    pub fn minutes(n: i64) -> Self {
        Self { minutes: Some(n), ..Self::default() }
    }

    pub fn seconds(n: i64) -> Self {
        Self { seconds: Some(n), ..Self::default() }
    }

    /// Magnitude for a given unit, if populated
    pub fn get(&self, unit: OffsetUnit) -> Option<i64> {
        match unit {
            OffsetUnit::Years => self.years,
            OffsetUnit::Months => self.months,
            OffsetUnit::Days => self.days,
            OffsetUnit::Hours => self.hours,
            OffsetUnit::Minutes => self.minutes,
            OffsetUnit::Seconds => self.seconds,
        }
    }

    /// True when no unit is populated
    pub fn is_empty(&self) -> bool {
        RESOLUTION_ORDER.iter().all(|&u| self.get(u).is_none())
    }

    /// Magnitudes in wire order (years, months, days, hours, minutes,
    /// seconds), zero for unset
    pub fn magnitudes(&self) -> [i64; 6] {
        [
            self.years.unwrap_or(0),
            self.months.unwrap_or(0),
            self.days.unwrap_or(0),
            self.hours.unwrap_or(0),
            self.minutes.unwrap_or(0),
            self.seconds.unwrap_or(0),
        ]
    }

    /// The unit whose addition is retained under the fixed resolution order
    ///
    /// Each unit in [`RESOLUTION_ORDER`] is applied to the original base,
    /// never accumulated, so the last populated one determines the result.
    pub fn effective(&self) -> TemporalResult<(OffsetUnit, i64)> {
        let mut retained = None;
        for &unit in RESOLUTION_ORDER.iter() {
            if let Some(magnitude) = self.get(unit) {
                retained = Some((unit, magnitude));
            }
        }
        retained.ok_or_else(|| {
            TemporalError::configuration("at least one offset unit must be populated")
        })
    }
}

/// How a rotation target is derived: by offset from the base, or supplied
/// directly as an absolute instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationSpec {
    Offset(OffsetSpec),
    Absolute(DateTime<Utc>),
}

impl RotationSpec {
    /// Validate before any arithmetic runs
    pub fn validate(&self) -> TemporalResult<()> {
        match self {
            RotationSpec::Offset(spec) => spec.effective().map(|_| ()),
            RotationSpec::Absolute(_) => Ok(()),
        }
    }
}

/// Add a single signed unit to a base instant
///
/// Years and months use calendar-aware month addition; when the target
/// month is shorter, the day-of-month is pinned to its last valid day
/// (`2024-01-31` + 1 month = `2024-02-29`). Days, hours, minutes and
/// seconds cross month and year boundaries through the underlying absolute
/// representation.
pub fn add_offset(
    base: DateTime<Utc>,
    unit: OffsetUnit,
    magnitude: i64,
) -> TemporalResult<DateTime<Utc>> {
    let out_of_range =
        || TemporalError::Format(format!("offset {magnitude} {unit:?} out of range"));

    let result = match unit {
        OffsetUnit::Years | OffsetUnit::Months => {
            let months = if unit == OffsetUnit::Years {
                magnitude.checked_mul(12).ok_or_else(out_of_range)?
            } else {
                magnitude
            };
            let span = Months::new(
                u32::try_from(months.unsigned_abs()).map_err(|_| out_of_range())?,
            );
            if months >= 0 {
                base.checked_add_months(span)
            } else {
                base.checked_sub_months(span)
            }
        }
        OffsetUnit::Days => {
            let span = Days::new(magnitude.unsigned_abs());
            if magnitude >= 0 {
                base.checked_add_days(span)
            } else {
                base.checked_sub_days(span)
            }
        }
        OffsetUnit::Hours => base.checked_add_signed(Duration::hours(magnitude)),
        OffsetUnit::Minutes => base.checked_add_signed(Duration::minutes(magnitude)),
        OffsetUnit::Seconds => base.checked_add_signed(Duration::seconds(magnitude)),
    };

    result.ok_or_else(out_of_range)
}

/// Resolve the effective target instant for a base and spec
///
/// Pure and deterministic: the same `(base, spec)` always yields the same
/// target, independent of wall-clock time. Absolute targets pass through
/// unchanged.
pub fn resolve(base: DateTime<Utc>, spec: &RotationSpec) -> TemporalResult<DateTime<Utc>> {
    match spec {
        RotationSpec::Offset(offsets) => {
            let (unit, magnitude) = offsets.effective()?;
            add_offset(base, unit, magnitude)
        }
        RotationSpec::Absolute(target) => Ok(*target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn at(text: &str) -> DateTime<Utc> {
        timestamp::parse(text).unwrap()
    }

    #[test_case(OffsetUnit::Years, 1, "2025-06-15T12:30:00Z"; "one year")]
    #[test_case(OffsetUnit::Months, 1, "2024-07-15T12:30:00Z"; "one month")]
    #[test_case(OffsetUnit::Days, 7, "2024-06-22T12:30:00Z"; "seven days")]
    #[test_case(OffsetUnit::Hours, 36, "2024-06-17T00:30:00Z"; "hours cross day")]
    #[test_case(OffsetUnit::Minutes, -31, "2024-06-15T11:59:00Z"; "negative minutes")]
    #[test_case(OffsetUnit::Seconds, 90, "2024-06-15T12:31:30Z"; "seconds")]
    fn adds_single_units(unit: OffsetUnit, magnitude: i64, expected: &str) {
        let base = at("2024-06-15T12:30:00Z");
        assert_eq!(add_offset(base, unit, magnitude).unwrap(), at(expected));
    }

    #[test]
    fn month_add_pins_day_to_shorter_month() {
        let base = at("2024-01-31T00:00:00Z");
        let got = add_offset(base, OffsetUnit::Months, 1).unwrap();
        assert_eq!(got, at("2024-02-29T00:00:00Z"));

        // Non-leap year lands on the 28th
        let base = at("2023-01-31T00:00:00Z");
        let got = add_offset(base, OffsetUnit::Months, 1).unwrap();
        assert_eq!(got, at("2023-02-28T00:00:00Z"));
    }

    #[test]
    fn year_add_handles_leap_day() {
        let base = at("2024-02-29T06:00:00Z");
        let got = add_offset(base, OffsetUnit::Years, 1).unwrap();
        assert_eq!(got, at("2025-02-28T06:00:00Z"));
    }

    #[test]
    fn multi_unit_spec_retains_last_in_resolution_order() {
        // days is processed before months, so months wins, applied to the
        // original base rather than the days result
        let spec = OffsetSpec {
            days: Some(1),
            months: Some(1),
            ..OffsetSpec::default()
        };
        assert_eq!(spec.effective().unwrap(), (OffsetUnit::Months, 1));

        let base = at("2024-01-31T00:00:00Z");
        let target = resolve(base, &RotationSpec::Offset(spec)).unwrap();
        assert_eq!(target, at("2024-02-29T00:00:00Z"));
    }

    #[test]
    fn years_outranks_every_other_unit() {
        let spec = OffsetSpec {
            years: Some(2),
            months: Some(1),
            days: Some(1),
            hours: Some(1),
            minutes: Some(1),
            seconds: Some(1),
        };
        assert_eq!(spec.effective().unwrap(), (OffsetUnit::Years, 2));
    }

    #[test]
    fn empty_spec_is_configuration_error() {
        let spec = OffsetSpec::default();
        assert!(matches!(
            spec.effective(),
            Err(TemporalError::Configuration(_))
        ));
        assert!(RotationSpec::Offset(spec).validate().is_err());
    }

    #[test]
    fn resolve_is_deterministic() {
        let base = at("2024-06-15T12:30:00Z");
        let spec = RotationSpec::Offset(OffsetSpec::days(30));
        let first = resolve(base, &spec).unwrap();
        for _ in 0..10 {
            assert_eq!(resolve(base, &spec).unwrap(), first);
        }
    }

    #[test]
    fn absolute_target_passes_through() {
        let base = at("2024-06-15T12:30:00Z");
        let target = at("2030-01-01T00:00:00Z");
        let got = resolve(base, &RotationSpec::Absolute(target)).unwrap();
        assert_eq!(got, target);
    }

    #[test]
    fn out_of_range_offset_is_format_error() {
        let base = at("2024-06-15T12:30:00Z");
        let got = add_offset(base, OffsetUnit::Years, i64::MAX / 2);
        assert!(matches!(got, Err(TemporalError::Format(_))));
    }
}
