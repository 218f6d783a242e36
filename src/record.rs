//! Rotation records and their persisted projection
//!
//! A [`RotationRecord`] pins a base instant and the target derived from it.
//! The base is set once at creation and immutable afterwards; changing it
//! means destroying and recreating the record. The target is always fully
//! determined by `(base, spec)` except in absolute-target mode, where the
//! caller supplies it directly.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{TemporalError, TemporalResult};
use crate::offset::{self, OffsetSpec, RotationSpec};
use crate::timestamp;

/// Opaque caller-owned trigger mapping
///
/// Carries no temporal meaning; only its equality across evaluations
/// matters. Any content change signals that the base instant must be
/// regenerated. Backed by an ordered map so equality and serialization are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerSet(BTreeMap<String, String>);

impl TriggerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TriggerSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A pinned base instant plus the target derived from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationRecord {
    /// Set once at creation, immutable thereafter
    pub base: DateTime<Utc>,

    /// Derived from `(base, spec)`, or caller-supplied in absolute mode
    pub target: DateTime<Utc>,

    /// How the target is derived
    pub spec: RotationSpec,
}

impl RotationRecord {
    /// Derive a record from a base and spec
    ///
    /// Validates the spec before any arithmetic runs and computes the
    /// target; in absolute mode the supplied target passes through.
    pub fn derive(base: DateTime<Utc>, spec: RotationSpec) -> TemporalResult<Self> {
        spec.validate()?;
        let target = offset::resolve(base, &spec)?;
        Ok(Self { base, target, spec })
    }

    /// Canonical text of the base instant
    pub fn base_text(&self) -> String {
        timestamp::format(self.base)
    }

    /// Canonical text of the target instant
    pub fn target_text(&self) -> String {
        timestamp::format(self.target)
    }
}

/// Calendar decomposition of an instant in UTC
///
/// A pure projection for display; never a source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Seconds since the Unix epoch
    pub unix: i64,
}

impl TimeParts {
    pub fn of(instant: DateTime<Utc>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
            day: instant.day(),
            hour: instant.hour(),
            minute: instant.minute(),
            second: instant.second(),
            unix: instant.timestamp(),
        }
    }
}

/// Flat string-keyed persisted layout
///
/// The durable fields are the canonical base text, the canonical target
/// text, the six offset magnitudes (empty for unset), and the opaque
/// trigger mapping. No nested structure beyond the trigger map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub base: String,
    pub target: String,
    pub years: String,
    pub months: String,
    pub days: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
    pub triggers: BTreeMap<String, String>,
}

fn magnitude_field(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_magnitude(field: &str, name: &str) -> TemporalResult<Option<i64>> {
    if field.is_empty() {
        return Ok(None);
    }
    field
        .parse::<i64>()
        .map(Some)
        .map_err(|e| TemporalError::Format(format!("invalid {name} magnitude {field:?}: {e}")))
}

impl PersistedRecord {
    /// Project a record (plus its triggers) into the flat layout
    pub fn from_record(record: &RotationRecord, triggers: &TriggerSet) -> Self {
        let mut persisted = Self {
            base: record.base_text(),
            target: record.target_text(),
            triggers: triggers.0.clone(),
            ..Self::default()
        };
        if let RotationSpec::Offset(spec) = &record.spec {
            persisted.years = magnitude_field(spec.years);
            persisted.months = magnitude_field(spec.months);
            persisted.days = magnitude_field(spec.days);
            persisted.hours = magnitude_field(spec.hours);
            persisted.minutes = magnitude_field(spec.minutes);
            persisted.seconds = magnitude_field(spec.seconds);
        }
        persisted
    }

    /// Rebuild the record and triggers from the flat layout
    ///
    /// The target is recomputed from base + offsets when any offset field is
    /// populated; only absolute mode trusts the stored target text.
    pub fn into_record(self) -> TemporalResult<(RotationRecord, TriggerSet)> {
        let base = timestamp::parse(&self.base)?;
        let offsets = OffsetSpec {
            years: parse_magnitude(&self.years, "years")?,
            months: parse_magnitude(&self.months, "months")?,
            days: parse_magnitude(&self.days, "days")?,
            hours: parse_magnitude(&self.hours, "hours")?,
            minutes: parse_magnitude(&self.minutes, "minutes")?,
            seconds: parse_magnitude(&self.seconds, "seconds")?,
        };
        let spec = if offsets.is_empty() {
            RotationSpec::Absolute(timestamp::parse(&self.target)?)
        } else {
            RotationSpec::Offset(offsets)
        };
        let record = RotationRecord::derive(base, spec)?;
        Ok((record, TriggerSet(self.triggers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(text: &str) -> DateTime<Utc> {
        timestamp::parse(text).unwrap()
    }

    #[test]
    fn derive_computes_target_from_spec() {
        let record = RotationRecord::derive(
            at("2024-01-01T00:00:00Z"),
            RotationSpec::Offset(OffsetSpec::days(7)),
        )
        .unwrap();
        assert_eq!(record.target, at("2024-01-08T00:00:00Z"));
        assert_eq!(record.target_text(), "2024-01-08T00:00:00Z");
    }

    #[test]
    fn derive_rejects_empty_spec() {
        let result = RotationRecord::derive(
            at("2024-01-01T00:00:00Z"),
            RotationSpec::Offset(OffsetSpec::default()),
        );
        assert!(matches!(result, Err(TemporalError::Configuration(_))));
    }

    #[test]
    fn time_parts_decompose_in_utc() {
        let parts = TimeParts::of(at("2024-02-29T23:05:07Z"));
        assert_eq!(
            parts,
            TimeParts {
                year: 2024,
                month: 2,
                day: 29,
                hour: 23,
                minute: 5,
                second: 7,
                unix: 1709247907,
            }
        );
    }

    #[test]
    fn persisted_round_trip_recomputes_target() {
        let record = RotationRecord::derive(
            at("2024-01-01T00:00:00Z"),
            RotationSpec::Offset(OffsetSpec::months(3)),
        )
        .unwrap();
        let triggers: TriggerSet = [("key-version", "2")].into_iter().collect();

        let mut persisted = PersistedRecord::from_record(&record, &triggers);
        // A stale cached target must not survive the round trip
        persisted.target = "1999-01-01T00:00:00Z".to_string();

        let (decoded, decoded_triggers) = persisted.into_record().unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded_triggers, triggers);
    }

    #[test]
    fn persisted_absolute_mode_uses_target_text() {
        let record = RotationRecord::derive(
            at("2024-01-01T00:00:00Z"),
            RotationSpec::Absolute(at("2026-01-01T00:00:00Z")),
        )
        .unwrap();
        let persisted = PersistedRecord::from_record(&record, &TriggerSet::new());
        let (decoded, _) = persisted.into_record().unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn trigger_sets_compare_by_content() {
        let a: TriggerSet = [("a", "1"), ("b", "2")].into_iter().collect();
        let b: TriggerSet = [("b", "2"), ("a", "1")].into_iter().collect();
        let c: TriggerSet = [("a", "1"), ("b", "3")].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
