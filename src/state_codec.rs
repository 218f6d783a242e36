//! Import identifier codec
//!
//! A rotation record transfers between systems as a single comma-delimited
//! identifier. The first field is always the canonical base timestamp; the
//! remainder is either the ordered offset magnitudes
//! (years,months,days,hours,minutes,seconds) or, in absolute-target mode,
//! exactly one field holding the canonical target timestamp.
//!
//! Decoding always recomputes the target from the decoded base and spec so
//! that importing is side-effect-equivalent to fresh derivation; no cached
//! target embedded in the identifier is ever trusted.

use tracing::debug;

use crate::errors::{TemporalError, TemporalResult};
use crate::offset::{OffsetSpec, RotationSpec};
use crate::record::RotationRecord;
use crate::timestamp;

/// Field count for absolute-target identifiers: base, target
const ABSOLUTE_FIELDS: usize = 2;
/// Field count with seconds omitted (accepted for compatibility)
const OFFSET_FIELDS_SHORT: usize = 6;
/// Field count with all six magnitudes
const OFFSET_FIELDS_FULL: usize = 7;

/// Encode a record as an import identifier
pub fn encode(record: &RotationRecord) -> String {
    match &record.spec {
        RotationSpec::Offset(spec) => {
            let mut fields = vec![record.base_text()];
            fields.extend(spec.magnitudes().iter().map(|m| m.to_string()));
            fields.join(",")
        }
        RotationSpec::Absolute(_) => {
            format!("{},{}", record.base_text(), record.target_text())
        }
    }
}

/// Decode an import identifier into a record
///
/// Fails with [`TemporalError::Format`] when the field count matches no
/// supported arity, the base field is empty, or an offset identifier
/// carries no populated magnitude.
pub fn decode(text: &str) -> TemporalResult<RotationRecord> {
    let fields: Vec<&str> = text.split(',').collect();

    if fields[0].is_empty() {
        return Err(TemporalError::format(
            "import identifier has an empty base timestamp field",
        ));
    }
    let base = timestamp::parse(fields[0])?;

    let spec = match fields.len() {
        ABSOLUTE_FIELDS => RotationSpec::Absolute(timestamp::parse(fields[1])?),
        OFFSET_FIELDS_SHORT | OFFSET_FIELDS_FULL => {
            let magnitude = |index: usize, name: &str| -> TemporalResult<Option<i64>> {
                let Some(field) = fields.get(index) else {
                    return Ok(None);
                };
                if field.is_empty() || *field == "0" {
                    return Ok(None);
                }
                field.parse::<i64>().map(Some).map_err(|e| {
                    TemporalError::Format(format!("invalid {name} magnitude {field:?}: {e}"))
                })
            };
            let spec = OffsetSpec {
                years: magnitude(1, "years")?,
                months: magnitude(2, "months")?,
                days: magnitude(3, "days")?,
                hours: magnitude(4, "hours")?,
                minutes: magnitude(5, "minutes")?,
                seconds: magnitude(6, "seconds")?,
            };
            if spec.is_empty() {
                return Err(TemporalError::format(
                    "import identifier has no populated offset magnitude",
                ));
            }
            RotationSpec::Offset(spec)
        }
        count => {
            return Err(TemporalError::Format(format!(
                "import identifier has {count} fields, expected {ABSOLUTE_FIELDS}, \
                 {OFFSET_FIELDS_SHORT} or {OFFSET_FIELDS_FULL}"
            )));
        }
    };

    // Target is recomputed, never read from the identifier
    let record = RotationRecord::derive(base, spec)?;
    debug!(id = %text, target = %record.target_text(), "decoded import identifier");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn decodes_offset_identifier_and_recomputes_target() {
        let record = decode("2024-01-01T00:00:00Z,0,0,7,0,0").unwrap();
        assert_eq!(record.base_text(), "2024-01-01T00:00:00Z");
        assert_eq!(record.spec, RotationSpec::Offset(OffsetSpec::days(7)));
        assert_eq!(record.target_text(), "2024-01-08T00:00:00Z");
    }

    #[test]
    fn decodes_full_arity_with_seconds() {
        let record = decode("2024-01-01T00:00:00Z,0,0,0,0,0,90").unwrap();
        assert_eq!(record.spec, RotationSpec::Offset(OffsetSpec::seconds(90)));
        assert_eq!(record.target_text(), "2024-01-01T00:01:30Z");
    }

    #[test]
    fn decodes_absolute_identifier() {
        let record = decode("2024-01-01T00:00:00Z,2026-06-01T00:00:00Z").unwrap();
        assert_eq!(record.target_text(), "2026-06-01T00:00:00Z");
        assert!(matches!(record.spec, RotationSpec::Absolute(_)));
    }

    #[test_case("2024-01-01T00:00:00Z"; "single field")]
    #[test_case(",,,,,"; "empty base and offsets")]
    #[test_case("2024-01-01T00:00:00Z,0,0,0,0,0"; "all magnitudes zero")]
    #[test_case("2024-01-01T00:00:00Z,1,2,3"; "unsupported arity")]
    #[test_case("2024-01-01T00:00:00Z,0,0,x,0,0"; "non numeric magnitude")]
    #[test_case("not-a-timestamp,0,0,7,0,0"; "bad base")]
    #[test_case(""; "empty identifier")]
    fn rejects_malformed_identifiers(text: &str) {
        assert!(matches!(decode(text), Err(TemporalError::Format(_))));
    }

    #[test]
    fn offset_round_trip() {
        let record = RotationRecord::derive(
            timestamp::parse("2024-03-31T12:00:00Z").unwrap(),
            RotationSpec::Offset(OffsetSpec::months(1)),
        )
        .unwrap();
        let encoded = encode(&record);
        assert_eq!(encoded, "2024-03-31T12:00:00Z,0,1,0,0,0,0");
        assert_eq!(decode(&encoded).unwrap(), record);
    }

    #[test]
    fn absolute_round_trip() {
        let record = RotationRecord::derive(
            timestamp::parse("2024-01-01T00:00:00Z").unwrap(),
            RotationSpec::Absolute(timestamp::parse("2025-01-01T00:00:00Z").unwrap()),
        )
        .unwrap();
        let encoded = encode(&record);
        assert_eq!(encoded, "2024-01-01T00:00:00Z,2025-01-01T00:00:00Z");
        assert_eq!(decode(&encoded).unwrap(), record);
    }
}
