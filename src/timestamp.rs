//! Canonical timestamp codec
//!
//! All external timestamp text uses a single RFC 3339 date-time profile:
//! four-digit year, two-digit month/day, `T` separator, two-digit
//! hour/minute/second, and a `Z` or signed `HH:MM` offset. Any offset is
//! accepted on input and normalized to UTC; output always emits the `Z`
//! zero-offset form at second precision.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::errors::{TemporalError, TemporalResult};

/// Parse canonical timestamp text into a UTC instant
///
/// Fails with [`TemporalError::Format`] when the text does not match the
/// canonical profile. Fractional seconds are accepted and retained.
pub fn parse(text: &str) -> TemporalResult<DateTime<Utc>> {
    if !matches_profile(text.as_bytes()) {
        return Err(TemporalError::Format(format!(
            "invalid timestamp {text:?}: expected YYYY-MM-DDTHH:MM:SS with a Z or signed HH:MM offset"
        )));
    }
    let parsed = DateTime::parse_from_rfc3339(text)
        .map_err(|e| TemporalError::Format(format!("invalid timestamp {text:?}: {e}")))?;
    Ok(parsed.with_timezone(&Utc))
}

/// The canonical profile admits only the uppercase `T` separator and a `Z`
/// or signed `HH:MM` suffix. chrono's RFC 3339 parser is more lenient
/// (space separator, lowercase `t`/`z`), so the shape is checked first.
fn matches_profile(bytes: &[u8]) -> bool {
    if bytes.get(10) != Some(&b'T') {
        return false;
    }
    match bytes.last() {
        Some(b'Z') => true,
        Some(_) => {
            let n = bytes.len();
            n >= 6 && matches!(bytes[n - 6], b'+' | b'-') && bytes[n - 3] == b':'
        }
        None => false,
    }
}

/// Format a UTC instant as canonical timestamp text
///
/// Always the zero-offset (`Z`) form at second precision. For any instant
/// representable at second precision, `parse(format(x)) == x`.
pub fn format(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
