//! ISO-8601 timestamp handling.
//!
//! Parsing accepts a trailing `Z`, explicit `±HH:MM` offsets (normalised to
//! UTC) and offset-free strings, which are taken to be UTC already.
//! Formatting always emits a literal `Z`, never `+00:00`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};

/// Layouts tried for strings that carry an explicit offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Layouts tried for offset-free strings.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp into UTC. Returns `None` for anything malformed.
///
/// Surrounding whitespace and leap seconds (`:60`) are rejected.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.trim() != raw {
        return None;
    }

    let normalized = match raw.strip_suffix('Z') {
        Some(head) => format!("{}+00:00", head),
        None => raw.to_string(),
    };
    let normalized = expand_hour_only(normalized);
    let s = normalized.as_str();

    let parsed = if has_offset(s) {
        OFFSET_FORMATS
            .iter()
            .find_map(|fmt| DateTime::<FixedOffset>::parse_from_str(s, fmt).ok())
            .map(|dt| dt.with_timezone(&Utc))
    } else {
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(|naive| naive.and_utc())
    };

    // chrono encodes a leap second as nanoseconds past 1e9
    parsed.filter(|dt| dt.nanosecond() < 1_000_000_000)
}

/// `YYYY-MM-DDTHH` (optionally followed by an offset) becomes
/// `YYYY-MM-DDTHH:00`, so the minute layouts can handle it.
fn expand_hour_only(mut s: String) -> String {
    let bytes = s.as_bytes();
    let hour_only = bytes.len() >= 13
        && matches!(bytes[10], b'T' | b' ')
        && bytes[11].is_ascii_digit()
        && bytes[12].is_ascii_digit()
        && matches!(bytes.get(13), None | Some(b'+') | Some(b'-'));
    if hour_only {
        s.insert_str(13, ":00");
    }
    s
}

/// True when the time part (after the date) ends in `+HH:MM` / `-HH:MM`.
fn has_offset(s: &str) -> bool {
    let time_part = match s.get(10..) {
        Some(t) => t,
        None => return false,
    };
    time_part.contains('+') || time_part.contains('-')
}

/// Render a UTC time as `YYYY-MM-DDTHH:MM:SS[.ffffff]Z`.
///
/// Sub-second precision is emitted only when present, at microsecond width.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
    }
}

/// Hour-of-day bucket label, e.g. `"09:00"`.
pub fn hour_label(ts: &DateTime<Utc>) -> String {
    ts.format("%H:00").to_string()
}
